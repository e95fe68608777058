use unicode_width::UnicodeWidthStr;

/// Format minutes as "Xh Ym" or "Ym"
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Format a countdown as "MM:SS", or "H:MM:SS" past an hour
pub fn format_countdown(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Percentage with one decimal, trimming ".0"
pub fn format_percent(pct: f64) -> String {
    if pct == pct.floor() {
        format!("{}%", pct as i64)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Left-align `s` in a column of `width` display cells
pub fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(125), "2h 5m");
    }

    #[test]
    fn countdown() {
        assert_eq!(format_countdown(25 * 60), "25:00");
        assert_eq!(format_countdown(61), "01:01");
        assert_eq!(format_countdown(3725), "1:02:05");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(75.0), "75%");
        assert_eq!(format_percent(72.727), "72.7%");
    }

    #[test]
    fn bar() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(2.0, 3), "███");
        assert_eq!(progress_bar(0.0, 2), "░░");
    }

    #[test]
    fn pad_counts_display_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("数学", 5), "数学 ");
        assert_eq!(pad("toolong", 3), "toolong");
    }
}
