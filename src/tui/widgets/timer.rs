use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, LineGauge, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::timer::{StudyTimer, TimerState};
use crate::tui::theme;
use crate::utils::format::format_countdown;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    timer: &StudyTimer,
    subject: Option<&str>,
    minutes: u32,
) {
    let (title, border) = match timer.state() {
        TimerState::Running => (" Studying ", theme::green()),
        TimerState::Paused => (" Paused ", theme::amber()),
        TimerState::Idle => (" Study timer ", theme::border(false)),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // subject
            Constraint::Length(4), // countdown
            Constraint::Length(1), // gauge
            Constraint::Min(0),
        ])
        .split(inner);

    let subject_line = match subject {
        Some(name) => {
            let mut spans = vec![
                Span::styled("  Subject: ", theme::dim()),
                Span::styled(name, theme::bold()),
            ];
            if let Some(started) = timer.session_start() {
                spans.push(Span::styled(
                    format!("  since {}", started.format("%H:%M")),
                    theme::dim(),
                ));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled("  No subject selected  [Tab]", theme::dim())),
    };
    frame.render_widget(Paragraph::new(subject_line), rows[0]);

    let (secs, style) = match timer.state() {
        TimerState::Idle => (minutes * 60, theme::dim()),
        TimerState::Running => (timer.remaining_secs(), theme::green()),
        TimerState::Paused => (timer.remaining_secs(), theme::amber()),
    };
    let big = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(style)
        .lines(vec![format_countdown(secs).into()])
        .build();
    let countdown_area = Rect {
        x: rows[1].x + 2,
        width: rows[1].width.saturating_sub(2),
        ..rows[1]
    };
    frame.render_widget(big, countdown_area);

    let gauge = LineGauge::default()
        .filled_style(theme::green())
        .unfilled_style(theme::dim())
        .ratio(timer.progress().clamp(0.0, 1.0));
    let gauge_area = Rect {
        x: rows[2].x + 2,
        width: rows[2].width.saturating_sub(4),
        ..rows[2]
    };
    frame.render_widget(gauge, gauge_area);
}
