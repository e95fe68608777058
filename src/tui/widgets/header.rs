use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;
use crate::utils::format::format_percent;

pub fn render(frame: &mut Frame, area: Rect, student: &str, today: NaiveDate, overall_pct: f64) {
    let date_str = today.format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  bunkwise  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled(student, theme::bold()),
    ]);

    let date_line = Line::from(vec![
        Span::styled(date_str, theme::dim()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(
            format!("overall {}", format_percent(overall_pct)),
            theme::amber(),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, date_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
