use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::AttendanceStatus;
use crate::state::ScheduledClass;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, classes: &[ScheduledClass], focused_idx: usize) {
    let block = Block::default()
        .title(Span::styled(" Today's classes ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if classes.is_empty() {
        let items = vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No classes scheduled today",
                theme::dim(),
            ))),
        ];
        frame.render_widget(List::new(items).block(block), area);
        return;
    }

    let items: Vec<ListItem> = classes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let (icon, label, status_style) = match c.status {
                Some(AttendanceStatus::Present) => ("●", "present", theme::green()),
                Some(AttendanceStatus::Absent) => ("✗", "absent", theme::red()),
                None => ("○", "unmarked", theme::dim()),
            };

            let name_style = if i == focused_idx {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("  {:<13}", c.slot), theme::dim()),
                Span::styled(format!("{:<18}", c.subject.name), name_style),
                Span::styled(icon, status_style),
                Span::styled(format!("  {}", label), theme::dim()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
