use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::GoalProgress;
use crate::tui::theme;
use crate::utils::format::{format_minutes, progress_bar};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    streak: u32,
    daily: GoalProgress,
    weekly: GoalProgress,
) {
    let block = Block::default()
        .title(Span::styled(" Streak & goals ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let streak_style = if streak > 0 {
        theme::green().add_modifier(Modifier::BOLD)
    } else {
        theme::dim()
    };

    let goal_line = |label: &'static str, p: GoalProgress| {
        let style = if p.reached() { theme::green() } else { theme::amber() };
        Line::from(vec![
            Span::styled(format!("  {:<7}", label), theme::dim()),
            Span::styled(progress_bar(p.ratio(), 12), style),
            Span::styled(
                format!("  {} / {}", format_minutes(p.done), format_minutes(p.goal)),
                theme::dim(),
            ),
        ])
    };

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Streak ", theme::dim()),
            Span::styled(format!("{} days", streak), streak_style),
        ]),
        Line::from(""),
        goal_line("Today", daily),
        goal_line("Week", weekly),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}
