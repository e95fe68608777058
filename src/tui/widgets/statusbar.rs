use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// A message shown in place of the key hints for a few seconds.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    pub ttl_secs: u8,
}

pub fn render(frame: &mut Frame, area: Rect, notice: Option<&Notice>) {
    if let Some(n) = notice {
        let style = if n.is_error { theme::red() } else { theme::green() };
        let paragraph =
            Paragraph::new(Line::from(Span::styled(n.text.as_str(), style))).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let hints = vec![
        ("[p]", " present  "),
        ("[a]", " absent  "),
        ("[t]", " timer  "),
        ("[space]", " pause  "),
        ("[x]", " stop  "),
        ("[s]", " stats  "),
        ("[?]", " help  "),
        ("[Esc]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::accent()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
