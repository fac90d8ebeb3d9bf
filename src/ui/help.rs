use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::components;
use crate::app::KEY_BINDINGS;

pub fn render_help(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  快捷鍵", Style::default().fg(Color::Cyan))),
        Line::from(""),
    ];
    for (key, description) in KEY_BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(Color::Yellow)),
            Span::styled(description, Style::default().fg(Color::White)),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(components::panel("說明")), area);
}
