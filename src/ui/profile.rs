use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::components;
use crate::app::{App, PROFILE_FIELD_HINTS, PROFILE_FIELD_LABELS};

pub fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Name
            Constraint::Length(3), // Birth date
            Constraint::Length(3), // Birth time
            Constraint::Length(3), // Birth place
            Constraint::Min(0),    // Validation message
        ])
        .split(area);

    let Some((title, rest)) = chunks.split_first() else {
        return;
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " 命理資料設定",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))),
        *title,
    );

    let form = &app.profile_form;
    for (index, field_area) in rest.iter().take(form.fields.len()).enumerate() {
        let (Some(input), Some(label), Some(hint)) = (
            form.fields.get(index),
            PROFILE_FIELD_LABELS.get(index),
            PROFILE_FIELD_HINTS.get(index),
        ) else {
            continue;
        };
        let title = format!(" {} ", label);
        let config = components::TextInputConfig::new(input.content(), &title)
            .with_placeholder(hint)
            .with_focus(index == form.focus)
            .with_cursor_position(input.cursor_position());
        components::render_text_input(f, *field_area, config);
    }

    if let (Some(message_area), Some(error)) = (rest.last(), form.error.as_deref()) {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", error),
                Style::default().fg(Color::Red),
            ))),
            *message_area,
        );
    }
}
