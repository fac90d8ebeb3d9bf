use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{components, utils};
use crate::app::{App, ChatMessage, ChatRole};

pub fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Transcript
            Constraint::Length(3), // Input
        ])
        .split(area);

    if let [transcript, input] = &chunks[..] {
        render_transcript(f, app, *transcript);
        render_chat_input(f, app, *input);
    }
}

fn message_lines(message: &ChatMessage, max_width: usize) -> Vec<Line<'static>> {
    let (label, indicator, label_color) = match message.role {
        ChatRole::User => ("你", ">", Color::Cyan),
        ChatRole::Model => ("命理師", "<", Color::Magenta),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!(" {} ", indicator), Style::default().fg(Color::DarkGray)),
        Span::styled(
            label,
            Style::default()
                .fg(label_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", message.display_time()),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    for content_line in utils::wrap_text(&message.text, max_width) {
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(content_line, Style::default().fg(Color::White)),
        ]));
    }
    lines
}

/// Scroll distance from the top for the given offset from the bottom
fn scroll_from_top(
    total_lines: usize,
    visible_height: usize,
    offset_from_bottom: usize,
    auto_scroll: bool,
) -> usize {
    let max_scroll = total_lines.saturating_sub(visible_height);
    if auto_scroll {
        return max_scroll;
    }
    max_scroll.saturating_sub(offset_from_bottom.min(max_scroll))
}

fn render_transcript(f: &mut Frame, app: &App, area: Rect) {
    let max_width = (area.width.saturating_sub(8) as usize).max(1);
    let mut lines: Vec<Line> = Vec::new();

    if let Some(chat) = &app.chat {
        for message in chat.transcript() {
            lines.push(Line::from(""));
            lines.extend(message_lines(message, max_width));
        }
        if !chat.is_idle() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" < 星象推演中 {}", utils::spinner(app.loading_frame)),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines.push(Line::from(""));

    let visible_height = area.height.saturating_sub(2) as usize;
    let scroll = scroll_from_top(
        lines.len(),
        visible_height,
        app.chat_scroll_offset,
        app.chat_auto_scroll,
    );

    let title = if app.chat_auto_scroll {
        " 命理諮詢 ".to_string()
    } else {
        format!(" 命理諮詢 [+{}] ", app.chat_scroll_offset)
    };
    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        area,
    );
}

fn render_chat_input(f: &mut Frame, app: &App, area: Rect) {
    let busy = app.chat.as_ref().is_some_and(|chat| !chat.is_idle());
    let placeholder = if busy {
        "等待星象回應..."
    } else {
        "描述你的困惑，讓星象指引你..."
    };
    let config = components::TextInputConfig::new(app.chat_input.content(), " 訊息 ")
        .with_placeholder(placeholder)
        .with_focus(!busy)
        .with_cursor_position(app.chat_input.cursor_position());
    components::render_text_input(f, area, config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_scroll_pins_bottom() {
        assert_eq!(scroll_from_top(50, 10, 0, true), 40);
        assert_eq!(scroll_from_top(5, 10, 0, true), 0);
    }

    #[test]
    fn test_manual_offset_is_clamped() {
        assert_eq!(scroll_from_top(50, 10, 15, false), 25);
        assert_eq!(scroll_from_top(50, 10, 500, false), 0);
    }
}
