use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const SEPARATOR: &str = "  ";

/// Configuration for text input rendering
pub struct TextInputConfig<'a> {
    pub content: &'a str,
    pub title: &'a str,
    pub placeholder: Option<&'a str>,
    pub focused: bool,
    pub cursor_position: usize,
}

impl<'a> TextInputConfig<'a> {
    pub fn new(content: &'a str, title: &'a str) -> Self {
        Self {
            content,
            title,
            placeholder: None,
            focused: true,
            cursor_position: content.chars().count(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Cursor position as a character index
    pub fn with_cursor_position(mut self, cursor_position: usize) -> Self {
        self.cursor_position = cursor_position;
        self
    }
}

/// Renders a bordered single-line input; the visible window follows the cursor
pub fn render_text_input(frame: &mut Frame, area: Rect, config: TextInputConfig) {
    let cursor_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::SLOW_BLINK);
    let mut spans = vec![Span::styled(
        "> ",
        Style::default().fg(if config.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }),
    )];

    if config.content.is_empty() {
        if config.focused {
            spans.push(Span::styled("█", cursor_style));
        }
        if let Some(placeholder) = config.placeholder {
            spans.push(Span::styled(
                format!(" {}", placeholder),
                Style::default().fg(Color::DarkGray),
            ));
        }
    } else {
        let available_width = (area.width.saturating_sub(5) as usize).max(1);
        let (start, end) = visible_window(config.content, config.cursor_position, available_width);
        let relative_cursor = config.cursor_position.saturating_sub(start);
        let visible: Vec<char> = config.content.chars().skip(start).take(end - start).collect();
        let before: String = visible.iter().take(relative_cursor).collect();
        let after: String = visible.iter().skip(relative_cursor).collect();

        spans.push(Span::styled(before, Style::default().fg(Color::White)));
        if config.focused {
            spans.push(Span::styled("█", cursor_style));
        }
        spans.push(Span::styled(after, Style::default().fg(Color::White)));
    }

    let border_color = if config.focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(
                    config.title,
                    Style::default().fg(Color::White),
                )))
                .border_style(Style::default().fg(border_color)),
        ),
        area,
    );
}

/// Character window of `width` around the cursor
fn visible_window(content: &str, cursor: usize, width: usize) -> (usize, usize) {
    let length = content.chars().count();
    let cursor = cursor.min(length);
    if length <= width {
        return (0, length);
    }
    let mut start = cursor.saturating_sub(width.saturating_sub(1));
    if start + width > length {
        start = length.saturating_sub(width);
    }
    (start, start + width)
}

/// Renders a footer with mode badge, keybindings and the status toast
pub fn render_navigation_footer(
    f: &mut Frame,
    area: Rect,
    mode: &str,
    keybindings: &[(&str, &str)],
    toast: Option<&str>,
) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", mode),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    for &(key, desc) in keybindings {
        spans.push(Span::raw(SEPARATOR));
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::White),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(Line::from(spans)), inner);

    if let Some(message) = toast {
        render_status_toast(f, inner, message);
    }
}

pub fn render_status_toast(frame: &mut Frame, area: Rect, message: &str) {
    let toast = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {} ", message),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Right);

    frame.render_widget(toast, area);
}

/// Bordered block with the shared dim border
pub fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::White),
        )))
        .border_style(Style::default().fg(Color::DarkGray))
}
