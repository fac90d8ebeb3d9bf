mod chat;
mod components;
mod daily;
mod help;
mod home;
mod profile;
mod utils;
mod vision;

use crate::app::{App, AppMode, DIGIT_KEYS};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(0),    // Screen body
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    if let [header, body, footer] = &chunks[..] {
        render_header(f, app, *header);
        match app.mode {
            AppMode::Home => home::render_home(f, app, *body),
            AppMode::Daily => daily::render_daily(f, app, *body),
            AppMode::Chat => chat::render_chat(f, app, *body),
            AppMode::Vision => vision::render_vision(f, app, *body),
            AppMode::Profile => profile::render_profile(f, app, *body),
            AppMode::Help => help::render_help(f, *body),
        }
        render_footer(f, app, *footer);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            "AstroGuide",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    for (index, mode) in AppMode::NAVIGATION.iter().enumerate() {
        spans.push(Span::raw(" "));
        let label = format!(" {} {} ", index + 1, mode.label());
        if *mode == app.mode {
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
        }
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let (badge, keybindings): (&str, &[(&str, &str)]) = match app.mode {
        AppMode::Home => ("HOME", &[(DIGIT_KEYS, "screens"), ("p", "profile"), ("?", "help")]),
        AppMode::Daily => ("DAILY", &[("r", "retry"), ("Tab", "next"), ("Esc", "home")]),
        AppMode::Chat => ("CHAT", &[("Enter", "send"), ("PgUp/PgDn", "scroll"), ("Esc", "home")]),
        AppMode::Vision => ("VISION", &[("Enter", "analyze"), ("r", "reset"), ("Esc", "home")]),
        AppMode::Profile => ("PROFILE", &[("Tab", "field"), ("Enter", "save"), ("Esc", "home")]),
        AppMode::Help => ("HELP", &[("Esc", "back")]),
    };
    components::render_navigation_footer(f, area, badge, keybindings, app.status_toast_message());
}
