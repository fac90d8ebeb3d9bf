use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::components;
use crate::app::App;

const FEATURES: [(&str, &str, &str); 4] = [
    ("2", "每日運勢", "解鎖今日能量分布，掌握幸運色彩與方位。"),
    ("3", "AI 命理諮詢", "深入探討職場、感情、人生的不確定焦慮。"),
    ("4", "智能面相分析", "透過照片分析性格特質與近期氣色運勢。"),
    ("-", "年度流年報告", "完整大限解析，敬請期待。"),
];

pub fn render_home(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Greeting
            Constraint::Min(0),    // Feature list
            Constraint::Length(4), // Advice
        ])
        .split(area);

    if let [greeting, features, advice] = &chunks[..] {
        render_greeting(f, app, *greeting);
        render_features(f, *features);
        render_advice(f, *advice);
    }
}

fn render_greeting(f: &mut Frame, app: &App, area: Rect) {
    let name = app
        .profile
        .as_ref()
        .map_or("旅人", |profile| profile.name.as_str());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("你好, {}", name),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "「命運並非不可更改，而是可以被看見的軌跡。」",
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_features(f: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from("")];
    for (key, title, description) in FEATURES {
        let available = key != "-";
        let title_style = if available {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("  [{}] ", key),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(title, title_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("      {}", description),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(components::panel("功能"))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_advice(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            " 「造命建議」",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            " 當你感覺到阻礙時，那往往是靈魂正在累積轉向的能量。今日建議靜心冥想五分鐘。",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
