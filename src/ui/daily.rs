use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::{components, utils};
use crate::app::{App, HOROSCOPE_FAILED, HoroscopeState};
use crate::services::horoscope::HoroscopeCard;

pub fn render_daily(f: &mut Frame, app: &App, area: Rect) {
    let content_width = (area.width.saturating_sub(6) as usize).max(1);
    let lines = match (&app.horoscope, app.horoscope_card()) {
        (HoroscopeState::Success(_), Some(card)) => card_lines(&card, content_width),
        (HoroscopeState::Failure, _) => vec![
            Line::from(""),
            Line::from(Span::styled(HOROSCOPE_FAILED, Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(Span::styled(
                "按 r 重新嘗試",
                Style::default().fg(Color::Yellow),
            )),
        ],
        _ => {
            let name = app
                .profile
                .as_ref()
                .map_or("", |profile| profile.name.as_str());
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} 正在為 {} 觀測星象...", utils::spinner(app.loading_frame), name),
                    Style::default().fg(Color::Cyan),
                )),
            ]
        }
    };

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(components::panel("每日運勢")),
        area,
    );
}

fn card_lines(card: &HoroscopeCard, content_width: usize) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  今日運勢能量指數  ", label),
            Span::styled(
                card.score.clone(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    for summary_line in utils::wrap_text(&card.summary, content_width) {
        lines.push(Line::from(Span::styled(
            format!("  {}", summary_line),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  幸運色彩  ", label),
        Span::styled(card.lucky_color.clone(), Style::default().fg(Color::Cyan)),
        Span::styled("    幸運方位  ", label),
        Span::styled(card.lucky_direction.clone(), Style::default().fg(Color::Cyan)),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  今日行動建議", label)));
    let item_width = content_width.saturating_sub(3).max(1);
    for item in &card.action_items {
        for (index, item_line) in utils::wrap_text(item, item_width).into_iter().enumerate() {
            let marker = if index == 0 { "💡" } else { "  " };
            lines.push(Line::from(Span::styled(
                format!("  {} {}", marker, item_line),
                Style::default().fg(Color::White),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", card.footer),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(action_items: Vec<String>) -> HoroscopeCard {
        HoroscopeCard {
            score: "82".to_string(),
            summary: "「平穩」".to_string(),
            lucky_color: "藍".to_string(),
            lucky_direction: "東".to_string(),
            action_items,
            footer: "Astrological Forecast".to_string(),
        }
    }

    fn rendered(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_long_action_item_wraps_within_card() {
        let long_item = "1. 今天適合整理書桌並重新規劃下週的工作節奏，傍晚散步二十分鐘".to_string();
        let content_width = 20;
        let lines = card_lines(&card(vec![long_item, "2. 早睡".to_string()]), content_width);
        let text = rendered(&lines);

        let start = text.iter().position(|line| line.contains("今日行動建議")).unwrap();
        let items: Vec<&String> = text[start + 1..]
            .iter()
            .take_while(|line| !line.trim().is_empty())
            .collect();
        assert!(items.len() > 2);
        assert!(items[0].contains("💡 1."));
        assert!(!items[1].contains('💡'));
        assert!(items.last().unwrap().contains("💡 2. 早睡"));
        for line in &lines[start + 1..start + 1 + items.len()] {
            assert!(line.width() <= content_width + 2);
        }
    }
}
