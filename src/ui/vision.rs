use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::{components, utils};
use crate::app::{App, VisionState};
use crate::services::vision::{FACE_ANALYSIS_DISCLAIMER, FACE_ANALYSIS_FAILED};

pub fn render_vision(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Intro
            Constraint::Length(3), // Path input
            Constraint::Min(0),    // Result
            Constraint::Length(3), // Disclaimer
        ])
        .split(area);

    if let [intro, input, result, disclaimer] = &chunks[..] {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    " 智能面相分析",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    " 上傳清晰正面照，解讀性格優勢與近期運勢。",
                    Style::default().fg(Color::Gray),
                )),
            ]),
            *intro,
        );
        render_path_input(f, app, *input);
        render_result(f, app, *result);
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" ⚠️ {}", FACE_ANALYSIS_DISCLAIMER),
                Style::default().fg(Color::DarkGray),
            )))
            .wrap(Wrap { trim: true }),
            *disclaimer,
        );
    }
}

fn render_path_input(f: &mut Frame, app: &App, area: Rect) {
    let config = components::TextInputConfig::new(app.vision_input.content(), " 照片路徑 ")
        .with_placeholder("輸入或拖放 JPEG / PNG / WebP 檔案路徑")
        .with_focus(app.vision == VisionState::Idle)
        .with_cursor_position(app.vision_input.cursor_position());
    components::render_text_input(f, area, config);
}

fn render_result(f: &mut Frame, app: &App, area: Rect) {
    let width = (area.width.saturating_sub(4) as usize).max(1);
    let lines: Vec<Line> = match &app.vision {
        VisionState::Idle => vec![Line::from(Span::styled(
            " 按 Enter 開始面相分析",
            Style::default().fg(Color::DarkGray),
        ))],
        VisionState::Analyzing => vec![Line::from(Span::styled(
            format!(" {} AI 正在分析特徵...", utils::spinner(app.loading_frame)),
            Style::default().fg(Color::Cyan),
        ))],
        VisionState::Done(analysis) => utils::wrap_text(analysis, width)
            .into_iter()
            .map(|line| {
                Line::from(Span::styled(
                    format!(" {}", line),
                    Style::default().fg(Color::White),
                ))
            })
            .collect(),
        VisionState::Failed => vec![Line::from(Span::styled(
            format!(" {}", FACE_ANALYSIS_FAILED),
            Style::default().fg(Color::Red),
        ))],
    };

    f.render_widget(
        Paragraph::new(lines).block(components::panel("📝 分析報告")),
        area,
    );
}
