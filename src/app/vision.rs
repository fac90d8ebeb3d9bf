use crate::app::{App, AppEvent};
use crate::services::vision;
use color_eyre::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum VisionState {
    Idle,
    Analyzing,
    Done(String),
    Failed,
}

impl App {
    /// Reads the image at the typed path and sends it off for analysis
    pub fn start_face_analysis(&mut self) {
        if self.vision == VisionState::Analyzing {
            return;
        }
        let Some(path) = vision::parse_image_path(self.vision_input.content()) else {
            self.show_status_toast("請輸入照片路徑");
            return;
        };

        let image_bytes = match vision::read_image(&path) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "image rejected");
                self.vision = VisionState::Failed;
                return;
            }
        };

        self.vision = VisionState::Analyzing;
        let gateway = self.gateway.clone();
        let event_tx = self.event_tx.clone();
        let visit = self.visit;
        std::thread::spawn(move || {
            let result = gateway.analyze_face(&image_bytes);
            let _ = event_tx.send(AppEvent::FaceAnalysis { visit, result });
        });
    }

    /// Clears the picked image and any result; an analysis still running is abandoned
    pub fn reset_vision(&mut self) {
        self.visit = self.visit.wrapping_add(1);
        self.vision = VisionState::Idle;
        self.vision_input.clear();
    }

    pub(super) fn handle_face_analysis(&mut self, visit: u64, result: Result<String>) {
        if !self.is_current_visit(visit) {
            return;
        }
        self.vision = match result {
            Ok(analysis) => VisionState::Done(analysis),
            Err(error) => {
                tracing::error!(error = %error, "face analysis failed");
                VisionState::Failed
            }
        };
    }

    pub fn add_vision_input_char(&mut self, character: char) {
        self.vision_input.add_char(character);
    }

    pub fn remove_vision_input_char(&mut self) {
        self.vision_input.remove_char();
    }

    /// Pasted text replaces the path (terminals paste dropped files as text)
    pub fn paste_vision_path(&mut self, text: &str) {
        self.vision_input.set_content(text.trim().to_string());
    }
}
