pub mod chat;
mod daily;
mod help;
mod profile;
mod scroll;
mod text_input;
mod types;
mod vision;

pub use daily::{HOROSCOPE_FAILED, HoroscopeState};
pub use help::{DIGIT_KEYS, KEY_BINDINGS};
pub use profile::{PROFILE_FIELD_HINTS, PROFILE_FIELD_LABELS, ProfileForm};
pub use text_input::TextInput;
pub use types::*;
pub use vision::VisionState;

use crate::agents::{ChatSession, ModelGateway, ModelReply};
use crate::config::Config;
use crate::storage::{ProfileEvent, ProfileStore};
use chat::controller::ChatController;
use color_eyre::Result;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// Results posted back by worker threads
pub enum AppEvent {
    Horoscope {
        visit: u64,
        result: Result<DailyHoroscope>,
    },
    /// The session handle travels with the call and comes back here
    ChatReply {
        visit: u64,
        session: Box<dyn ChatSession>,
        result: Result<ModelReply>,
    },
    FaceAnalysis {
        visit: u64,
        result: Result<String>,
    },
}

/// Main application state
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub profile: Option<UserProfile>,
    profile_store: ProfileStore,
    profile_rx: Receiver<ProfileEvent>,
    gateway: ModelGateway,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
    /// Bumped on every screen entry; results tagged with an older value are dropped
    visit: u64,

    pub horoscope: HoroscopeState,

    pub chat: Option<ChatController>,
    chat_session: Option<Box<dyn ChatSession>>,
    pub chat_input: TextInput,
    pub chat_scroll_offset: usize,
    pub chat_auto_scroll: bool,

    pub vision: VisionState,
    pub vision_input: TextInput,

    pub profile_form: ProfileForm,

    pub status_toast: Option<StatusToast>,
    pub loading_frame: u8,
    pub last_loading_tick: Option<Instant>,
}

impl App {
    pub fn new(mut profile_store: ProfileStore, gateway: ModelGateway) -> Self {
        let profile_rx = profile_store.subscribe();
        let profile = profile_store.load();
        let (event_tx, event_rx) = channel();
        let mode = if profile.is_some() {
            AppMode::Home
        } else {
            AppMode::Profile
        };

        Self {
            mode,
            should_quit: false,
            profile_form: ProfileForm::from_profile(profile.as_ref()),
            profile,
            profile_store,
            profile_rx,
            gateway,
            event_tx,
            event_rx,
            visit: 0,
            horoscope: HoroscopeState::Idle,
            chat: None,
            chat_session: None,
            chat_input: TextInput::new(),
            chat_scroll_offset: 0,
            chat_auto_scroll: true,
            vision: VisionState::Idle,
            vision_input: TextInput::new(),
            status_toast: None,
            loading_frame: 0,
            last_loading_tick: None,
        }
    }

    /// Builds the profile store and model gateway from configuration
    pub fn init(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let store = ProfileStore::open(&data_dir);
        tracing::debug!(path = %store.path().display(), "profile store opened");
        let gateway = ModelGateway::new(&config.gemini)?;
        Ok(Self::new(store, gateway))
    }

    /// Switches screens. Without a profile every screen but Help shows the setup form.
    pub fn navigate(&mut self, mode: AppMode) {
        let target = if self.profile.is_none() && mode != AppMode::Help {
            AppMode::Profile
        } else {
            mode
        };

        self.visit = self.visit.wrapping_add(1);
        self.close_chat();
        self.horoscope = HoroscopeState::Idle;
        self.vision = VisionState::Idle;
        self.mode = target;
        tracing::debug!(mode = ?target, visit = self.visit, "screen entered");

        match target {
            AppMode::Daily => self.start_horoscope_fetch(),
            AppMode::Chat => self.open_chat(),
            AppMode::Vision => self.vision_input.clear(),
            AppMode::Profile => {
                if let Some(stored) = self.profile_store.reload() {
                    self.profile = Some(stored);
                }
                self.profile_form = ProfileForm::from_profile(self.profile.as_ref());
            }
            AppMode::Home | AppMode::Help => {}
        }
    }

    pub fn next_tab(&mut self) {
        self.navigate(self.mode.next_tab());
    }

    pub fn previous_tab(&mut self) {
        self.navigate(self.mode.previous_tab());
    }

    /// Drains worker results and profile notifications; called once per UI tick
    pub fn check_app_events(&mut self) {
        while let Ok(event) = self.profile_rx.try_recv() {
            self.handle_profile_event(event);
        }
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_app_event(event);
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Horoscope { visit, result } => self.handle_horoscope_result(visit, result),
            AppEvent::ChatReply {
                visit,
                session,
                result,
            } => self.handle_chat_reply(visit, session, result),
            AppEvent::FaceAnalysis { visit, result } => self.handle_face_analysis(visit, result),
        }
    }

    fn handle_profile_event(&mut self, event: ProfileEvent) {
        let ProfileEvent::Changed(profile) = event;
        let session_outdated = self
            .chat
            .as_ref()
            .is_some_and(|chat| chat.profile() != &profile);
        self.profile = Some(profile);
        if session_outdated {
            tracing::info!("profile changed, reopening chat session");
            self.visit = self.visit.wrapping_add(1);
            self.close_chat();
            self.open_chat();
        }
    }

    fn is_current_visit(&self, visit: u64) -> bool {
        if visit != self.visit {
            tracing::debug!(visit, current = self.visit, "dropping result for a previous visit");
            return false;
        }
        true
    }

    /// True while any screen is waiting on the model
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.horoscope, HoroscopeState::Loading)
            || matches!(self.vision, VisionState::Analyzing)
            || self.chat.as_ref().is_some_and(|chat| !chat.is_idle())
    }

    pub fn show_status_toast(&mut self, message: impl Into<String>) {
        self.status_toast = Some(StatusToast::new(message));
    }

    pub fn clear_expired_status_toast(&mut self) {
        let should_clear = self
            .status_toast
            .as_ref()
            .is_some_and(|toast| toast.is_expired(Duration::from_secs(3)));
        if should_clear {
            self.status_toast = None;
        }
    }

    #[must_use]
    pub fn status_toast_message(&self) -> Option<&str> {
        self.status_toast.as_ref().map(|toast| toast.message.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_starts_on_profile_form_without_profile() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, None);
        assert_eq!(app.mode, AppMode::Profile);

        app.navigate(AppMode::Chat);
        assert_eq!(app.mode, AppMode::Profile);
        assert!(app.chat.is_none());

        app.navigate(AppMode::Help);
        assert_eq!(app.mode, AppMode::Help);
    }

    #[test]
    fn test_starts_home_with_saved_profile() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = test_app(&dir, Some(sample_profile()));
        assert_eq!(app.mode, AppMode::Home);
        assert_eq!(app.profile, Some(sample_profile()));
    }

    #[test]
    fn test_leaving_chat_discards_transcript() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, Some(sample_profile()));
        app.navigate(AppMode::Chat);
        assert_eq!(app.chat.as_ref().map(|chat| chat.transcript().len()), Some(1));

        app.navigate(AppMode::Home);
        assert!(app.chat.is_none());
        assert!(app.chat_session.is_none());
    }

    #[test]
    fn test_profile_change_reopens_chat() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, Some(sample_profile()));
        app.navigate(AppMode::Chat);
        let visit_before = app.visit;

        let mut renamed = sample_profile();
        renamed.name = "李大華".to_string();
        app.profile_store.save(renamed.clone()).unwrap();
        app.check_app_events();

        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.profile(), &renamed);
        assert_eq!(chat.transcript().len(), 1);
        assert!(chat.transcript()[0].text.contains("李大華"));
        assert_ne!(app.visit, visit_before);
    }
}
