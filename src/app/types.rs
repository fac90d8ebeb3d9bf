use serde::{Deserialize, Serialize};

/// The user's identity and birth facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub birth_date: String,
    pub birth_time: String,
    pub birth_place: String,
}

impl UserProfile {
    /// Returns the JSON name of the first empty (or whitespace-only) field
    #[must_use]
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("birthDate", &self.birth_date),
            ("birthTime", &self.birth_time),
            ("birthPlace", &self.birth_place),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One transcript entry; never modified after it is appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl ChatMessage {
    fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Self::now_millis(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: Self::now_millis(),
        }
    }

    /// Local wall-clock time for display, e.g. "08:30"
    #[must_use]
    pub fn display_time(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .map(|utc| utc.with_timezone(&chrono::Local).format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// A full day's forecast as returned by the structured-output call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHoroscope {
    pub date: String,
    pub overall_score: i64,
    pub lucky_color: String,
    pub lucky_direction: String,
    pub summary: String,
    pub action_items: Vec<String>,
}

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Home,
    Daily,
    Chat,
    Vision,
    Profile,
    Help,
}

impl AppMode {
    /// Screens reachable from the bottom navigation bar, in display order
    pub const NAVIGATION: [AppMode; 5] = [
        AppMode::Home,
        AppMode::Daily,
        AppMode::Chat,
        AppMode::Vision,
        AppMode::Profile,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AppMode::Home => "首頁",
            AppMode::Daily => "每日運勢",
            AppMode::Chat => "命理諮詢",
            AppMode::Vision => "面相分析",
            AppMode::Profile => "個人資料",
            AppMode::Help => "說明",
        }
    }

    /// Tab selected by a number key, counting from 1 in `NAVIGATION` order
    #[must_use]
    pub fn from_digit(digit: char) -> Option<AppMode> {
        let index = digit.to_digit(10)?.checked_sub(1)?;
        Self::NAVIGATION.get(usize::try_from(index).ok()?).copied()
    }

    /// Next navigation tab, wrapping around
    #[must_use]
    pub fn next_tab(self) -> AppMode {
        let index = Self::NAVIGATION
            .iter()
            .position(|mode| *mode == self)
            .map_or(0, |index| (index + 1) % Self::NAVIGATION.len());
        Self::NAVIGATION.get(index).copied().unwrap_or(AppMode::Home)
    }

    /// Previous navigation tab, wrapping around
    #[must_use]
    pub fn previous_tab(self) -> AppMode {
        let count = Self::NAVIGATION.len();
        let index = Self::NAVIGATION
            .iter()
            .position(|mode| *mode == self)
            .map_or(0, |index| (index + count - 1) % count);
        Self::NAVIGATION.get(index).copied().unwrap_or(AppMode::Home)
    }
}

#[derive(Debug, Clone)]
pub struct StatusToast {
    pub message: String,
    pub created_at: std::time::Instant,
}

impl StatusToast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self, duration: std::time::Duration) -> bool {
        self.created_at.elapsed() >= duration
    }
}
