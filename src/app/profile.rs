use crate::app::{App, AppMode, TextInput, UserProfile};
use crate::storage::ProfileError;

pub const PROFILE_INCOMPLETE: &str = "請填寫完整的出生資訊，這對準確性至關重要。";
const PROFILE_SAVE_FAILED: &str = "命盤資料儲存失敗，請稍後再試。";

pub const PROFILE_FIELD_LABELS: [&str; 4] = ["您的稱呼", "出生日期", "出生時間", "出生地點"];
pub const PROFILE_FIELD_HINTS: [&str; 4] = [
    "請輸入姓名或暱稱",
    "YYYY-MM-DD",
    "HH:MM",
    "例如：台北市、高雄市...",
];

/// Edit buffer for the four profile fields
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub fields: [TextInput; 4],
    pub focus: usize,
    pub error: Option<String>,
}

impl ProfileForm {
    #[must_use]
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        let Some(profile) = profile else {
            return Self::default();
        };
        Self {
            fields: [
                TextInput::from(profile.name.as_str()),
                TextInput::from(profile.birth_date.as_str()),
                TextInput::from(profile.birth_time.as_str()),
                TextInput::from(profile.birth_place.as_str()),
            ],
            focus: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn to_profile(&self) -> UserProfile {
        let [name, birth_date, birth_time, birth_place] = &self.fields;
        UserProfile {
            name: name.content().trim().to_string(),
            birth_date: birth_date.content().trim().to_string(),
            birth_time: birth_time.content().trim().to_string(),
            birth_place: birth_place.content().trim().to_string(),
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn previous_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        self.fields.get_mut(self.focus)
    }
}

impl App {
    /// Validates and persists the form; success returns to Home
    pub fn save_profile_form(&mut self) {
        let profile = self.profile_form.to_profile();
        match self.profile_store.save(profile.clone()) {
            Ok(()) => {
                self.profile_form.error = None;
                self.profile = Some(profile);
                self.show_status_toast("命盤已更新");
                self.navigate(AppMode::Home);
            }
            Err(ProfileError::Incomplete { field }) => {
                tracing::debug!(field, "profile form incomplete");
                self.profile_form.error = Some(PROFILE_INCOMPLETE.to_string());
            }
            Err(error) => {
                tracing::error!(error = %error, "profile save failed");
                self.profile_form.error = Some(PROFILE_SAVE_FAILED.to_string());
            }
        }
    }

    pub fn add_profile_char(&mut self, character: char) {
        if let Some(input) = self.profile_form.focused_input_mut() {
            input.add_char(character);
        }
    }

    pub fn remove_profile_char(&mut self) {
        if let Some(input) = self.profile_form.focused_input_mut() {
            input.remove_char();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::*;

    fn type_into(app: &mut App, values: [&str; 4]) {
        for value in values {
            value.chars().for_each(|character| app.add_profile_char(character));
            app.profile_form.next_field();
        }
    }

    #[test]
    fn test_incomplete_form_stays_with_message() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, None);
        type_into(&mut app, ["王小明", "1990-05-01", "   ", "台北"]);
        app.save_profile_form();

        assert_eq!(app.mode, AppMode::Profile);
        assert_eq!(app.profile_form.error.as_deref(), Some(PROFILE_INCOMPLETE));
        assert!(app.profile.is_none());
        assert!(!app.profile_store.path().exists());
    }

    #[test]
    fn test_complete_form_saves_and_goes_home() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, None);
        type_into(&mut app, ["王小明", "1990-05-01", "08:30", " 台北 "]);
        app.save_profile_form();

        assert_eq!(app.mode, AppMode::Home);
        assert_eq!(app.profile, Some(sample_profile()));
        assert!(app.profile_store.path().exists());
    }

    #[test]
    fn test_form_prefills_existing_profile() {
        let form = ProfileForm::from_profile(Some(&sample_profile()));
        assert_eq!(form.to_profile(), sample_profile());
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = ProfileForm::default();
        form.previous_field();
        assert_eq!(form.focus, 3);
        form.next_field();
        assert_eq!(form.focus, 0);
    }
}
