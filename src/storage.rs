use crate::app::UserProfile;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use thiserror::Error;

/// Fixed identifier the profile is persisted under
pub const PROFILE_KEY: &str = "astro_guide_profile";

/// Reasons a profile cannot be saved
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile field `{field}` is empty")]
    Incomplete { field: &'static str },
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write profile: {0}")]
    Io(#[from] std::io::Error),
}

/// Notifications sent to subscribers after the profile changes
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEvent {
    Changed(UserProfile),
}

/// Owns the single persisted user profile.
///
/// The record on disk is either a complete profile or treated as absent.
/// `save` is the only mutation path.
pub struct ProfileStore {
    path: PathBuf,
    current: Option<UserProfile>,
    subscribers: Vec<Sender<ProfileEvent>>,
}

impl ProfileStore {
    /// Opens the store rooted at `data_dir` and reads the persisted profile once
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(format!("{}.json", PROFILE_KEY));
        let current = read_profile(&path);
        Self {
            path,
            current,
            subscribers: Vec::new(),
        }
    }

    /// Returns the current profile, if a complete one exists
    #[must_use]
    pub fn load(&self) -> Option<UserProfile> {
        self.current.clone()
    }

    /// Re-reads the record from disk with the same fail-soft rules as `open`
    pub fn reload(&mut self) -> Option<UserProfile> {
        self.current = read_profile(&self.path);
        self.current.clone()
    }

    /// Validates and persists `profile`, replacing any previous one.
    ///
    /// Nothing is written when a field is blank. The write goes through a
    /// temp file and a rename so a partially written record is never visible.
    pub fn save(&mut self, profile: UserProfile) -> Result<(), ProfileError> {
        if let Some(field) = profile.first_blank_field() {
            return Err(ProfileError::Incomplete { field });
        }

        let data = serde_json::to_string_pretty(&profile)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, data)?;
        fs::rename(&staging, &self.path)?;

        tracing::info!(path = %self.path.display(), "profile saved");
        self.current = Some(profile.clone());
        self.subscribers
            .retain(|subscriber| subscriber.send(ProfileEvent::Changed(profile.clone())).is_ok());
        Ok(())
    }

    /// Registers for `ProfileEvent`s emitted by later saves
    pub fn subscribe(&mut self) -> Receiver<ProfileEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_profile(path: &Path) -> Option<UserProfile> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "profile unreadable, treating as absent");
            return None;
        }
    };

    let profile = match serde_json::from_str::<UserProfile>(&contents) {
        Ok(profile) => profile,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "profile malformed, treating as absent");
            return None;
        }
    };

    if let Some(field) = profile.first_blank_field() {
        tracing::warn!(path = %path.display(), field, "profile incomplete, treating as absent");
        return None;
    }
    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_profile() -> UserProfile {
        UserProfile {
            name: "王小明".to_string(),
            birth_date: "1990-05-01".to_string(),
            birth_time: "08:30".to_string(),
            birth_place: "台北市".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_then_reopen_returns_identical_profile() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());
        store.save(sample_profile()).unwrap();

        let reopened = ProfileStore::open(dir.path());
        assert_eq!(reopened.load(), Some(sample_profile()));
    }

    #[test]
    fn test_load_twice_is_stable() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());
        store.save(sample_profile()).unwrap();

        let first = store.reload();
        let second = store.reload();
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(store.load(), store.load());
    }

    #[test]
    fn test_save_requires_every_field() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());

        let blanks: [(&str, fn(&mut UserProfile)); 4] = [
            ("name", |profile| profile.name.clear()),
            ("birthDate", |profile| profile.birth_date.clear()),
            ("birthTime", |profile| profile.birth_time = "   ".to_string()),
            ("birthPlace", |profile| profile.birth_place.clear()),
        ];
        for (expected_field, blank) in blanks {
            let mut profile = sample_profile();
            blank(&mut profile);
            match store.save(profile) {
                Err(ProfileError::Incomplete { field }) => assert_eq!(field, expected_field),
                other => panic!("expected Incomplete for {}, got {:?}", expected_field, other),
            }
        }

        assert!(!store.path().exists());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_failed_save_keeps_previous_profile() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());
        store.save(sample_profile()).unwrap();

        let mut partial = sample_profile();
        partial.birth_place.clear();
        assert!(store.save(partial).is_err());

        assert_eq!(store.load(), Some(sample_profile()));
        assert_eq!(ProfileStore::open(dir.path()).load(), Some(sample_profile()));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());
        store.save(sample_profile()).unwrap();

        let mut edited = sample_profile();
        edited.birth_place = "高雄市".to_string();
        store.save(edited.clone()).unwrap();

        assert_eq!(ProfileStore::open(dir.path()).load(), Some(edited));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_malformed_json_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("{}.json", PROFILE_KEY));
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ProfileStore::open(dir.path()).load(), None);
    }

    #[test]
    fn test_record_missing_field_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("{}.json", PROFILE_KEY));
        fs::write(&path, r#"{"name":"王小明","birthDate":"1990-05-01"}"#).unwrap();
        assert_eq!(ProfileStore::open(dir.path()).load(), None);
    }

    #[test]
    fn test_record_with_blank_field_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("{}.json", PROFILE_KEY));
        fs::write(
            &path,
            r#"{"name":"王小明","birthDate":"1990-05-01","birthTime":"","birthPlace":"台北市"}"#,
        )
        .unwrap();
        assert_eq!(ProfileStore::open(dir.path()).load(), None);
    }

    #[test]
    fn test_persisted_record_uses_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());
        store.save(sample_profile()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["birthDate"], "1990-05-01");
        assert_eq!(value["birthTime"], "08:30");
        assert_eq!(value["birthPlace"], "台北市");
    }

    #[test]
    fn test_subscribers_receive_changes() {
        let dir = TempDir::new().unwrap();
        let mut store = ProfileStore::open(dir.path());
        let events = store.subscribe();
        let dropped = store.subscribe();
        drop(dropped);

        store.save(sample_profile()).unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            ProfileEvent::Changed(sample_profile())
        );

        let mut partial = sample_profile();
        partial.name.clear();
        let _ = store.save(partial);
        assert!(events.try_recv().is_err());
        assert_eq!(store.subscribers.len(), 1);
    }
}
