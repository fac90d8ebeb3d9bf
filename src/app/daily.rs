use crate::app::{App, AppEvent, DailyHoroscope};
use crate::services::horoscope::HoroscopeCard;
use color_eyre::Result;

pub const HOROSCOPE_FAILED: &str = "星象連結失敗，請檢查網路後重新嘗試。";

/// One fetch per visit to the daily screen; nothing is cached
#[derive(Debug, Clone, PartialEq)]
pub enum HoroscopeState {
    Idle,
    Loading,
    Success(DailyHoroscope),
    Failure,
}

impl App {
    pub fn start_horoscope_fetch(&mut self) {
        if self.horoscope == HoroscopeState::Loading {
            return;
        }
        let Some(profile) = self.profile.clone() else {
            return;
        };

        self.horoscope = HoroscopeState::Loading;
        let gateway = self.gateway.clone();
        let event_tx = self.event_tx.clone();
        let visit = self.visit;
        std::thread::spawn(move || {
            let result = gateway.generate_daily_horoscope(&profile);
            let _ = event_tx.send(AppEvent::Horoscope { visit, result });
        });
    }

    /// Re-runs the same fetch; only meaningful after a failure
    pub fn retry_horoscope(&mut self) {
        if self.horoscope == HoroscopeState::Failure {
            self.start_horoscope_fetch();
        }
    }

    pub(super) fn handle_horoscope_result(&mut self, visit: u64, result: Result<DailyHoroscope>) {
        if !self.is_current_visit(visit) {
            return;
        }
        self.horoscope = match result {
            Ok(horoscope) => HoroscopeState::Success(horoscope),
            Err(error) => {
                tracing::error!(error = %error, "daily horoscope failed");
                HoroscopeState::Failure
            }
        };
    }

    #[must_use]
    pub fn horoscope_card(&self) -> Option<HoroscopeCard> {
        let HoroscopeState::Success(horoscope) = &self.horoscope else {
            return None;
        };
        let name = self.profile.as_ref().map_or("", |profile| profile.name.as_str());
        Some(HoroscopeCard::new(horoscope, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppMode;
    use crate::app::test_support::*;

    fn sample_horoscope() -> DailyHoroscope {
        DailyHoroscope {
            date: "2024-06-01".to_string(),
            overall_score: 82,
            lucky_color: "藍".to_string(),
            lucky_direction: "東".to_string(),
            summary: "...".to_string(),
            action_items: vec!["冥想".to_string(), "早睡".to_string()],
        }
    }

    #[test]
    fn test_entering_daily_starts_loading() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, Some(sample_profile()));
        app.navigate(AppMode::Daily);
        assert_eq!(app.horoscope, HoroscopeState::Loading);
        assert!(app.is_loading());
    }

    #[test]
    fn test_success_builds_card() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, Some(sample_profile()));
        app.navigate(AppMode::Daily);
        app.handle_horoscope_result(app.visit, Ok(sample_horoscope()));

        let card = app.horoscope_card().unwrap();
        assert_eq!(card.score, "82");
        assert_eq!(card.footer, "Astrological Forecast for 王小明 • 2024-06-01");
    }

    #[test]
    fn test_failure_then_retry() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, Some(sample_profile()));
        app.navigate(AppMode::Daily);
        app.handle_horoscope_result(app.visit, Err(color_eyre::eyre::eyre!("offline")));
        assert_eq!(app.horoscope, HoroscopeState::Failure);

        app.retry_horoscope();
        assert_eq!(app.horoscope, HoroscopeState::Loading);
    }

    #[test]
    fn test_result_from_previous_visit_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(&dir, Some(sample_profile()));
        app.navigate(AppMode::Daily);
        let stale = app.visit;
        app.navigate(AppMode::Home);
        app.handle_horoscope_result(stale, Ok(sample_horoscope()));
        assert_eq!(app.horoscope, HoroscopeState::Idle);
    }
}
