// Fixed text constants and the tunable API / reminder settings

use serde::Deserialize;

pub const TOTAL_CHAPTERS: u16 = 114;
pub const TOTAL_VERSES: u32 = 6236;
pub const TOTAL_JUZS: u8 = 30;

pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/fawazahmed0/quran-api@1";
pub const QURAN_EDITION: &str = "ara-quranacademy";
pub const TRANSLATION_EDITION: &str = "ben-muhiuddinkhan";

/// Alarm names shared with the host
pub const INITIAL_REMINDER_ALARM: &str = "initialReminder";
pub const CHECK_VERSE_TIME_ALARM: &str = "checkVerseTime";
pub const REMINDER_SNOOZE_ALARM: &str = "reminderSnooze";

/// Keyboard command bound in the manifest
pub const SHOW_VERSE_COMMAND: &str = "show_verse";

const MINUTE_MILLIS: i64 = 60 * 1000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerseConfig {
    pub api: ApiConfig,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Source-script (Arabic) edition
    pub quran_edition: String,
    pub translation_edition: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            quran_edition: QURAN_EDITION.to_string(),
            translation_edition: TRANSLATION_EDITION.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn info_url(&self) -> String {
        format!("{}/info.json", self.base_url.trim_end_matches('/'))
    }

    pub fn verse_url(&self, edition: &str, chapter: u16, verse: u16) -> String {
        format!(
            "{}/editions/{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            edition,
            chapter,
            verse
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub check_period_minutes: u32,
    pub initial_delay_minutes: u32,
    pub snooze_minutes: u32,
    /// Minimum time since the last shown verse before a reminder is due
    pub remind_after_minutes: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            check_period_minutes: 60,
            initial_delay_minutes: 1,
            snooze_minutes: 15,
            remind_after_minutes: 60,
        }
    }
}

impl ReminderConfig {
    pub fn remind_after_millis(&self) -> i64 {
        i64::from(self.remind_after_minutes) * MINUTE_MILLIS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let api = ApiConfig::default();
        assert_eq!(
            api.info_url(),
            "https://cdn.jsdelivr.net/gh/fawazahmed0/quran-api@1/info.json"
        );
        assert_eq!(
            api.verse_url(QURAN_EDITION, 2, 255),
            "https://cdn.jsdelivr.net/gh/fawazahmed0/quran-api@1/editions/ara-quranacademy/2/255.json"
        );
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let api = ApiConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.info_url(), "http://localhost:8080/info.json");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: VerseConfig = serde_json::from_str(r#"{"reminders": {"snooze_minutes": 5}}"#)
            .expect("config should parse");
        assert_eq!(config.reminders.snooze_minutes, 5);
        assert_eq!(config.reminders.check_period_minutes, 60);
        assert_eq!(config.api.translation_edition, TRANSLATION_EDITION);
        assert_eq!(config.reminders.remind_after_millis(), 3_600_000);
    }
}
