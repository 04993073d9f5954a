use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use verse_core::VerseConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub verse: VerseConfig,
    pub store: StoreConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the reading position and reminder state
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("daily-verses-state.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

impl CliConfig {
    /// Load from a TOML file; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: CliConfig = toml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.http.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = CliConfig::load(Path::new("/nonexistent/daily-verses.toml")).unwrap();
        assert_eq!(config.store.path, PathBuf::from("daily-verses-state.json"));
        assert_eq!(config.verse.reminders.check_period_minutes, 60);
        assert!(config.http.timeout_secs.is_none());
    }

    #[test]
    fn test_parse_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily-verses.toml");
        fs::write(
            &path,
            r#"
[api]
translation_edition = "eng-sahihinternational"

[reminders]
snooze_minutes = 5

[store]
path = "/tmp/verses.json"

[http]
timeout_secs = 10
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.verse.api.translation_edition, "eng-sahihinternational");
        assert_eq!(config.verse.api.quran_edition, "ara-quranacademy");
        assert_eq!(config.verse.reminders.snooze_minutes, 5);
        assert_eq!(config.store.path, PathBuf::from("/tmp/verses.json"));
        assert_eq!(config.http.timeout_secs, Some(10));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[reminders\nsnooze_minutes = ").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }
}
