// Reading position and reminder state persisted as one JSON object on disk

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use verse_core::{KeyValueStore, VerseError};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn load(&self) -> verse_core::Result<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                VerseError::Storage(format!("corrupt store {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(VerseError::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[async_trait(?Send)]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> verse_core::Result<Map<String, Value>> {
        let mut values = self.load().await?;
        values.retain(|key, _| keys.contains(&key.as_str()));
        Ok(values)
    }

    async fn set(&self, items: Map<String, Value>) -> verse_core::Result<()> {
        let mut values = self.load().await?;
        values.extend(items);

        let json = serde_json::to_vec_pretty(&values)?;
        let write_error =
            |e: std::io::Error| VerseError::Storage(format!("failed to write {}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        // Atomic replace
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(write_error)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(write_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verse_core::config::ReminderConfig;
    use verse_core::testing::RecordingHost;
    use verse_core::{HostEvent, ReadingPosition, ReminderStore, Scheduler};

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.get(&["currentChapter"]).await.unwrap().is_empty());
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = ReminderStore::new(JsonFileStore::new(&path));
        store.seed(1_000).await.unwrap();
        store
            .set_position(ReadingPosition::new(36, 12), 2_000)
            .await
            .unwrap();

        let reopened = ReminderStore::new(JsonFileStore::new(&path));
        assert_eq!(
            reopened.position().await.unwrap(),
            ReadingPosition::new(36, 12)
        );
        assert_eq!(reopened.last_shown_time().await.unwrap(), Some(2_000));
        assert!(reopened.reminders_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get(&["lastShownTime"]).await,
            Err(VerseError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_install_then_restart_keeps_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let scheduler = Scheduler::new(
            RecordingHost::at(5_000),
            JsonFileStore::new(&path),
            ReminderConfig::default(),
        );
        scheduler.dispatch(HostEvent::Installed).await;
        scheduler
            .store()
            .set_position(ReadingPosition::new(2, 5), 6_000)
            .await
            .unwrap();

        // A browser restart only dispatches Startup; the position survives
        let restarted = Scheduler::new(
            RecordingHost::at(7_000),
            JsonFileStore::new(&path),
            ReminderConfig::default(),
        );
        restarted.dispatch(HostEvent::Startup).await;

        let store = restarted.store();
        assert_eq!(store.position().await.unwrap(), ReadingPosition::new(2, 5));
        assert_eq!(store.last_shown_time().await.unwrap(), Some(7_000));
        assert_eq!(restarted.host().notifications().len(), 1);
    }
}
