// Typed access to the four persisted fields
//
// Hosts provide a flat JSON key-value store (chrome.storage.local, a file,
// memory); `ReminderStore` hides the keys and value coercions.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::position::ReadingPosition;

pub const CURRENT_CHAPTER_KEY: &str = "currentChapter";
pub const CURRENT_VERSE_KEY: &str = "currentVerse";
pub const LAST_SHOWN_TIME_KEY: &str = "lastShownTime";
pub const REMINDERS_ENABLED_KEY: &str = "remindersEnabled";

#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Values for the requested keys; absent keys are omitted
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Merge `items` into the store
    async fn set(&self, items: Map<String, Value>) -> Result<()>;
}

pub struct ReminderStore<S> {
    inner: S,
}

impl<S: KeyValueStore> ReminderStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Install-time defaults: 1:1, shown now, reminders on
    pub async fn seed(&self, now_millis: i64) -> Result<()> {
        let mut items = Map::new();
        items.insert(CURRENT_CHAPTER_KEY.into(), Value::from(1));
        items.insert(CURRENT_VERSE_KEY.into(), Value::from(1));
        items.insert(LAST_SHOWN_TIME_KEY.into(), Value::from(now_millis));
        items.insert(REMINDERS_ENABLED_KEY.into(), Value::from(true));
        self.inner.set(items).await
    }

    /// Stored position, with unset or zero fields falling back to 1
    pub async fn position(&self) -> Result<ReadingPosition> {
        let values = self
            .inner
            .get(&[CURRENT_CHAPTER_KEY, CURRENT_VERSE_KEY])
            .await?;

        let field = |key: &str| {
            values
                .get(key)
                .and_then(as_integer)
                .and_then(|n| u16::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(1)
        };

        Ok(ReadingPosition::new(
            field(CURRENT_CHAPTER_KEY),
            field(CURRENT_VERSE_KEY),
        ))
    }

    /// Persist a committed navigation together with its display time
    pub async fn set_position(&self, position: ReadingPosition, now_millis: i64) -> Result<()> {
        let mut items = Map::new();
        items.insert(CURRENT_CHAPTER_KEY.into(), Value::from(position.chapter));
        items.insert(CURRENT_VERSE_KEY.into(), Value::from(position.verse));
        items.insert(LAST_SHOWN_TIME_KEY.into(), Value::from(now_millis));
        self.inner.set(items).await
    }

    pub async fn last_shown_time(&self) -> Result<Option<i64>> {
        let values = self.inner.get(&[LAST_SHOWN_TIME_KEY]).await?;
        Ok(values.get(LAST_SHOWN_TIME_KEY).and_then(as_integer))
    }

    pub async fn set_last_shown_time(&self, now_millis: i64) -> Result<()> {
        let mut items = Map::new();
        items.insert(LAST_SHOWN_TIME_KEY.into(), Value::from(now_millis));
        self.inner.set(items).await
    }

    /// Unset counts as disabled, matching a store that was never seeded
    pub async fn reminders_enabled(&self) -> Result<bool> {
        let values = self.inner.get(&[REMINDERS_ENABLED_KEY]).await?;
        Ok(values
            .get(REMINDERS_ENABLED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    pub async fn set_reminders_enabled(&self, enabled: bool) -> Result<()> {
        let mut items = Map::new();
        items.insert(REMINDERS_ENABLED_KEY.into(), Value::from(enabled));
        self.inner.set(items).await
    }
}

/// Browsers hand numbers back as doubles (`Date.now()`), so accept both
fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn test_seed_defaults() {
        let store = ReminderStore::new(MemoryStore::new());
        store.seed(1_000).await.unwrap();

        assert_eq!(store.position().await.unwrap(), ReadingPosition::new(1, 1));
        assert_eq!(store.last_shown_time().await.unwrap(), Some(1_000));
        assert!(store.reminders_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_unset_position_defaults_to_start() {
        let store = ReminderStore::new(MemoryStore::new());
        assert_eq!(store.position().await.unwrap(), ReadingPosition::default());
        assert_eq!(store.last_shown_time().await.unwrap(), None);
        assert!(!store.reminders_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_float_values_are_accepted() {
        let memory = MemoryStore::new();
        memory.insert(CURRENT_CHAPTER_KEY, Value::from(18.0));
        memory.insert(CURRENT_VERSE_KEY, Value::from(0));
        memory.insert(LAST_SHOWN_TIME_KEY, Value::from(1_700_000_000_123.0));
        let store = ReminderStore::new(memory);

        assert_eq!(store.position().await.unwrap(), ReadingPosition::new(18, 1));
        assert_eq!(
            store.last_shown_time().await.unwrap(),
            Some(1_700_000_000_123)
        );
    }

    #[tokio::test]
    async fn test_set_position_updates_time() {
        let store = ReminderStore::new(MemoryStore::new());
        store
            .set_position(ReadingPosition::new(3, 4), 42)
            .await
            .unwrap();

        assert_eq!(store.position().await.unwrap(), ReadingPosition::new(3, 4));
        assert_eq!(store.last_shown_time().await.unwrap(), Some(42));
    }
}
