// Chrome Storage API integration
// Backs the core `KeyValueStore` with chrome.storage.local

use async_trait::async_trait;
use serde_json::{Map, Value};
use verse_core::{KeyValueStore, VerseError};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::chrome;

fn storage_error(e: JsValue) -> VerseError {
    VerseError::Storage(format!("{:?}", e))
}

#[derive(Clone, Copy, Default)]
pub struct ChromeStorage;

impl ChromeStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl KeyValueStore for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> verse_core::Result<Map<String, Value>> {
        let wanted = js_sys::Array::new();
        for key in keys {
            wanted.push(&JsValue::from_str(key));
        }
        let result = JsFuture::from(chrome::storage_get(wanted.into()))
            .await
            .map_err(storage_error)?;

        chrome::from_js(&result).map_err(storage_error)
    }

    async fn set(&self, items: Map<String, Value>) -> verse_core::Result<()> {
        log::debug!("Storing {:?}", items.keys().collect::<Vec<_>>());
        let obj = chrome::to_js(&items).map_err(storage_error)?;
        JsFuture::from(chrome::storage_set(obj))
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
