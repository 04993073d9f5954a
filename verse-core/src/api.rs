// Client for the static quran-api CDN

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::{Result, VerseError};
use crate::metadata::QuranInfo;
use crate::position::ReadingPosition;

/// One edition's rendering of a verse
#[derive(Debug, Clone, Deserialize)]
pub struct VerseText {
    #[serde(default)]
    pub text: Option<String>,
}

impl VerseText {
    /// Non-empty text, or an `EmptyContent` error naming the request
    pub fn into_text(self, edition: &str, position: ReadingPosition) -> Result<String> {
        match self.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(VerseError::EmptyContent {
                edition: edition.to_string(),
                position: position.to_string(),
            }),
        }
    }
}

#[async_trait(?Send)]
pub trait VerseSource {
    async fn fetch_info(&self) -> Result<QuranInfo>;

    async fn fetch_verse(&self, edition: &str, position: ReadingPosition) -> Result<VerseText>;
}

#[derive(Clone)]
pub struct HttpVerseSource {
    client: reqwest::Client,
    api: ApiConfig,
}

impl HttpVerseSource {
    pub fn new(api: ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), api)
    }

    pub fn with_client(client: reqwest::Client, api: ApiConfig) -> Self {
        Self { client, api }
    }

    async fn get_bytes(&self, url: String) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerseError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait(?Send)]
impl VerseSource for HttpVerseSource {
    async fn fetch_info(&self) -> Result<QuranInfo> {
        let bytes = self.get_bytes(self.api.info_url()).await?;
        let info = QuranInfo::from_json(&bytes)?;
        tracing::info!("Loaded metadata for {} chapters", info.chapters.len());
        Ok(info)
    }

    async fn fetch_verse(&self, edition: &str, position: ReadingPosition) -> Result<VerseText> {
        let url = self
            .api
            .verse_url(edition, position.chapter, position.verse);
        let bytes = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
