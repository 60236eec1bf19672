use crate::journal_entry::{JournalEntry, NewEntry, Reply};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Where the journal server listens. The client always talks to this address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Both failures are handled the same way by callers; they are kept apart
/// only so logs say which one happened.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request could not be sent or no response came back
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body was not the JSON we expected
    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The two endpoints the journal client needs.
#[async_trait]
pub trait JournalApi: Send + Sync {
    async fn list_entries(&self) -> Result<Vec<JournalEntry>, ApiError>;

    async fn create_entry(&self, entry: &NewEntry) -> Result<Reply, ApiError>;
}

pub struct HttpJournalApi {
    client: Client,
    base_url: String,
}

impl HttpJournalApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpJournalApi {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(%status, "server answered with a non-success status");
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for HttpJournalApi {
    fn default() -> Self {
        HttpJournalApi::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl JournalApi for HttpJournalApi {
    async fn list_entries(&self) -> Result<Vec<JournalEntry>, ApiError> {
        let url = format!("{}/api/journal/entries", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn create_entry(&self, entry: &NewEntry) -> Result<Reply, ApiError> {
        let url = format!("{}/api/journal", self.base_url);
        let response = self.client.post(&url).json(entry).send().await?;
        Self::decode(response).await
    }
}
