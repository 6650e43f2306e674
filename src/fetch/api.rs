//! REST endpoint transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{FetchError, Fetcher, RawObservation, USER_AGENT};

/// Fetches the status payload straight from the backend JSON endpoint.
pub struct ApiFetcher {
    client: Client,
    endpoint: String,
}

impl ApiFetcher {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Fetcher for ApiFetcher {
    async fn fetch(&self) -> Result<Option<RawObservation>, FetchError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }
        let payload = response.json::<serde_json::Value>().await?;
        Ok(Some(RawObservation::Json(payload)))
    }
}
