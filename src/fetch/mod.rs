//! Observation transports. The monitor core only ever sees [`Fetcher`].

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod api;
pub mod page;

// UA string the upstream site has always been probed with.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// One raw observation of the status source.
#[derive(Debug, Clone)]
pub enum RawObservation {
    Json(Value),
    Text(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Source returned non-success status: {0}")]
    BadStatus(reqwest::StatusCode),
}

/// Strategy for obtaining one observation from the status source.
///
/// `Ok(None)` means the source answered but carried nothing usable.
/// Transport failures are `Err`; the caller downgrades both to "no
/// observation" and the run becomes a no-op.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self) -> Result<Option<RawObservation>, FetchError>;
}
