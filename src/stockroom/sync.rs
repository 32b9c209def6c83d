//! # Sync Coordinator
//!
//! One-directional push of the full collection to a remote endpoint. The
//! coordinator never reads from or writes to the local collection: it takes a
//! snapshot, POSTs it through [`RetryingFetch`], and interprets the
//! acknowledgement.
//!
//! ## Wire Format
//!
//! ```text
//! POST <endpoint>
//! Content-Type: application/json
//!
//! [ { "id": ..., "name": ..., "quantity": ..., "image": ..., "createdAt": ... }, ... ]
//!
//! → 2xx { "success": true|false, "message": "optional" }
//! ```
//!
//! A missing `success` field counts as `false`.

use crate::fetch::{FetchRequest, NetworkError, RetryingFetch, Sleeper, Transport};
use crate::model::Item;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

const FALLBACK_REJECTION: &str = "Sync failed";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("server rejected sync: {0}")]
    Rejected(String),

    #[error("unreadable sync response: {0}")]
    InvalidResponse(String),

    #[error("could not encode inventory: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Server acknowledgement of a sync push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct SyncCoordinator<T: Transport, S: Sleeper> {
    fetch: RetryingFetch<T, S>,
    endpoint: String,
}

impl<T: Transport, S: Sleeper> SyncCoordinator<T, S> {
    pub fn new(fetch: RetryingFetch<T, S>, endpoint: impl Into<String>) -> Self {
        Self {
            fetch,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn fetch(&self) -> &RetryingFetch<T, S> {
        &self.fetch
    }

    #[instrument(skip(self, items), fields(endpoint = %self.endpoint, items = items.len()))]
    pub async fn sync_now(&self, items: &[Item]) -> Result<SyncAck, SyncError> {
        let body = serde_json::to_string(items)?;
        let request = FetchRequest::post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body);

        let response = self.fetch.request(&request).await?;
        let ack: SyncAck = serde_json::from_str(&response.body)
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;

        if !ack.success {
            let message = ack
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_REJECTION.to_string());
            return Err(SyncError::Rejected(message));
        }

        info!("inventory synced");
        Ok(ack)
    }
}
