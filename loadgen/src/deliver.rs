use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::batch::EventBatch;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum DeliverError {
    #[error("failed to send batch: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Rejected(u16),
}

/// Event delivery collaborator. Success is a 200, nothing else; retries are
/// the caller's business.
#[async_trait]
pub trait BatchSink {
    async fn deliver(&self, batch: &EventBatch) -> Result<(), DeliverError>;
}

pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: String) -> Result<HttpSink, DeliverError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(HttpSink { client, endpoint })
    }
}

#[async_trait]
impl BatchSink for HttpSink {
    async fn deliver(&self, batch: &EventBatch) -> Result<(), DeliverError> {
        let response = self.client.post(&self.endpoint).json(batch).send().await?;

        let status = response.status();
        if status.as_u16() == 200 {
            Ok(())
        } else {
            Err(DeliverError::Rejected(status.as_u16()))
        }
    }
}

/// Logs batches instead of sending them, for dry runs.
pub struct PrintSink {}

#[async_trait]
impl BatchSink for PrintSink {
    async fn deliver(&self, batch: &EventBatch) -> Result<(), DeliverError> {
        let encoded = serde_json::to_string(batch).unwrap_or_default();
        info!(
            user_id = batch.device_info.user_id,
            events = batch.event_list.len(),
            "batch: {}",
            encoded
        );
        Ok(())
    }
}
