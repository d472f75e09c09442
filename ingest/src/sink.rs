use async_trait::async_trait;
use aws_sdk_sqs::types::MessageAttributeValue;
use metrics::counter;
use tracing::info;

use crate::api::IngestError;
use crate::envelope::Envelope;

/// Queue submission collaborator. Returns the queue's message id on success.
/// Retry policy lives behind this trait (the SDK's own backoff), never here.
#[async_trait]
pub trait MessageSink {
    async fn submit(&self, envelope: &Envelope) -> Result<String, IngestError>;
}

/// Logs messages instead of queueing them. Used for local runs and tests.
pub struct PrintSink {}

#[async_trait]
impl MessageSink for PrintSink {
    async fn submit(&self, envelope: &Envelope) -> Result<String, IngestError> {
        info!(
            client_ip = %envelope.client_ip,
            size = envelope.body.len(),
            "message: {}",
            envelope.body
        );
        counter!("ingest_messages_queued_total").increment(1);

        Ok(uuid::Uuid::new_v4().to_string())
    }
}

pub struct SqsSink {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsSink {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: String) -> SqsSink {
        SqsSink { client, queue_url }
    }

    fn string_attribute(value: &str) -> Result<MessageAttributeValue, IngestError> {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|e| {
                tracing::error!("failed to build message attribute: {}", e);
                IngestError::Internal
            })
    }
}

#[async_trait]
impl MessageSink for SqsSink {
    async fn submit(&self, envelope: &Envelope) -> Result<String, IngestError> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(&envelope.body)
            .message_attributes("ClientIP", Self::string_attribute(&envelope.client_ip)?)
            .message_attributes("RequestID", Self::string_attribute(&envelope.request_id)?)
            .send()
            .await
            .map_err(|e| {
                counter!("ingest_messages_dropped_total").increment(1);
                tracing::error!("failed to queue message: {}", e);
                IngestError::UpstreamUnavailable
            })?;

        counter!("ingest_messages_queued_total").increment(1);

        output
            .message_id()
            .map(String::from)
            .ok_or(IngestError::UpstreamUnavailable)
    }
}
