use serde_json::{Map, Value};

use crate::api::IngestError;

/// Hard per-message limit of the downstream queue, 256 KiB.
pub const MAX_MESSAGE_BYTES: usize = 262_144;

/// The resolved client address rides inside the message under this field.
pub const IP_FIELD: &str = "ip_address";

/// The size-checked, serialized unit handed to the queue sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub body: String,
    pub client_ip: String,
    pub request_id: String,
}

impl Envelope {
    /// Merges the client IP into the message and serializes it. The size
    /// ceiling is enforced here, before any delivery is attempted, so an
    /// oversized payload is a 413 rather than a queue-side error.
    pub fn build(
        mut message: Map<String, Value>,
        client_ip: &str,
        request_id: &str,
    ) -> Result<Envelope, IngestError> {
        message.insert(
            String::from(IP_FIELD),
            Value::String(String::from(client_ip)),
        );

        let body = serde_json::to_string(&message).map_err(|e| {
            tracing::error!("failed to serialize message: {}", e);
            IngestError::Internal
        })?;

        if body.len() > MAX_MESSAGE_BYTES {
            tracing::warn!(
                size = body.len(),
                limit = MAX_MESSAGE_BYTES,
                "message exceeds queue size limit"
            );
            return Err(IngestError::PayloadTooLarge);
        }

        Ok(Envelope {
            body,
            client_ip: String::from(client_ip),
            request_id: String::from(request_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::{Envelope, MAX_MESSAGE_BYTES};
    use crate::api::IngestError;

    fn message_with_data(data: String) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert(String::from("data"), Value::String(data));
        message
    }

    /// Serialized bytes besides the `data` field content itself.
    fn fixed_overhead() -> usize {
        let envelope = Envelope::build(message_with_data(String::new()), "1.2.3.4", "req-1")
            .expect("empty message fits");
        envelope.body.len()
    }

    #[test]
    fn client_ip_is_merged_into_the_message() {
        let envelope =
            Envelope::build(message_with_data(String::from("x")), "1.2.3.4", "req-1").unwrap();
        let decoded: Value = serde_json::from_str(&envelope.body).unwrap();

        assert_eq!(decoded["ip_address"], json!("1.2.3.4"));
        assert_eq!(decoded["data"], json!("x"));
    }

    #[test]
    fn exactly_at_the_limit_is_accepted() {
        let padding = MAX_MESSAGE_BYTES - fixed_overhead();
        let envelope =
            Envelope::build(message_with_data("a".repeat(padding)), "1.2.3.4", "req-1").unwrap();

        assert_eq!(envelope.body.len(), MAX_MESSAGE_BYTES);
    }

    #[test]
    fn one_byte_over_the_limit_is_rejected() {
        let padding = MAX_MESSAGE_BYTES - fixed_overhead() + 1;
        let result = Envelope::build(message_with_data("a".repeat(padding)), "1.2.3.4", "req-1");

        assert!(matches!(result, Err(IngestError::PayloadTooLarge)));
    }

    #[test]
    fn non_ascii_content_is_measured_in_bytes() {
        // Three bytes per character once serialized, not one
        let message = message_with_data("名".repeat(MAX_MESSAGE_BYTES / 3));
        let result = Envelope::build(message, "1.2.3.4", "req-1");

        assert!(matches!(result, Err(IngestError::PayloadTooLarge)));
    }
}
