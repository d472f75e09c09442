use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_json_diff::assert_json_include;
use async_trait::async_trait;
use serde_json::{json, Value};

use ingest::api::IngestError;
use ingest::envelope::Envelope;
use ingest::handler::Handler;
use ingest::request::IngressRequest;
use ingest::sink::MessageSink;

#[derive(Clone, Default)]
struct MemorySink {
    envelopes: Arc<Mutex<Vec<Envelope>>>,
}

impl MemorySink {
    fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn submit(&self, envelope: &Envelope) -> Result<String, IngestError> {
        self.envelopes.lock().unwrap().push(envelope.clone());
        Ok(String::from("mem-message-1"))
    }
}

struct FailingSink {}

#[async_trait]
impl MessageSink for FailingSink {
    async fn submit(&self, _envelope: &Envelope) -> Result<String, IngestError> {
        Err(IngestError::UpstreamUnavailable)
    }
}

fn post_request(body: Value) -> IngressRequest {
    IngressRequest {
        http_method: Some(String::from("POST")),
        headers: HashMap::from([(
            String::from("X-Forwarded-For"),
            String::from("1.2.3.4, 5.6.7.8"),
        )]),
        body: Some(body),
        ..Default::default()
    }
}

#[tokio::test]
async fn json_body_is_queued_with_ip_merged() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    let request = post_request(json!(r#"{"user_id": 7, "event_list": []}"#));
    let response = handler.handle(request, "req-42").await;

    assert_eq!(response.status_code, 200);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_json_include!(
        actual: body.clone(),
        expected: json!({
            "success": true,
            "message": "Data queued successfully",
            "messageId": "mem-message-1",
            "clientIp": "1.2.3.4"
        })
    );
    assert!(
        body["processingTime"].as_str().unwrap().ends_with('s'),
        "{:?}",
        body["processingTime"]
    );

    let envelopes = sink.envelopes();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].client_ip, "1.2.3.4");
    assert_eq!(envelopes[0].request_id, "req-42");

    let queued: Value = serde_json::from_str(&envelopes[0].body).unwrap();
    assert_eq!(
        queued,
        json!({"user_id": 7, "event_list": [], "ip_address": "1.2.3.4"})
    );
}

#[tokio::test]
async fn options_short_circuits_before_validation() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    // No body at all; a POST would be a 400
    let request = IngressRequest {
        http_method: Some(String::from("OPTIONS")),
        ..Default::default()
    };
    let response = handler.handle(request, "req-1").await;

    assert_eq!(response.status_code, 200);
    assert!(response.body.is_empty());
    assert_eq!(
        response.headers.get("Access-Control-Allow-Origin"),
        Some(&String::from("*"))
    );
    assert!(sink.envelopes().is_empty());
}

#[tokio::test]
async fn empty_body_is_rejected_with_client_ip_preserved() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    let response = handler.handle(post_request(json!("")), "req-1").await;

    assert_eq!(response.status_code, 400);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Request body is empty",
            "clientIp": "1.2.3.4"
        })
    );
    assert!(sink.envelopes().is_empty());
}

#[tokio::test]
async fn empty_object_body_is_rejected_before_enveloping() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    let response = handler.handle(post_request(json!({})), "req-1").await;

    assert_eq!(response.status_code, 400);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], json!("Request body is empty"));
    assert!(sink.envelopes().is_empty());
}

#[tokio::test]
async fn non_json_text_is_queued_under_raw_body() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    let response = handler.handle(post_request(json!("plain text")), "req-1").await;

    assert_eq!(response.status_code, 200);
    let queued: Value = serde_json::from_str(&sink.envelopes()[0].body).unwrap();
    assert_eq!(
        queued,
        json!({"raw_body": "plain text", "ip_address": "1.2.3.4"})
    );
}

#[tokio::test]
async fn oversized_payload_is_a_413_and_never_reaches_the_sink() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    let request = post_request(json!({"data": "a".repeat(ingest::envelope::MAX_MESSAGE_BYTES)}));
    let response = handler.handle(request, "req-1").await;

    assert_eq!(response.status_code, 413);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], json!("Request payload too large"));
    assert!(sink.envelopes().is_empty());
}

#[tokio::test]
async fn sink_failure_maps_to_generic_502() {
    let handler = Handler::new(Arc::new(FailingSink {}));

    let response = handler
        .handle(post_request(json!(r#"{"k": "v"}"#)), "req-1")
        .await;

    assert_eq!(response.status_code, 502);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], json!("Service temporarily unavailable"));
}

#[tokio::test]
async fn context_identity_ip_is_used_without_forwarding_headers() {
    let sink = MemorySink::default();
    let handler = Handler::new(Arc::new(sink.clone()));

    let request: IngressRequest = serde_json::from_value(json!({
        "httpMethod": "POST",
        "body": "{\"k\": \"v\"}",
        "requestContext": {"identity": {"sourceIp": "9.9.9.9"}}
    }))
    .unwrap();
    let response = handler.handle(request, "req-1").await;

    assert_eq!(response.status_code, 200);
    let queued: Value = serde_json::from_str(&sink.envelopes()[0].body).unwrap();
    assert_eq!(queued["ip_address"], json!("9.9.9.9"));
}
