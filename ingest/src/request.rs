use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::api::IngestError;

/// Field the original text lands under when the body isn't valid JSON.
pub const RAW_BODY_FIELD: &str = "raw_body";

/// One API-gateway-shaped inbound request. Everything is optional at the
/// serde level; `validate` decides what is actually acceptable.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngressRequest {
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub request_context: Option<RequestContext>,
    pub http_method: Option<String>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestContext {
    /// REST-style gateways put the caller identity here.
    pub identity: Option<SourceIdentity>,
    /// HTTP v2 gateways nest it under `http` instead.
    pub http: Option<SourceIdentity>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceIdentity {
    pub source_ip: Option<String>,
}

impl IngressRequest {
    pub fn is_preflight(&self) -> bool {
        self.http_method.as_deref() == Some("OPTIONS")
    }

    /// Case-insensitive header lookup; gateways don't normalize casing.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Rejects requests with a missing or empty body. Must run before any
    /// parsing is attempted.
    pub fn validate(&self) -> Result<(), IngestError> {
        match &self.body {
            None | Some(Value::Null) => Err(IngestError::Validation(String::from(
                "Missing request body",
            ))),
            Some(body) if is_empty_body(body) => Err(IngestError::Validation(String::from(
                "Request body is empty",
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Decodes the body into the message object to queue. Parsing never fails
    /// the request: text that isn't a JSON object degrades to a raw-body
    /// wrapper, and bodies of any other shape fall back to a record of the
    /// request metadata.
    pub fn parse_body(&self) -> Map<String, Value> {
        match &self.body {
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(message)) => message,
                Ok(_) | Err(_) => {
                    tracing::warn!("request body is not a JSON object, wrapping verbatim");
                    Map::from_iter([(
                        String::from(RAW_BODY_FIELD),
                        Value::String(text.clone()),
                    )])
                }
            },
            Some(Value::Object(message)) => message.clone(),
            _ => self.metadata_fallback(),
        }
    }

    fn metadata_fallback(&self) -> Map<String, Value> {
        let fallback = json!({
            "headers": self.headers,
            "queryStringParameters": self.query_string_parameters.clone().unwrap_or_default(),
            "pathParameters": self.path_parameters.clone().unwrap_or_default(),
            "httpMethod": self.http_method.clone().unwrap_or_default(),
            "path": self.path.clone().unwrap_or_default(),
        });

        match fallback {
            Value::Object(message) => message,
            _ => unreachable!("json! object literal"),
        }
    }
}

/// Empty means blank text, an empty object or array, zero, or false —
/// none of them carry anything worth queueing.
fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Object(message) => message.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
    }
}
