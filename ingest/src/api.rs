use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{0}")]
    Validation(String),

    #[error("Request payload too large")]
    PayloadTooLarge,

    // Deliberately generic, we don't want to leak queue internals to callers
    #[error("Service temporarily unavailable")]
    UpstreamUnavailable,

    #[error("Internal server error")]
    Internal,
}

impl IngestError {
    pub fn status_code(&self) -> u16 {
        match self {
            IngestError::Validation(_) => 400,
            IngestError::PayloadTooLarge => 413,
            IngestError::UpstreamUnavailable => 502,
            IngestError::Internal => 500,
        }
    }
}

/// Response in the shape the API gateway maps back onto an HTTP response.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody {
    pub success: bool,
    pub message: String,
    pub message_id: String,
    pub client_ip: String,
    pub processing_time: String,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(rename = "clientIp", skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

fn cors_headers() -> HashMap<String, String> {
    HashMap::from([
        (
            String::from("Access-Control-Allow-Origin"),
            String::from("*"),
        ),
        (
            String::from("Access-Control-Allow-Methods"),
            String::from("POST, OPTIONS"),
        ),
        (
            String::from("Access-Control-Allow-Headers"),
            String::from("Content-Type"),
        ),
    ])
}

fn json_cors_headers() -> HashMap<String, String> {
    let mut headers = cors_headers();
    headers.insert(
        String::from("Content-Type"),
        String::from("application/json"),
    );
    headers
}

impl GatewayResponse {
    /// Bodyless 200 answering a CORS preflight, bypassing the whole pipeline.
    pub fn preflight() -> GatewayResponse {
        GatewayResponse {
            status_code: 200,
            headers: cors_headers(),
            body: String::new(),
        }
    }

    pub fn success(message_id: &str, client_ip: &str, processing_time: &str) -> GatewayResponse {
        let body = SuccessBody {
            success: true,
            message: String::from("Data queued successfully"),
            message_id: message_id.to_string(),
            client_ip: client_ip.to_string(),
            processing_time: processing_time.to_string(),
        };

        GatewayResponse {
            status_code: 200,
            headers: json_cors_headers(),
            body: serde_json::to_string(&body).unwrap_or_default(),
        }
    }

    pub fn error(error: &IngestError, client_ip: Option<&str>) -> GatewayResponse {
        let body = ErrorBody {
            success: false,
            error: error.to_string(),
            client_ip: client_ip.map(String::from),
        };

        GatewayResponse {
            status_code: error.status_code(),
            headers: json_cors_headers(),
            body: serde_json::to_string(&body).unwrap_or_default(),
        }
    }
}
