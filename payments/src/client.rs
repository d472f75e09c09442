use base64::Engine;

use crate::api::{
    CaptureResponse, CreateOrder, OrderCreated, OrderResponse, PaymentCaptured, PaymentError,
    TokenResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Live,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://api.sandbox.paypal.com",
            Environment::Live => "https://api.paypal.com",
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Thin Orders API v2 wrapper: token fetch, create, capture. One outbound
/// call per operation; retry and backoff belong to the HTTP client.
pub struct Client {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    access_token: Option<String>,
}

impl Client {
    pub fn new(credentials: Credentials, environment: Environment) -> Client {
        Client {
            http: reqwest::Client::new(),
            credentials,
            base_url: String::from(environment.base_url()),
            access_token: None,
        }
    }

    /// Client-credentials token, cached for the lifetime of this client.
    async fn access_token(&mut self) -> Result<String, PaymentError> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        let basic = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .header("Accept", "application/json")
            .header("Accept-Language", "en_US")
            .header("Authorization", format!("Basic {}", basic))
            .body("grant_type=client_credentials")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PaymentError::Auth(
                response.text().await.unwrap_or_default(),
            ));
        }

        let token: TokenResponse = response.json().await?;
        self.access_token = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    pub async fn create_order(&mut self, order: &CreateOrder) -> Result<OrderCreated, PaymentError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(&token)
            // Provider-side idempotency, duplicate submits return the first order
            .header("PayPal-Request-Id", &order.order_id)
            .header("Prefer", "return=representation")
            .json(&order.request_body())
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            return Err(PaymentError::Provider {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let decoded: OrderResponse = response.json().await?;
        tracing::info!(order_id = %decoded.id, status = %decoded.status, "order created");
        decoded.into_created()
    }

    pub async fn capture_order(
        &mut self,
        provider_order_id: &str,
    ) -> Result<PaymentCaptured, PaymentError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.base_url, provider_order_id
            ))
            .bearer_auth(&token)
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            return Err(PaymentError::Provider {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let decoded: CaptureResponse = response.json().await?;
        decoded.into_captured()
    }
}
