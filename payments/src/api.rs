use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("request to payment provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token request rejected: {0}")]
    Auth(String),
    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("payment not completed, status {0}")]
    NotCompleted(String),
    #[error("order response carries no approve link")]
    MissingApproveLink,
    #[error("provider response is missing {0}")]
    MissingField(&'static str),
}

/// One order to create on the provider side. `order_id` is the caller's own
/// identifier; it rides along as reference, custom and invoice id so the
/// capture response can be correlated back.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrder {
    pub amount: f64,
    pub currency: String,
    pub order_id: String,
}

/// Deep links the provider redirects back to after approval.
pub const RETURN_URL: &str = "com.marketplace.app://payment-success";
pub const CANCEL_URL: &str = "com.marketplace.app://payment-cancel";

const BRAND_NAME: &str = "Marketplace App";

impl CreateOrder {
    /// The Orders API v2 request body, with the fixed mobile application
    /// context (immediate payment, no shipping, pay-now flow).
    pub fn request_body(&self) -> Value {
        json!({
            "intent": "CAPTURE",
            "application_context": {
                "return_url": RETURN_URL,
                "cancel_url": CANCEL_URL,
                "brand_name": BRAND_NAME,
                "locale": "en-US",
                "landing_page": "BILLING",
                "shipping_preference": "NO_SHIPPING",
                "user_action": "PAY_NOW",
                "payment_method": {
                    "payer_selected": "PAYPAL",
                    "payee_preferred": "IMMEDIATE_PAYMENT_REQUIRED"
                }
            },
            "purchase_units": [{
                "reference_id": self.order_id,
                "amount": {
                    "currency_code": self.currency,
                    "value": format!("{:.2}", self.amount)
                },
                "description": format!("Order {} payment", self.order_id),
                "custom_id": self.order_id,
                "invoice_id": self.order_id
            }]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// Raw create-order response body.
#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A created order with its approval redirect extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    pub id: String,
    pub status: String,
    pub approve_url: String,
}

impl OrderResponse {
    pub fn into_created(self) -> Result<OrderCreated, PaymentError> {
        let approve_url = self
            .links
            .into_iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href)
            .ok_or(PaymentError::MissingApproveLink)?;

        Ok(OrderCreated {
            id: self.id,
            status: self.status,
            approve_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Amount {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct Capture {
    pub id: String,
    pub amount: Amount,
}

#[derive(Debug, Default, Deserialize)]
pub struct CapturePayments {
    #[serde(default)]
    pub captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub payments: Option<CapturePayments>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Payer {
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Raw capture response body.
#[derive(Debug, Deserialize)]
pub struct CaptureResponse {
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default)]
    pub payer: Option<Payer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCaptured {
    /// The caller's order id, echoed back as the purchase unit's custom id.
    pub order_id: Option<String>,
    pub transaction_id: String,
    pub amount: String,
    pub currency: String,
    pub payer_email: Option<String>,
}

impl CaptureResponse {
    /// Keyed off the provider's COMPLETED status; anything else is a typed
    /// failure, not a panic on a missing field.
    pub fn into_captured(self) -> Result<PaymentCaptured, PaymentError> {
        if self.status != "COMPLETED" {
            return Err(PaymentError::NotCompleted(self.status));
        }

        let payer_email = self.payer.and_then(|payer| payer.email_address);

        let unit = self
            .purchase_units
            .into_iter()
            .next()
            .ok_or(PaymentError::MissingField("purchase_units"))?;
        let capture = unit
            .payments
            .ok_or(PaymentError::MissingField("payments"))?
            .captures
            .into_iter()
            .next()
            .ok_or(PaymentError::MissingField("captures"))?;

        Ok(PaymentCaptured {
            order_id: unit.custom_id,
            transaction_id: capture.id,
            amount: capture.amount.value,
            currency: capture.amount.currency_code,
            payer_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    use super::{CaptureResponse, CreateOrder, OrderResponse, PaymentError};

    #[test]
    fn create_order_body_carries_the_fixed_application_context() {
        let order = CreateOrder {
            amount: 49.5,
            currency: String::from("USD"),
            order_id: String::from("ord-123"),
        };

        assert_json_include!(
            actual: order.request_body(),
            expected: json!({
                "intent": "CAPTURE",
                "application_context": {
                    "return_url": "com.marketplace.app://payment-success",
                    "cancel_url": "com.marketplace.app://payment-cancel",
                    "shipping_preference": "NO_SHIPPING",
                    "user_action": "PAY_NOW"
                },
                "purchase_units": [{
                    "reference_id": "ord-123",
                    "custom_id": "ord-123",
                    "invoice_id": "ord-123",
                    "amount": {"currency_code": "USD", "value": "49.50"}
                }]
            })
        );
    }

    #[test]
    fn approve_link_is_extracted_by_relation_tag() {
        let response: OrderResponse = serde_json::from_value(json!({
            "id": "5O190127TN364715T",
            "status": "CREATED",
            "links": [
                {"href": "https://api.sandbox.paypal.com/v2/checkout/orders/5O1", "rel": "self"},
                {"href": "https://www.sandbox.paypal.com/checkoutnow?token=5O1", "rel": "approve"},
                {"href": "https://api.sandbox.paypal.com/v2/checkout/orders/5O1/capture", "rel": "capture"}
            ]
        }))
        .unwrap();

        let created = response.into_created().unwrap();
        assert_eq!(created.id, "5O190127TN364715T");
        assert_eq!(created.status, "CREATED");
        assert_eq!(
            created.approve_url,
            "https://www.sandbox.paypal.com/checkoutnow?token=5O1"
        );
    }

    #[test]
    fn order_without_approve_link_is_an_error() {
        let response: OrderResponse = serde_json::from_value(json!({
            "id": "5O1",
            "status": "CREATED",
            "links": [{"href": "https://api.sandbox.paypal.com/x", "rel": "self"}]
        }))
        .unwrap();

        assert!(matches!(
            response.into_created(),
            Err(PaymentError::MissingApproveLink)
        ));
    }

    #[test]
    fn completed_capture_decodes_to_a_payment_record() {
        let response: CaptureResponse = serde_json::from_value(json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "ord-123",
                "custom_id": "ord-123",
                "payments": {
                    "captures": [{
                        "id": "3C679366HH908993F",
                        "status": "COMPLETED",
                        "amount": {"currency_code": "USD", "value": "49.50"}
                    }]
                }
            }],
            "payer": {"email_address": "buyer@example.com"}
        }))
        .unwrap();

        let captured = response.into_captured().unwrap();
        assert_eq!(captured.order_id.as_deref(), Some("ord-123"));
        assert_eq!(captured.transaction_id, "3C679366HH908993F");
        assert_eq!(captured.amount, "49.50");
        assert_eq!(captured.currency, "USD");
        assert_eq!(captured.payer_email.as_deref(), Some("buyer@example.com"));
    }

    #[test]
    fn non_completed_capture_is_a_typed_failure() {
        let response: CaptureResponse = serde_json::from_value(json!({
            "status": "PENDING",
            "purchase_units": []
        }))
        .unwrap();

        assert!(matches!(
            response.into_captured(),
            Err(PaymentError::NotCompleted(status)) if status == "PENDING"
        ));
    }

    #[test]
    fn completed_capture_without_captures_is_a_missing_field() {
        let response: CaptureResponse = serde_json::from_value(json!({
            "status": "COMPLETED",
            "purchase_units": [{"custom_id": "ord-123", "payments": {"captures": []}}]
        }))
        .unwrap();

        assert!(matches!(
            response.into_captured(),
            Err(PaymentError::MissingField("captures"))
        ));
    }
}
