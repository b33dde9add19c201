//! Paynow V3 REST API request and response bodies.
//!
//! Field names follow the API's camelCase. Optional request fields are
//! skipped when unset so they never reach the wire as `null`.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// Buyer block of a payment request. Only `email` is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Single order line, prices in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
    pub price: i64,
}

/// Body of `POST /v3/payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub external_id: String,
    pub description: String,
    pub buyer: Buyer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_items: Option<Vec<OrderItem>>,
    /// Seconds the payment stays payable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub status: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Refunds
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /v3/payments/{paymentId}/refunds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRefundRequest {
    /// Minor units.
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRefundResponse {
    #[serde(default)]
    pub refund_id: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundStatusResponse {
    #[serde(default)]
    pub refund_id: String,
    #[serde(default)]
    pub status: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Payment Methods
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub status: String,
    #[serde(default)]
    pub authorization_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodGroup {
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl ErrorResponse {
    /// First reported error, if the body parses.
    pub fn first_error(body: &str) -> Option<ErrorDetail> {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|response| response.errors.into_iter().next())
    }
}
