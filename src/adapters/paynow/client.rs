//! Paynow V3 REST client.
//!
//! Every call goes through one request path: mint an idempotency key, sign
//! headers, query and body, send, record the response, then interpret the
//! status for the operation at hand.
//!
//! # Sessions
//!
//! By default each call connects, exchanges and drops its transport. Call
//! [`PaynowClient::open`] to hold one transport for a series of calls, or
//! [`PaynowClient::with_transport`] to reuse a handle the caller manages.
//!
//! ```ignore
//! let mut client = PaynowClient::new(credentials, SANDBOX_URL, connector);
//! client.open().await?;
//! let methods = client.get_payment_methods(None, None).await?;
//! client.close();
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::foundation::require_non_empty;
use crate::domain::paynow::{to_minor_units, Currency, PaynowSigner, RefundReason};
use crate::ports::{
    HttpTransport, PaymentError, TransportConnector, TransportRequest, TransportResponse,
};

use super::api_types::{
    Buyer, CreatePaymentRequest, CreatePaymentResponse, CreateRefundRequest,
    CreateRefundResponse, ErrorResponse, OrderItem, PaymentMethodGroup, PaymentStatusResponse,
    RefundStatusResponse,
};

const API_KEY_HEADER: &str = "api-key";
const SIGNATURE_HEADER: &str = "signature";
const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
const APPLICATION_JSON: &str = "application/json";

/// Merchant credentials issued by Paynow.
#[derive(Clone)]
pub struct Credentials {
    api_key: SecretString,
    signature_key: SecretString,
}

impl Credentials {
    pub fn new(api_key: SecretString, signature_key: SecretString) -> Self {
        Self {
            api_key,
            signature_key,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("signature_key", &"[REDACTED]")
            .finish()
    }
}

/// Payment to register with Paynow. Amounts are in the main currency unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub amount: Decimal,
    pub currency: Currency,
    pub external_id: String,
    pub description: String,
    pub buyer: Buyer,
    pub continue_url: Option<String>,
    pub order_items: Option<Vec<OrderItem>>,
    pub validity_time: Option<u32>,
    pub locale: Option<String>,
}

impl NewPayment {
    pub fn new(
        amount: Decimal,
        currency: Currency,
        external_id: impl Into<String>,
        description: impl Into<String>,
        buyer_email: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency,
            external_id: external_id.into(),
            description: description.into(),
            buyer: Buyer {
                email: buyer_email.into(),
                ..Default::default()
            },
            continue_url: None,
            order_items: None,
            validity_time: None,
            locale: None,
        }
    }

    pub fn with_buyer_name(
        mut self,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        self.buyer.first_name = first_name;
        self.buyer.last_name = last_name;
        self
    }

    pub fn with_buyer_phone(mut self, phone: impl Into<String>) -> Self {
        self.buyer.phone = Some(phone.into());
        self
    }

    pub fn with_continue_url(mut self, url: impl Into<String>) -> Self {
        self.continue_url = Some(url.into());
        self
    }

    pub fn with_order_items(mut self, items: Vec<OrderItem>) -> Self {
        self.order_items = Some(items);
        self
    }

    pub fn with_validity_time(mut self, seconds: u32) -> Self {
        self.validity_time = Some(seconds);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    fn to_request(&self) -> Result<CreatePaymentRequest, PaymentError> {
        let amount = to_minor_units(self.amount)
            .map_err(|e| PaymentError::invalid_request(e.to_string()))?;

        Ok(CreatePaymentRequest {
            amount,
            currency: self.currency.to_string(),
            external_id: self.external_id.clone(),
            description: self.description.clone(),
            buyer: self.buyer.clone(),
            continue_url: self.continue_url.clone(),
            order_items: self.order_items.clone(),
            validity_time: self.validity_time,
            locale: self.locale.clone(),
        })
    }
}

/// Transport the client sends through.
enum TransportSession {
    /// Connect per call.
    Detached,

    /// Handle managed by the caller.
    Shared(Arc<dyn HttpTransport>),

    /// Handle acquired by `open`; released on `close` or drop.
    Owned(Box<dyn HttpTransport>),
}

/// Client for the Paynow V3 API.
pub struct PaynowClient {
    credentials: Credentials,
    signer: PaynowSigner,
    api_url: String,
    connector: Arc<dyn TransportConnector>,
    session: TransportSession,
    last_response: Mutex<Option<TransportResponse>>,
}

impl PaynowClient {
    /// Create a client for `api_url` (trailing slashes ignored).
    pub fn new(
        credentials: Credentials,
        api_url: impl Into<String>,
        connector: Arc<dyn TransportConnector>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let signer = PaynowSigner::new(credentials.signature_key.clone());

        Self {
            credentials,
            signer,
            api_url,
            connector,
            session: TransportSession::Detached,
            last_response: Mutex::new(None),
        }
    }

    /// Send through a caller-managed transport instead of connecting.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.session = TransportSession::Shared(transport);
        self
    }

    /// Acquire a transport to reuse until `close`.
    ///
    /// No-op when a transport is already held or supplied by the caller.
    pub async fn open(&mut self) -> Result<(), PaymentError> {
        if let TransportSession::Detached = self.session {
            let transport = self.connector.connect().await?;
            self.session = TransportSession::Owned(transport);
            tracing::debug!(api_url = %self.api_url, "Opened Paynow session");
        }
        Ok(())
    }

    /// Release a transport acquired by `open`. Caller-managed handles stay.
    pub fn close(&mut self) {
        if let TransportSession::Owned(_) = self.session {
            self.session = TransportSession::Detached;
            tracing::debug!(api_url = %self.api_url, "Closed Paynow session");
        }
    }

    /// Whether calls currently reuse one transport.
    pub fn is_open(&self) -> bool {
        !matches!(self.session, TransportSession::Detached)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Signer bound to this client's signature key.
    pub fn signer(&self) -> &PaynowSigner {
        &self.signer
    }

    /// Most recent gateway response, successful or not.
    pub fn last_response(&self) -> Option<TransportResponse> {
        self.last_response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Operations
    // ════════════════════════════════════════════════════════════════════════

    /// `POST /v3/payments`
    pub async fn create_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<CreatePaymentResponse, PaymentError> {
        let body = to_json(&payment.to_request()?)?;
        let response = self
            .request(Method::POST, "/v3/payments", Some(body), BTreeMap::new())
            .await?;

        match response.status {
            StatusCode::OK | StatusCode::CREATED => parse_body(&response),
            _ => Err(self.failure(response, "create_payment")),
        }
    }

    /// `GET /v3/payments/{paymentId}/status`
    pub async fn get_payment_status(
        &self,
        payment_id: &str,
    ) -> Result<PaymentStatusResponse, PaymentError> {
        let payment_id = path_segment("payment_id", payment_id)?;
        let path = format!("/v3/payments/{}/status", payment_id);
        let response = self
            .request(Method::GET, &path, None, BTreeMap::new())
            .await?;

        match response.status {
            StatusCode::OK => parse_body(&response),
            _ => Err(self.failure(response, "get_payment_status")),
        }
    }

    /// `POST /v3/payments/{paymentId}/refunds`
    ///
    /// Any non-401 failure is reported as `RefundFailure`.
    pub async fn create_refund(
        &self,
        payment_id: &str,
        amount: Decimal,
        reason: Option<RefundReason>,
    ) -> Result<CreateRefundResponse, PaymentError> {
        let payment_id = path_segment("payment_id", payment_id)?;
        let request = CreateRefundRequest {
            amount: to_minor_units(amount)
                .map_err(|e| PaymentError::invalid_request(e.to_string()))?,
            reason: reason.map(|r| r.to_string()),
        };
        let path = format!("/v3/payments/{}/refunds", payment_id);
        let response = self
            .request(Method::POST, &path, Some(to_json(&request)?), BTreeMap::new())
            .await?;

        match response.status {
            StatusCode::OK | StatusCode::CREATED => parse_body(&response),
            StatusCode::UNAUTHORIZED => Err(self.failure(response, "create_refund")),
            status => {
                tracing::warn!(
                    payment_id = %payment_id,
                    status = status.as_u16(),
                    "Paynow refund rejected"
                );
                let error = PaymentError::refund_failure("Error creating Paynow refund.");
                Err(annotate(error, response))
            }
        }
    }

    /// `GET /v3/refunds/{refundId}/status`
    pub async fn get_refund_status(
        &self,
        refund_id: &str,
    ) -> Result<RefundStatusResponse, PaymentError> {
        let refund_id = path_segment("refund_id", refund_id)?;
        let path = format!("/v3/refunds/{}/status", refund_id);
        let response = self
            .request(Method::GET, &path, None, BTreeMap::new())
            .await?;

        match response.status {
            StatusCode::OK => parse_body(&response),
            _ => Err(self.failure(response, "get_refund_status")),
        }
    }

    /// `POST /v3/refunds/{refundId}/cancel`
    ///
    /// Only refunds still in `NEW` can be cancelled.
    pub async fn cancel_refund(&self, refund_id: &str) -> Result<(), PaymentError> {
        let refund_id = path_segment("refund_id", refund_id)?;
        let path = format!("/v3/refunds/{}/cancel", refund_id);
        let response = self
            .request(Method::POST, &path, None, BTreeMap::new())
            .await?;

        match response.status {
            StatusCode::OK | StatusCode::ACCEPTED => Ok(()),
            _ => Err(self.failure(response, "cancel_refund")),
        }
    }

    /// `GET /v3/payments/paymentmethods`, optionally filtered.
    pub async fn get_payment_methods(
        &self,
        amount: Option<Decimal>,
        currency: Option<Currency>,
    ) -> Result<Vec<PaymentMethodGroup>, PaymentError> {
        let mut params = BTreeMap::new();
        if let Some(amount) = amount {
            let minor =
                to_minor_units(amount).map_err(|e| PaymentError::invalid_request(e.to_string()))?;
            params.insert("amount".to_string(), minor.to_string());
        }
        if let Some(currency) = currency {
            params.insert("currency".to_string(), currency.to_string());
        }

        let response = self
            .request(Method::GET, "/v3/payments/paymentmethods", None, params)
            .await?;

        match response.status {
            StatusCode::OK => parse_body(&response),
            _ => Err(self.failure(response, "get_payment_methods")),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Request Path
    // ════════════════════════════════════════════════════════════════════════

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        params: BTreeMap<String, String>,
    ) -> Result<TransportResponse, PaymentError> {
        let idempotency_key = Uuid::new_v4().to_string();
        let api_key = self.credentials.api_key.expose_secret();

        let signature = self
            .signer
            .request_signature(
                api_key,
                &idempotency_key,
                body.as_deref().unwrap_or(""),
                &params,
            )
            .map_err(|e| PaymentError::invalid_request(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value("Api-Key", api_key)?,
        );
        headers.insert(
            HeaderName::from_static(SIGNATURE_HEADER),
            header_value("Signature", &signature)?,
        );
        headers.insert(
            HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
            header_value("Idempotency-Key", &idempotency_key)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        let request = TransportRequest {
            method: method.clone(),
            url: format!("{}{}", self.api_url, path),
            headers,
            body,
            query: params.into_iter().collect(),
        };

        tracing::debug!(
            method = %method,
            path = %path,
            idempotency_key = %idempotency_key,
            "Sending Paynow request"
        );

        let response = match &self.session {
            TransportSession::Detached => {
                let transport = self.connector.connect().await?;
                transport.send(request).await?
            }
            TransportSession::Shared(transport) => transport.send(request).await?,
            TransportSession::Owned(transport) => transport.send(request).await?,
        };

        tracing::debug!(
            path = %path,
            status = response.status.as_u16(),
            "Received Paynow response"
        );

        *self
            .last_response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(response.clone());

        Ok(response)
    }

    /// Error for an unexpected status: 401 is a credentials problem,
    /// anything else a communication problem.
    fn failure(&self, response: TransportResponse, operation: &str) -> PaymentError {
        let status = response.status.as_u16();
        let error = if response.status == StatusCode::UNAUTHORIZED {
            PaymentError::credentials("Paynow API authentication failed.")
        } else {
            PaymentError::communication(format!("Paynow API error (HTTP {}).", status))
        };

        tracing::warn!(operation = %operation, status, "Paynow request failed");
        annotate(error, response)
    }
}

impl std::fmt::Debug for PaynowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaynowClient")
            .field("credentials", &self.credentials)
            .field("api_url", &self.api_url)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Attaches the gateway's error type and the raw response.
fn annotate(error: PaymentError, response: TransportResponse) -> PaymentError {
    let error = match ErrorResponse::first_error(&response.body) {
        Some(detail) => error.with_provider_code(detail.error_type),
        None => error,
    };
    error.with_response(response)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, PaymentError> {
    HeaderValue::from_str(value).map_err(|_| {
        PaymentError::invalid_request(format!("{} contains invalid header characters", name))
    })
}

fn path_segment<'a>(field: &str, value: &'a str) -> Result<&'a str, PaymentError> {
    let value =
        require_non_empty(field, value).map_err(|e| PaymentError::invalid_request(e.to_string()))?;
    if value.contains(['/', '?', '#']) {
        return Err(PaymentError::invalid_request(format!(
            "{} must not contain URL delimiters",
            field
        )));
    }
    Ok(value)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, PaymentError> {
    serde_json::to_string(value).map_err(|e| PaymentError::invalid_request(e.to_string()))
}

fn parse_body<T: DeserializeOwned>(response: &TransportResponse) -> Result<T, PaymentError> {
    serde_json::from_str(&response.body).map_err(|e| {
        PaymentError::invalid_response(format!("Failed to parse Paynow response: {}", e))
            .with_response(response.clone())
    })
}
