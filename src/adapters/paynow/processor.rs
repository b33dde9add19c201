//! Paynow implementation of the `PaymentProcessor` port.
//!
//! Paynow is notification driven: create the payment, redirect the buyer,
//! then apply the status Paynow pushes back. Polling is available for
//! reconciliation. There is no pre-authorization flow, so `charge` and
//! `release_lock` are unsupported.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method};
use rust_decimal::Decimal;
use secrecy::SecretString;

use crate::domain::payment::Transition;
use crate::domain::paynow::{
    pull_transition, push_action, Currency, NotificationPayload, PushAction, SignatureError,
};
use crate::ports::{
    ChargeResponse, Payment, PaymentError, PaymentProcessor, PaymentStatusUpdate,
    SettingsProvider, TransactionResult, TransitionOutcome, TransportConnector,
};

use super::client::{Credentials, NewPayment, PaynowClient};

pub const SLUG: &str = "paynow";
pub const DISPLAY_NAME: &str = "Paynow";
pub const SANDBOX_URL: &str = "https://api.sandbox.paynow.pl";
pub const PRODUCTION_URL: &str = "https://api.paynow.pl";

/// Setting keys read by [`PaynowProcessor::from_settings`].
pub mod setting_keys {
    pub const API_KEY: &str = "api_key";
    pub const SIGNATURE_KEY: &str = "signature_key";
    pub const CONTINUE_URL: &str = "continue_url";
    pub const SANDBOX: &str = "sandbox";
}

const SIGNATURE_HEADER: &str = "Signature";
const PAYMENT_ID_PLACEHOLDER: &str = "{payment_id}";

/// Paynow V3 payment processor.
#[derive(Debug)]
pub struct PaynowProcessor {
    client: PaynowClient,
    continue_url: Option<String>,
}

impl PaynowProcessor {
    pub fn new(client: PaynowClient) -> Self {
        Self {
            client,
            continue_url: None,
        }
    }

    /// Buyer return URL; `{payment_id}` is replaced with the payment's id.
    pub fn with_continue_url(mut self, template: impl Into<String>) -> Self {
        self.continue_url = Some(template.into());
        self
    }

    /// Builds a processor from settings.
    ///
    /// Reads `api_key` and `signature_key` (required), `continue_url`
    /// (optional) and `sandbox` (defaults to `true`).
    pub fn from_settings(
        settings: &dyn SettingsProvider,
        connector: Arc<dyn TransportConnector>,
    ) -> Result<Self, PaymentError> {
        let api_key = required_setting(settings, setting_keys::API_KEY)?;
        let signature_key = required_setting(settings, setting_keys::SIGNATURE_KEY)?;
        let sandbox = parse_flag(
            setting_keys::SANDBOX,
            &settings.setting_or(setting_keys::SANDBOX, "true"),
        )?;

        let api_url = if sandbox { SANDBOX_URL } else { PRODUCTION_URL };
        let credentials =
            Credentials::new(SecretString::new(api_key), SecretString::new(signature_key));
        let client = PaynowClient::new(credentials, api_url, connector);

        Ok(Self {
            client,
            continue_url: settings
                .get_setting(setting_keys::CONTINUE_URL)
                .filter(|url| !url.trim().is_empty()),
        })
    }

    pub fn client(&self) -> &PaynowClient {
        &self.client
    }

    /// Mutable access, for opening and closing a transport session.
    pub fn client_mut(&mut self) -> &mut PaynowClient {
        &mut self.client
    }

    fn new_payment(&self, payment: &dyn Payment) -> Result<NewPayment, PaymentError> {
        let currency: Currency = payment.currency().parse().map_err(|_| {
            PaymentError::invalid_request(format!(
                "Currency '{}' is not supported by Paynow",
                payment.currency()
            ))
        })?;

        let buyer = payment.buyer();
        let mut request = NewPayment::new(
            payment.amount_required(),
            currency,
            payment.id(),
            payment.description(),
            buyer.email,
        )
        .with_buyer_name(non_empty(buyer.first_name), non_empty(buyer.last_name));

        if let Some(template) = &self.continue_url {
            request =
                request.with_continue_url(template.replace(PAYMENT_ID_PLACEHOLDER, payment.id()));
        }

        Ok(request)
    }

    /// Fires `transition`; an illegal move is logged and ignored.
    fn apply(payment: &mut dyn Payment, transition: Transition) -> Result<(), PaymentError> {
        match payment.transition(transition)? {
            TransitionOutcome::Applied => {
                tracing::info!(
                    payment_id = %payment.id(),
                    transition = %transition,
                    state = %payment.current_state(),
                    "Payment transition applied"
                );
            }
            TransitionOutcome::Illegal => {
                tracing::debug!(
                    payment_id = %payment.id(),
                    transition = %transition,
                    state = %payment.current_state(),
                    "Transition not allowed from current state, ignoring"
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for PaynowProcessor {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn display_name(&self) -> &'static str {
        DISPLAY_NAME
    }

    fn accepted_currencies(&self) -> &'static [Currency] {
        Currency::ALL
    }

    async fn prepare_transaction(
        &self,
        payment: &mut dyn Payment,
    ) -> Result<TransactionResult, PaymentError> {
        let request = self.new_payment(&*payment)?;
        let response = self.client.create_payment(&request).await?;

        if !response.payment_id.is_empty() {
            payment.set_external_id(response.payment_id.clone());
        }

        tracing::info!(
            payment_id = %payment.id(),
            paynow_payment_id = %response.payment_id,
            status = %response.status,
            "Paynow payment created"
        );

        Ok(TransactionResult {
            redirect_url: response.redirect_url,
            method: Method::GET,
            form_data: None,
            headers: BTreeMap::new(),
        })
    }

    async fn verify_callback(
        &self,
        payment: &dyn Payment,
        headers: &HeaderMap,
        raw_body: Option<&[u8]>,
    ) -> Result<(), PaymentError> {
        // Non-ASCII header bytes still count as a received signature.
        let received = headers
            .get(SIGNATURE_HEADER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        self.client
            .signer()
            .verify_notification(raw_body, received.as_deref())
            .map_err(|err| {
                if let SignatureError::Mismatch { received, expected } = &err {
                    tracing::warn!(
                        payment_id = %payment.id(),
                        received = %received,
                        expected = %expected,
                        "Paynow notification bad signature"
                    );
                }
                PaymentError::from(err)
            })
    }

    async fn handle_callback(
        &self,
        payment: &mut dyn Payment,
        raw_body: &[u8],
    ) -> Result<(), PaymentError> {
        let notification = NotificationPayload::from_slice(raw_body).map_err(|e| {
            PaymentError::invalid_callback(format!("Malformed Paynow notification: {}", e))
        })?;

        if let Some(paynow_id) = notification.payment_id.as_deref().filter(|id| !id.is_empty()) {
            if payment.external_id() != Some(paynow_id) {
                payment.set_external_id(paynow_id.to_string());
            }
        }

        match push_action(notification.payment_status()) {
            PushAction::ConfirmAndMarkPaid => {
                if payment.can_transition(Transition::ConfirmPayment) {
                    Self::apply(payment, Transition::ConfirmPayment)?;
                    Self::apply(payment, Transition::MarkAsPaid)?;
                } else {
                    tracing::debug!(
                        payment_id = %payment.id(),
                        state = %payment.current_state(),
                        "Cannot confirm payment from current state"
                    );
                }
            }
            PushAction::Fail => {
                if payment.supports(Transition::Fail) {
                    Self::apply(payment, Transition::Fail)?;
                }
            }
            PushAction::None => {
                tracing::debug!(
                    payment_id = %payment.id(),
                    status = ?notification.status,
                    "Paynow status requires no transition"
                );
            }
        }

        Ok(())
    }

    async fn fetch_payment_status(
        &self,
        payment: &dyn Payment,
    ) -> Result<PaymentStatusUpdate, PaymentError> {
        let paynow_id = payment.external_id().ok_or_else(|| {
            PaymentError::invalid_request("Payment has no Paynow payment id to poll")
        })?;

        let response = self.client.get_payment_status(paynow_id).await?;
        let remote_status = response.status.parse().ok();

        Ok(PaymentStatusUpdate {
            transition: remote_status.and_then(pull_transition),
            remote_status,
        })
    }

    async fn charge(
        &self,
        _payment: &mut dyn Payment,
        _amount: Option<Decimal>,
    ) -> Result<ChargeResponse, PaymentError> {
        Err(PaymentError::unsupported(
            "Paynow does not support pre-authorization/charge flow",
        ))
    }

    async fn release_lock(&self, _payment: &mut dyn Payment) -> Result<Decimal, PaymentError> {
        Err(PaymentError::unsupported(
            "Paynow does not support pre-authorization/release flow",
        ))
    }

    async fn start_refund(
        &self,
        payment: &mut dyn Payment,
        amount: Option<Decimal>,
    ) -> Result<Decimal, PaymentError> {
        let paynow_id = payment
            .external_id()
            .ok_or_else(|| {
                PaymentError::invalid_request("Payment has no Paynow payment id to refund")
            })?
            .to_string();
        let amount = amount
            .filter(|a| !a.is_zero())
            .unwrap_or_else(|| payment.amount_paid());

        let response = self.client.create_refund(&paynow_id, amount, None).await?;
        if !response.refund_id.is_empty() {
            payment.set_external_refund_id(response.refund_id.clone());
        }

        tracing::info!(
            payment_id = %payment.id(),
            refund_id = %response.refund_id,
            amount = %amount,
            "Paynow refund started"
        );

        Ok(amount)
    }

    async fn cancel_refund(&self, payment: &mut dyn Payment) -> Result<bool, PaymentError> {
        let refund_id = payment
            .external_refund_id()
            .ok_or_else(|| {
                PaymentError::invalid_request("Payment has no Paynow refund to cancel")
            })?;

        self.client.cancel_refund(refund_id).await?;

        tracing::info!(
            payment_id = %payment.id(),
            refund_id = %refund_id,
            "Paynow refund cancelled"
        );
        Ok(true)
    }
}

fn required_setting(settings: &dyn SettingsProvider, key: &str) -> Result<String, PaymentError> {
    settings
        .get_setting(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            PaymentError::invalid_configuration(format!("Missing Paynow setting '{}'", key))
        })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, PaymentError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(PaymentError::invalid_configuration(format!(
            "Setting '{}' must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
