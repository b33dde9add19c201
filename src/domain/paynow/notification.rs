//! Payment status notifications pushed by Paynow.

use serde::{Deserialize, Serialize};

use super::types::PaymentStatus;

/// Parsed notification body.
///
/// Every field is optional on the wire; missing fields deserialize to `None`
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl NotificationPayload {
    /// Parses a raw notification body.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Status as a known gateway value, `None` when absent or unrecognised.
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_notification() {
        let raw = br#"{
            "paymentId": "NOLV-8F9-08K-WGD",
            "externalId": "9fea23c7-cd5c-4884-9842-6f8592be65df",
            "status": "CONFIRMED",
            "modifiedAt": "2018-12-12T13:24:52"
        }"#;

        let payload = NotificationPayload::from_slice(raw).unwrap();

        assert_eq!(payload.payment_id.as_deref(), Some("NOLV-8F9-08K-WGD"));
        assert_eq!(
            payload.external_id.as_deref(),
            Some("9fea23c7-cd5c-4884-9842-6f8592be65df")
        );
        assert_eq!(payload.payment_status(), Some(PaymentStatus::Confirmed));
        assert_eq!(payload.modified_at.as_deref(), Some("2018-12-12T13:24:52"));
    }

    #[test]
    fn missing_fields_are_none() {
        let payload = NotificationPayload::from_slice(b"{}").unwrap();
        assert_eq!(payload, NotificationPayload::default());
        assert_eq!(payload.payment_status(), None);
    }

    #[test]
    fn unknown_status_is_kept_raw_but_not_recognised() {
        let payload = NotificationPayload::from_slice(br#"{"status":"SETTLED"}"#).unwrap();
        assert_eq!(payload.status.as_deref(), Some("SETTLED"));
        assert_eq!(payload.payment_status(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(NotificationPayload::from_slice(b"not json").is_err());
    }
}
