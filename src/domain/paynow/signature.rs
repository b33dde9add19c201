//! Paynow HMAC-SHA256 signatures.
//!
//! Two schemes share one key:
//!
//! - **Requests**: HMAC over a canonical JSON document
//!   `{"headers":{..},"parameters":{..},"body":".."}` with the top-level keys
//!   in that fixed order, both maps sorted by key, no whitespace, and every
//!   character outside printable ASCII written as a `\uXXXX` escape.
//! - **Notifications**: HMAC over the raw webhook body exactly as received.
//!
//! Both digests are base64 encoded (standard alphabet, padded).
//!
//! # Security
//!
//! - The signature key is held as a `SecretString` and never appears in
//!   errors or logs
//! - Notification signatures are compared in constant time

use std::collections::BTreeMap;
use std::io::{self, Write};

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const API_KEY_HEADER: &str = "Api-Key";
const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Errors produced while signing or verifying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The sender did not supply a `Signature` header, or it was empty.
    #[error("Missing Signature header in notification")]
    MissingSignature,

    /// The caller did not hand over the raw notification body.
    #[error("Missing raw body for signature verification")]
    MissingRawBody,

    /// Computed and received signatures differ.
    #[error("BAD SIGNATURE: got '{received}', expected '{expected}'")]
    Mismatch { received: String, expected: String },

    /// The canonical request document could not be encoded.
    #[error("Failed to encode signing payload: {0}")]
    Encoding(String),
}

/// Canonical request document. Field order is part of the protocol.
#[derive(Serialize)]
struct SigningPayload<'a> {
    headers: BTreeMap<&'static str, &'a str>,
    parameters: &'a BTreeMap<String, String>,
    body: &'a str,
}

/// Compact JSON formatter that escapes everything outside printable ASCII.
struct AsciiEscapingFormatter;

impl serde_json::ser::Formatter for AsciiEscapingFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units).iter() {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Builds the exact byte sequence that request signatures are computed over.
pub fn canonical_request_payload(
    api_key: &str,
    idempotency_key: &str,
    body: &str,
    parameters: &BTreeMap<String, String>,
) -> Result<String, SignatureError> {
    let headers = BTreeMap::from([
        (API_KEY_HEADER, api_key),
        (IDEMPOTENCY_KEY_HEADER, idempotency_key),
    ]);
    let payload = SigningPayload {
        headers,
        parameters,
        body,
    };

    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, AsciiEscapingFormatter);
    payload
        .serialize(&mut serializer)
        .map_err(|e| SignatureError::Encoding(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| SignatureError::Encoding(e.to_string()))
}

/// Computes and checks Paynow signatures with the merchant's signature key.
#[derive(Clone)]
pub struct PaynowSigner {
    signature_key: SecretString,
}

impl PaynowSigner {
    /// Create a signer for the given signature key.
    pub fn new(signature_key: SecretString) -> Self {
        Self { signature_key }
    }

    /// Value of the `Signature` header for an outbound API request.
    ///
    /// `body` is the exact request body, or `""` when the request has none.
    pub fn request_signature(
        &self,
        api_key: &str,
        idempotency_key: &str,
        body: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<String, SignatureError> {
        let payload = canonical_request_payload(api_key, idempotency_key, body, parameters)?;
        Ok(self.sign(payload.as_bytes()))
    }

    /// Signature Paynow is expected to send for a notification body.
    pub fn notification_signature(&self, raw_body: &[u8]) -> String {
        self.sign(raw_body)
    }

    /// Verifies a notification against the `Signature` header value.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header absent or empty
    /// - `MissingRawBody` - raw body not supplied
    /// - `Mismatch` - body altered or signed with another key
    pub fn verify_notification(
        &self,
        raw_body: Option<&[u8]>,
        received: Option<&str>,
    ) -> Result<(), SignatureError> {
        let received = match received {
            Some(value) if !value.is_empty() => value,
            _ => return Err(SignatureError::MissingSignature),
        };
        let raw_body = raw_body.ok_or(SignatureError::MissingRawBody)?;

        let expected = self.notification_signature(raw_body);
        if !constant_time_compare(expected.as_bytes(), received.as_bytes()) {
            return Err(SignatureError::Mismatch {
                received: received.to_string(),
                expected,
            });
        }

        Ok(())
    }

    fn sign(&self, message: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signature_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message);
        general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for PaynowSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaynowSigner")
            .field("signature_key", &"[REDACTED]")
            .finish()
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_API_KEY: &str = "97a55694-5478-43b5-b406-fb49ebfdd2b5";
    const TEST_SIGNATURE_KEY: &str = "b305b996-bca5-4404-a0b7-2ccea3d2b64b";

    const DOCS_NOTIFICATION_BODY: &str = "{\n    \"paymentId\": \"NOLV-8F9-08K-WGD\",\n    \"externalId\": \"9fea23c7-cd5c-4884-9842-6f8592be65df\",\n    \"status\": \"CONFIRMED\",\n    \"modifiedAt\": \"2018-12-12T13:24:52\"\n}";

    fn signer() -> PaynowSigner {
        PaynowSigner::new(SecretString::new(TEST_SIGNATURE_KEY.to_string()))
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ══════════════════════════════════════════════════════════════
    // Canonical Payload
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn canonical_payload_has_fixed_key_order_and_no_whitespace() {
        let payload =
            canonical_request_payload("key", "idem", "", &BTreeMap::new()).unwrap();
        assert_eq!(
            payload,
            r#"{"headers":{"Api-Key":"key","Idempotency-Key":"idem"},"parameters":{},"body":""}"#
        );
    }

    #[test]
    fn canonical_payload_sorts_parameters() {
        let payload = canonical_request_payload(
            "key",
            "idem",
            "",
            &params(&[("currency", "PLN"), ("amount", "10000")]),
        )
        .unwrap();
        assert!(payload.contains(r#""parameters":{"amount":"10000","currency":"PLN"}"#));
    }

    #[test]
    fn canonical_payload_embeds_body_as_escaped_string() {
        let payload =
            canonical_request_payload("key", "idem", r#"{"amount":4999}"#, &BTreeMap::new())
                .unwrap();
        assert!(payload.ends_with(r#""body":"{\"amount\":4999}"}"#));
    }

    #[test]
    fn canonical_payload_escapes_non_ascii() {
        let payload =
            canonical_request_payload("key", "idem", "Zamówienie 😀\u{7f}", &BTreeMap::new())
                .unwrap();
        assert!(payload.contains(r#""body":"Zam\u00f3wienie \ud83d\ude00\u007f""#));
        assert!(payload.is_ascii());
    }

    #[test]
    fn canonical_payload_uses_short_escapes_for_control_characters() {
        let payload =
            canonical_request_payload("key", "idem", "a\nb\tc", &BTreeMap::new()).unwrap();
        assert!(payload.contains(r#""body":"a\nb\tc""#));
    }

    // ══════════════════════════════════════════════════════════════
    // Request Signatures
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn request_signature_matches_documented_vector() {
        let signature = signer()
            .request_signature(
                TEST_API_KEY,
                "d243fdb3-c287-484a-bb9c-58536f2794c1",
                "",
                &BTreeMap::new(),
            )
            .unwrap();
        assert_eq!(signature, "fXwLZRwo0WiGll90PPl5oULX9VKA0gpFA/3+E+NRp5E=");
    }

    #[test]
    fn request_signature_changes_with_body() {
        let empty = signer()
            .request_signature(TEST_API_KEY, "test-key", "", &BTreeMap::new())
            .unwrap();
        let with_body = signer()
            .request_signature(TEST_API_KEY, "test-key", r#"{"amount":10000}"#, &BTreeMap::new())
            .unwrap();
        assert_ne!(empty, with_body);
    }

    #[test]
    fn request_signature_covers_parameters() {
        let without = signer()
            .request_signature(TEST_API_KEY, "test-key", "", &BTreeMap::new())
            .unwrap();
        let with = signer()
            .request_signature(
                TEST_API_KEY,
                "test-key",
                "",
                &params(&[("amount", "10000"), ("currency", "PLN")]),
            )
            .unwrap();
        assert_ne!(without, with);
    }

    #[test]
    fn request_signature_ignores_parameter_insertion_order() {
        let forward = params(&[("a", "1"), ("b", "2")]);
        let mut reversed = BTreeMap::new();
        reversed.insert("b".to_string(), "2".to_string());
        reversed.insert("a".to_string(), "1".to_string());

        let s1 = signer().request_signature(TEST_API_KEY, "k", "", &forward).unwrap();
        let s2 = signer().request_signature(TEST_API_KEY, "k", "", &reversed).unwrap();
        assert_eq!(s1, s2);
    }

    // ══════════════════════════════════════════════════════════════
    // Notification Signatures
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn notification_signature_matches_documented_vector() {
        assert_eq!(
            signer().notification_signature(DOCS_NOTIFICATION_BODY.as_bytes()),
            "F69sbjUxBX4eFjfUal/Y9XGREbfaRjh/zdq9j4MWeHM="
        );
    }

    #[test]
    fn verify_accepts_documented_vector() {
        let result = signer().verify_notification(
            Some(DOCS_NOTIFICATION_BODY.as_bytes()),
            Some("F69sbjUxBX4eFjfUal/Y9XGREbfaRjh/zdq9j4MWeHM="),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn verify_rejects_missing_signature() {
        let result = signer().verify_notification(Some(b"{}"), None);
        let err = result.unwrap_err();
        assert_eq!(err, SignatureError::MissingSignature);
        assert!(err.to_string().to_lowercase().contains("missing signature"));
    }

    #[test]
    fn verify_rejects_empty_signature() {
        let result = signer().verify_notification(Some(b"{}"), Some(""));
        assert_eq!(result, Err(SignatureError::MissingSignature));
    }

    #[test]
    fn verify_rejects_missing_raw_body() {
        let signature = signer().notification_signature(b"{}");
        let result = signer().verify_notification(None, Some(&signature));
        assert_eq!(result, Err(SignatureError::MissingRawBody));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let other = PaynowSigner::new(SecretString::new("wrong-key".to_string()));
        let signature = other.notification_signature(DOCS_NOTIFICATION_BODY.as_bytes());

        let err = signer()
            .verify_notification(Some(DOCS_NOTIFICATION_BODY.as_bytes()), Some(&signature))
            .unwrap_err();

        assert!(matches!(err, SignatureError::Mismatch { .. }));
        assert!(!err.to_string().contains(TEST_SIGNATURE_KEY));
    }

    #[test]
    fn mismatch_message_names_both_signatures() {
        let err = signer()
            .verify_notification(Some(b"{}"), Some("bad_signature"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("BAD SIGNATURE"));
        assert!(message.contains("bad_signature"));
        assert!(message.contains(&signer().notification_signature(b"{}")));
    }

    #[test]
    fn debug_output_redacts_key() {
        let debug = format!("{:?}", signer());
        assert!(!debug.contains(TEST_SIGNATURE_KEY));
    }

    #[test]
    fn constant_time_compare_handles_lengths() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
        assert!(constant_time_compare(b"", b""));
    }

    proptest! {
        #[test]
        fn flipping_any_body_byte_breaks_verification(index in 0usize..DOCS_NOTIFICATION_BODY.len()) {
            let signature = signer().notification_signature(DOCS_NOTIFICATION_BODY.as_bytes());
            let mut tampered = DOCS_NOTIFICATION_BODY.as_bytes().to_vec();
            tampered[index] ^= 0x01;

            let result = signer().verify_notification(Some(&tampered), Some(&signature));
            let is_mismatch = matches!(result, Err(SignatureError::Mismatch { .. }));
            prop_assert!(is_mismatch);
        }

        #[test]
        fn request_signature_is_deterministic(
            body in ".{0,64}",
            pairs in proptest::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9]{0,8}"), 0..6),
        ) {
            let forward: BTreeMap<String, String> = pairs.iter().cloned().collect();
            let backward: BTreeMap<String, String> = pairs.iter().rev().cloned().collect();
            // Duplicate keys resolve differently per direction; compare only when they agree.
            prop_assume!(forward == backward);

            let a = signer().request_signature(TEST_API_KEY, "idem", &body, &forward).unwrap();
            let b = signer().request_signature(TEST_API_KEY, "idem", &body, &backward).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
