//! Paynow V3 vocabularies.
//!
//! Every value is an opaque string owned by the gateway. The wire string is
//! the variant's name; nothing here invents new values, and unknown strings
//! fail to parse instead of being coerced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Declares a closed gateway vocabulary: enum, wire names, `ALL`, `Display`
/// and `FromStr`.
macro_rules! gateway_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in gateway documentation order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ValidationError::invalid_format(
                        stringify!($name),
                        format!("unknown value '{}'", other),
                    )),
                }
            }
        }
    };
}

gateway_vocabulary! {
    /// Currencies accepted by Paynow.
    Currency {
        Pln => "PLN",
        Eur => "EUR",
        Usd => "USD",
        Gbp => "GBP",
    }
}

gateway_vocabulary! {
    /// Payment statuses reported by the Paynow API and notifications.
    PaymentStatus {
        New => "NEW",
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        Rejected => "REJECTED",
        Error => "ERROR",
        Expired => "EXPIRED",
        Abandoned => "ABANDONED",
    }
}

gateway_vocabulary! {
    /// Refund statuses reported by the Paynow API.
    RefundStatus {
        New => "NEW",
        Pending => "PENDING",
        Successful => "SUCCESSFUL",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

gateway_vocabulary! {
    /// Reason codes accepted when requesting a refund.
    RefundReason {
        Rma => "RMA",
        RefundBefore14 => "REFUND_BEFORE_14",
        RefundAfter14 => "REFUND_AFTER_14",
        Other => "OTHER",
    }
}

gateway_vocabulary! {
    /// Payment method groups listed by the paywall.
    PaymentMethodType {
        ApplePay => "APPLE_PAY",
        Blik => "BLIK",
        Card => "CARD",
        Ecommerce => "ECOMMERCE",
        GooglePay => "GOOGLE_PAY",
        Paypo => "PAYPO",
        Pbl => "PBL",
    }
}

gateway_vocabulary! {
    /// Availability of a single payment method.
    PaymentMethodStatus {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
    }
}

gateway_vocabulary! {
    /// How the buyer authorizes a payment method.
    AuthorizationType {
        Redirect => "REDIRECT",
        Code => "CODE",
    }
}

gateway_vocabulary! {
    /// Error types carried in Paynow error responses.
    ErrorType {
        Conflict => "CONFLICT",
        Forbidden => "FORBIDDEN",
        NotFound => "NOT_FOUND",
        RateLimitReached => "RATE_LIMIT_REACHED",
        SystemTemporarilyUnavailable => "SYSTEM_TEMPORARILY_UNAVAILABLE",
        Unauthorized => "UNAUTHORIZED",
        ValidationError => "VALIDATION_ERROR",
        VerificationFailed => "VERIFICATION_FAILED",
        PaymentMethodNotAvailable => "PAYMENT_METHOD_NOT_AVAILABLE",
        PaymentAmountTooSmall => "PAYMENT_AMOUNT_TOO_SMALL",
        PaymentAmountTooLarge => "PAYMENT_AMOUNT_TOO_LARGE",
        IdempotencyKeyMissing => "IDEMPOTENCY_KEY_MISSING",
        SignatureMissing => "SIGNATURE_MISSING",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_has_seven_values_named_after_themselves() {
        let names: Vec<&str> = PaymentStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec!["NEW", "PENDING", "CONFIRMED", "REJECTED", "ERROR", "EXPIRED", "ABANDONED"]
        );
    }

    #[test]
    fn refund_status_has_five_values() {
        assert_eq!(RefundStatus::ALL.len(), 5);
        assert_eq!(RefundStatus::Cancelled.as_str(), "CANCELLED");
    }

    #[test]
    fn currencies_cover_paynow_offering() {
        let codes: Vec<String> = Currency::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(codes, vec!["PLN", "EUR", "USD", "GBP"]);
    }

    #[test]
    fn wire_string_parses_back_to_variant() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(*status));
        }
        assert_eq!(
            "REFUND_BEFORE_14".parse::<RefundReason>(),
            Ok(RefundReason::RefundBefore14)
        );
    }

    #[test]
    fn unknown_status_is_rejected_not_invented() {
        let err = "SETTLED".parse::<PaymentStatus>().unwrap_err();
        assert!(err.to_string().contains("SETTLED"));
        assert!("pln".parse::<Currency>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethodType::GooglePay).unwrap(),
            "\"GOOGLE_PAY\""
        );
        let parsed: ErrorType = serde_json::from_str("\"SYSTEM_TEMPORARILY_UNAVAILABLE\"").unwrap();
        assert_eq!(parsed, ErrorType::SystemTemporarilyUnavailable);
    }

    #[test]
    fn error_type_vocabulary_is_complete() {
        assert_eq!(ErrorType::ALL.len(), 13);
        assert_eq!(AuthorizationType::ALL.len(), 2);
        assert_eq!(PaymentMethodStatus::ALL.len(), 2);
    }
}
