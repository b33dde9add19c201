//! Conversion between decimal amounts and Paynow's integer minor units.
//!
//! Paynow transmits amounts as integers in the smallest currency unit
//! (grosz, cent, penny). All arithmetic stays in `Decimal`; no floats.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::foundation::ValidationError;

const MINOR_UNITS_PER_MAJOR: i64 = 100;
const MINOR_UNIT_SCALE: u32 = 2;

/// Converts an amount in the main currency unit to minor units.
///
/// Fractions below one minor unit are truncated toward zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ValidationError> {
    amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .map(|scaled| scaled.trunc())
        .and_then(|scaled| scaled.to_i64())
        .ok_or_else(|| {
            ValidationError::invalid_format("amount", format!("{} is out of range", amount))
        })
}

/// Converts minor units back to the main currency unit with two fraction digits.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn converts_two_fraction_digits() {
        assert_eq!(to_minor_units(dec("1.23")), Ok(123));
        assert_eq!(to_minor_units(dec("49.99")), Ok(4999));
    }

    #[test]
    fn converts_whole_amounts() {
        assert_eq!(to_minor_units(dec("100")), Ok(10_000));
    }

    #[test]
    fn converts_smallest_unit() {
        assert_eq!(to_minor_units(dec("0.01")), Ok(1));
    }

    #[test]
    fn truncates_sub_minor_fractions() {
        assert_eq!(to_minor_units(dec("10.999")), Ok(1099));
    }

    #[test]
    fn rejects_amounts_beyond_i64() {
        assert!(to_minor_units(Decimal::MAX).is_err());
    }

    #[test]
    fn from_minor_units_keeps_two_digits() {
        assert_eq!(from_minor_units(123), dec("1.23"));
        assert_eq!(from_minor_units(10_000).to_string(), "100.00");
    }

    proptest! {
        #[test]
        fn minor_units_round_trip(x in 0i64..) {
            prop_assert_eq!(to_minor_units(from_minor_units(x)), Ok(x));
        }
    }
}
