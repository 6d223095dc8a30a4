//! Decimal amount to base-unit conversion.
//!
//! The configured price is a human-readable decimal string ("12.00"); the
//! chain reports transfer values as integers in the asset's smallest unit.
//! The asset's decimal exponent is applied here, exactly once, at
//! configuration load; every runtime comparison is then a plain integer
//! comparison in base units.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::ConfigurationError;

/// Largest supported decimal exponent (covers 18-decimal ERC-20 tokens).
pub const MAX_DECIMALS: u32 = 18;

/// Converts a decimal amount string into the asset's base units.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidAmount`] when the string does not
/// parse, is negative, carries more fractional digits than the asset
/// supports, or overflows the supported range.
pub fn to_base_units(amount: &str, decimals: u32) -> Result<U256, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidAmount {
        amount: amount.to_owned(),
        reason: reason.to_owned(),
    };

    if decimals > MAX_DECIMALS {
        return Err(invalid("unsupported asset decimal exponent"));
    }

    let parsed = Decimal::from_str_exact(amount.trim())
        .map_err(|_| invalid("not a decimal number"))?;
    if parsed.is_sign_negative() {
        return Err(invalid("amount must not be negative"));
    }

    let scale = Decimal::from(10u64.pow(decimals));
    let scaled = parsed
        .checked_mul(scale)
        .ok_or_else(|| invalid("amount out of range"))?;
    if !scaled.fract().is_zero() {
        return Err(invalid("more fractional digits than the asset supports"));
    }

    let units = scaled
        .trunc()
        .to_u128()
        .ok_or_else(|| invalid("amount out of range"))?;
    Ok(U256::from(units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdc_price_converts_once() {
        assert_eq!(
            to_base_units("12.00", 6).unwrap(),
            U256::from(12_000_000u64)
        );
    }

    #[test]
    fn smallest_unit_is_representable() {
        assert_eq!(to_base_units("0.000001", 6).unwrap(), U256::from(1u64));
    }

    #[test]
    fn integer_amount_without_fraction() {
        assert_eq!(to_base_units("5", 6).unwrap(), U256::from(5_000_000u64));
    }

    #[test]
    fn zero_decimals_asset() {
        assert_eq!(to_base_units("42", 0).unwrap(), U256::from(42u64));
    }

    #[test]
    fn excess_precision_is_rejected() {
        assert!(to_base_units("0.0000001", 6).is_err());
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(to_base_units("-12.00", 6).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(to_base_units("twelve", 6).is_err());
        assert!(to_base_units("", 6).is_err());
    }

    #[test]
    fn oversized_exponent_is_rejected() {
        assert!(to_base_units("1", 19).is_err());
    }
}
