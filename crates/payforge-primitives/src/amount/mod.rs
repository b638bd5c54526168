//! Exact conversion between main and base denominations.
//!
//! Every chain expresses user-facing amounts in a main denomination
//! (coins) and network amounts in an integer base denomination
//! (satoshi-equivalent). All conversions go through `rust_decimal` so
//! no floating point ever touches a monetary value.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::PrimitivesError;

/// Parse a main-denomination decimal string into base units.
///
/// The amount must be strictly positive and representable exactly at the
/// chain's scale; anything with more precision than `decimals` places is
/// rejected rather than rounded.
///
/// # Arguments
/// * `value` - Decimal string in the main denomination, e.g. `"1.5"`.
/// * `decimals` - Number of decimal places between denominations.
///
/// # Returns
/// The amount in base units, or an `InvalidAmount` error.
pub fn parse_main_amount(value: &str, decimals: u32) -> Result<u64, PrimitivesError> {
    let parsed = Decimal::from_str(value.trim()).map_err(|e| PrimitivesError::InvalidAmount {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.is_sign_negative() || parsed.is_zero() {
        return Err(PrimitivesError::InvalidAmount {
            value: value.to_string(),
            reason: "amount must be positive".to_string(),
        });
    }

    let scale = Decimal::from(10u64.saturating_pow(decimals));
    let base = parsed
        .checked_mul(scale)
        .ok_or_else(|| PrimitivesError::InvalidAmount {
            value: value.to_string(),
            reason: "amount out of range".to_string(),
        })?;

    if !base.fract().is_zero() {
        return Err(PrimitivesError::InvalidAmount {
            value: value.to_string(),
            reason: format!("more than {decimals} decimal places"),
        });
    }

    base.to_u64().ok_or_else(|| PrimitivesError::InvalidAmount {
        value: value.to_string(),
        reason: "amount out of range".to_string(),
    })
}

/// Format a base-unit amount as a main-denomination decimal string.
///
/// Trailing zeros are trimmed. Scales above 28 (the `Decimal` maximum)
/// are clamped; no real chain comes close.
///
/// # Arguments
/// * `value` - Amount in base units.
/// * `decimals` - Number of decimal places between denominations.
///
/// # Returns
/// The amount as a decimal string in the main denomination.
pub fn format_base_amount(value: u64, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    Decimal::from_i128_with_scale(value as i128, decimals.min(28))
        .normalize()
        .to_string()
}
