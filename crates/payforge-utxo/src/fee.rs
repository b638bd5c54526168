//! Transaction fee estimation.
//!
//! The size estimate is deliberately address-type-agnostic: at this
//! layer no input or output typing is available, so a conservative flat
//! weight per input and output is used, and the same formula is applied
//! during selection and in the final fee computation.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use payforge_primitives::amount::format_base_amount;

use crate::params::ChainParams;
use crate::UtxoError;

/// Fixed transaction overhead in virtual bytes (version, counts, locktime).
pub const TX_OVERHEAD_VSIZE: u64 = 10;
/// Conservative virtual size of one input (outpoint, script sig, sequence).
pub const INPUT_VSIZE: u64 = 148;
/// Conservative virtual size of one output (value, script pubkey).
pub const OUTPUT_VSIZE: u64 = 34;

/// How a fee rate string is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeRateKind {
    /// Base units per virtual byte; the total fee scales with size.
    BasePerWeightUnit,
    /// A flat fee expressed in the main denomination.
    MainDenomination,
    /// A flat fee expressed directly in base units.
    BaseDenomination,
}

/// A fee rate as supplied by a caller or a rate recommendation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    /// Decimal string; interpretation depends on `kind`.
    pub rate: String,
    /// How to interpret `rate`.
    pub kind: FeeRateKind,
}

impl FeeRate {
    /// Create a fee rate from a rate string and its kind.
    pub fn new(rate: impl Into<String>, kind: FeeRateKind) -> Self {
        FeeRate {
            rate: rate.into(),
            kind,
        }
    }
}

/// A fee rate decomposed into explicit totals for one transaction shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFeeOption {
    /// The rate the totals were computed from.
    pub fee_rate: FeeRate,
    /// Total fee in base units.
    pub base_units: u64,
    /// The same total as a main-denomination decimal string.
    pub main_units: String,
}

/// Virtual size estimate for a transaction shape.
pub fn estimate_vsize(input_count: usize, output_count: usize) -> u64 {
    TX_OVERHEAD_VSIZE + INPUT_VSIZE * input_count as u64 + OUTPUT_VSIZE * output_count as u64
}

/// Estimate the fee in base units for a transaction shape.
///
/// The computed fee is never allowed below two floors: the fee implied
/// by `ChainParams::min_fee_rate` for the same shape, and the absolute
/// `ChainParams::min_relay_fee_base`. Pure function of its arguments.
///
/// # Arguments
/// * `input_count` - Number of inputs the transaction will spend.
/// * `output_count` - Number of outputs it will create.
/// * `fee_rate` - The rate to apply.
/// * `params` - Chain policy supplying the floors and denomination scale.
pub fn estimate_fee_base(
    input_count: usize,
    output_count: usize,
    fee_rate: &FeeRate,
    params: &ChainParams,
) -> Result<u64, UtxoError> {
    let mut fee = rate_fee_base(input_count, output_count, fee_rate, params)?;

    if let Some(min_rate) = &params.min_fee_rate {
        let floor_rate = FeeRate::new(min_rate.clone(), FeeRateKind::BasePerWeightUnit);
        let floor = rate_fee_base(input_count, output_count, &floor_rate, params)?;
        fee = fee.max(floor);
    }

    Ok(fee.max(params.min_relay_fee_base))
}

/// Decompose a fee rate into explicit base- and main-unit totals for
/// the given transaction shape, floors applied.
pub fn resolve_fee_option(
    fee_rate: &FeeRate,
    input_count: usize,
    output_count: usize,
    params: &ChainParams,
) -> Result<ResolvedFeeOption, UtxoError> {
    let base_units = estimate_fee_base(input_count, output_count, fee_rate, params)?;
    Ok(ResolvedFeeOption {
        fee_rate: fee_rate.clone(),
        base_units,
        main_units: format_base_amount(base_units, params.decimals),
    })
}

/// The unfloored fee implied by one rate for one transaction shape.
fn rate_fee_base(
    input_count: usize,
    output_count: usize,
    fee_rate: &FeeRate,
    params: &ChainParams,
) -> Result<u64, UtxoError> {
    let rate = parse_rate(&fee_rate.rate)?;

    match fee_rate.kind {
        FeeRateKind::BasePerWeightUnit => {
            let vsize = Decimal::from(estimate_vsize(input_count, output_count));
            let total = vsize
                .checked_mul(rate)
                .ok_or_else(|| rate_error(&fee_rate.rate, "fee exceeds representable range"))?;
            ceil_to_base(total, &fee_rate.rate)
        }
        FeeRateKind::MainDenomination => {
            let scale = Decimal::from(10u64.saturating_pow(params.decimals));
            let total = rate
                .checked_mul(scale)
                .ok_or_else(|| rate_error(&fee_rate.rate, "fee exceeds representable range"))?;
            ceil_to_base(total, &fee_rate.rate)
        }
        FeeRateKind::BaseDenomination => {
            if !rate.fract().is_zero() {
                return Err(rate_error(&fee_rate.rate, "expected whole base units"));
            }
            rate.to_u64()
                .ok_or_else(|| rate_error(&fee_rate.rate, "fee exceeds representable range"))
        }
    }
}

fn parse_rate(rate: &str) -> Result<Decimal, UtxoError> {
    let parsed = Decimal::from_str(rate.trim()).map_err(|e| rate_error(rate, &e.to_string()))?;
    if parsed.is_sign_negative() {
        return Err(rate_error(rate, "rate must not be negative"));
    }
    Ok(parsed)
}

fn ceil_to_base(total: Decimal, rate: &str) -> Result<u64, UtxoError> {
    total
        .ceil()
        .to_u64()
        .ok_or_else(|| rate_error(rate, "fee exceeds representable range"))
}

fn rate_error(rate: &str, reason: &str) -> UtxoError {
    UtxoError::FeeRate {
        rate: rate.to_string(),
        reason: reason.to_string(),
    }
}
