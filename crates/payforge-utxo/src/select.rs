//! UTXO selection for funding a payment.
//!
//! Selection is deterministic: no randomness, ties broken by input
//! order. In spend mode an ideal single input is preferred (one whose
//! value lands close enough to the target that no change output would
//! be needed), falling back to smallest-first accumulation.

use crate::fee::{estimate_fee_base, FeeRate};
use crate::params::ChainParams;
use crate::utxo::{total_value, Utxo};
use crate::UtxoError;

/// Outcome of a selection attempt.
///
/// A selection may not cover the target; the builder decides whether an
/// undershoot is the exact-balance fee-sharing case or insufficient
/// funds.
#[derive(Debug, Clone)]
pub struct Selection {
    /// The chosen UTXOs, in spend order.
    pub selected: Vec<Utxo>,
    /// Sum of the chosen values in base units.
    pub selected_total_base: u64,
    /// Estimated fee for spending `selected` into the output count the
    /// selection was asked about.
    pub fee_base: u64,
}

impl Selection {
    /// True when the selected total covers the outputs plus the fee.
    pub fn covers(&self, output_total_base: u64) -> bool {
        match output_total_base.checked_add(self.fee_base) {
            Some(needed) => self.selected_total_base >= needed,
            None => false,
        }
    }
}

/// Choose which UTXOs fund a payment.
///
/// In sweep mode every available UTXO is selected. In spend mode the
/// ideal single-input search runs first: the first UTXO in input order
/// whose value lies in `[target + feeFor1, target + feeFor1 + dust]` is
/// returned alone. Otherwise UTXOs are accumulated smallest-first, the
/// fee recomputed after each addition, until the running total covers
/// the target plus fee. Exhausting `available` returns the full
/// accumulated state for the caller to report.
///
/// # Arguments
/// * `available` - Candidate UTXOs, already filtered for spendability.
/// * `output_total_base` - Sum of the requested outputs in base units.
/// * `output_count` - Output count to size fees against, including
///   reserved room for change.
/// * `fee_rate` - The rate in force for this build.
/// * `use_all_utxos` - Sweep mode; select everything.
/// * `params` - Chain policy constants.
pub fn select(
    available: &[Utxo],
    output_total_base: u64,
    output_count: usize,
    fee_rate: &FeeRate,
    use_all_utxos: bool,
    params: &ChainParams,
) -> Result<Selection, UtxoError> {
    if use_all_utxos {
        let fee_base = estimate_fee_base(available.len(), output_count, fee_rate, params)?;
        log::debug!(
            "sweep selection: {} inputs totalling {} base units, fee {}",
            available.len(),
            total_value(available),
            fee_base
        );
        return Ok(Selection {
            selected: available.to_vec(),
            selected_total_base: total_value(available),
            fee_base,
        });
    }

    let fee_for_one = estimate_fee_base(1, output_count, fee_rate, params)?;
    let window_low = output_total_base.saturating_add(fee_for_one);
    let window_high = window_low.saturating_add(params.dust_threshold_base);

    if let Some(ideal) = available
        .iter()
        .find(|u| u.value_base >= window_low && u.value_base <= window_high)
    {
        log::debug!(
            "ideal single-input match {} for target {}",
            ideal.outpoint(),
            output_total_base
        );
        return Ok(Selection {
            selected: vec![ideal.clone()],
            selected_total_base: ideal.value_base,
            fee_base: fee_for_one,
        });
    }

    let mut ordered: Vec<Utxo> = available.to_vec();
    // Stable sort keeps equal-value entries in input order.
    ordered.sort_by(|a, b| a.value_base.cmp(&b.value_base));

    let mut selected: Vec<Utxo> = Vec::new();
    let mut selected_total: u64 = 0;
    let mut fee_base = fee_for_one;
    for utxo in ordered {
        selected_total = selected_total.saturating_add(utxo.value_base);
        selected.push(utxo);
        fee_base = estimate_fee_base(selected.len(), output_count, fee_rate, params)?;
        if selected_total >= output_total_base.saturating_add(fee_base) {
            break;
        }
    }

    log::debug!(
        "accumulated {} of {} inputs totalling {} base units, fee {}",
        selected.len(),
        available.len(),
        selected_total,
        fee_base
    );
    Ok(Selection {
        selected,
        selected_total_base: selected_total,
        fee_base,
    })
}
