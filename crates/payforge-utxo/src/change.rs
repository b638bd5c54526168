//! Change distribution across weighted outputs.
//!
//! Leftover value is spread over a variable number of slots whose
//! weights double per slot, skewing most of the change into the last
//! slot while creating several smaller outputs. This replenishes a pool
//! of spendable UTXOs of varied size instead of concentrating the whole
//! balance in one output.

use crate::params::ChainParams;
use crate::payment::PaymentOutput;
use crate::UtxoError;

/// Hard upper bound on change slots; weights are powers of two and must
/// stay inside u64 regardless of configured pool targets.
pub const MAX_CHANGE_SLOTS: usize = 32;

/// A change slot before allocation, weight attached. Ephemeral within
/// one distribution call.
#[derive(Debug, Clone)]
pub struct WeightedChangeOutput {
    /// Address the slot would pay to.
    pub address: String,
    /// Relative weight of the slot.
    pub weight: u64,
}

/// Result of distributing change.
#[derive(Debug, Clone)]
pub struct ChangeAllocation {
    /// Surviving change outputs, in slot order.
    pub outputs: Vec<PaymentOutput>,
    /// Value folded into the fee instead of being paid out as change.
    pub fee_adjustment_base: u64,
}

/// Distribute a change total across weighted outputs.
///
/// Slot `i` carries weight `2^i` and receives
/// `floor(total * weight / sumOfWeights)`. Slots whose share is at or
/// below the dust threshold, or below the configured minimum change,
/// are dropped. The remainder (rounding plus dropped shares) is spread
/// evenly back over the survivors when large enough, recovered into a
/// single output when everything was dropped but the remainder is still
/// above dust, and otherwise folded into the fee.
///
/// The returned `fee_adjustment_base` must be added to the transaction
/// fee by the caller; it is never negative.
pub fn distribute(
    total_change_base: u64,
    target_output_count: usize,
    change_address: &str,
    params: &ChainParams,
) -> Result<ChangeAllocation, UtxoError> {
    // Not worth an output at all.
    if total_change_base <= params.dust_threshold_base {
        return Ok(ChangeAllocation {
            outputs: Vec::new(),
            fee_adjustment_base: total_change_base,
        });
    }

    let cap = params.max_change_slots.min(MAX_CHANGE_SLOTS).max(1);
    let slot_count = target_output_count.min(cap).max(1);

    let slots: Vec<WeightedChangeOutput> = (0..slot_count)
        .map(|i| WeightedChangeOutput {
            address: change_address.to_string(),
            weight: 1u64 << i,
        })
        .collect();
    let sum_weights: u64 = slots.iter().map(|s| s.weight).sum();

    let mut outputs: Vec<PaymentOutput> = Vec::with_capacity(slot_count);
    let mut allocated: u64 = 0;
    for slot in slots {
        // Widened to avoid overflow in total * weight.
        let share =
            (total_change_base as u128 * slot.weight as u128 / sum_weights as u128) as u64;
        if share <= params.dust_threshold_base || share < params.min_change_base {
            log::debug!("dropping change slot with share {} base units", share);
            continue;
        }
        allocated += share;
        outputs.push(PaymentOutput {
            address: slot.address,
            value_base: share,
            is_change: true,
        });
    }

    // Rounding and dropped slots leave a remainder to account for.
    let loose = total_change_base.checked_sub(allocated).ok_or(
        UtxoError::NegativeLooseChangeInvariantViolation {
            total: total_change_base,
            allocated,
        },
    )?;

    let fee_adjustment_base = if outputs.is_empty() {
        if loose > params.dust_threshold_base {
            // Every slot was dropped but the total is still worth
            // keeping; recover it into a single output.
            outputs.push(PaymentOutput {
                address: change_address.to_string(),
                value_base: loose,
                is_change: true,
            });
            0
        } else {
            loose
        }
    } else {
        let kept = outputs.len() as u64;
        let per_output = loose / kept;
        if per_output > 1 {
            for output in &mut outputs {
                output.value_base += per_output;
            }
            loose - per_output * kept
        } else {
            loose
        }
    };

    if fee_adjustment_base > 0 {
        log::debug!("folding {} base units of loose change into fee", fee_adjustment_base);
    }

    Ok(ChangeAllocation {
        outputs,
        fee_adjustment_base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ChainParams {
        ChainParams::default()
    }

    fn conservation(total: u64, allocation: &ChangeAllocation) {
        let paid: u64 = allocation.outputs.iter().map(|o| o.value_base).sum();
        assert_eq!(
            paid + allocation.fee_adjustment_base,
            total,
            "distribution must conserve the change total"
        );
    }

    #[test]
    fn test_dust_total_folds_into_fee() {
        let allocation = distribute(546, 3, "chg", &params()).unwrap();
        assert!(allocation.outputs.is_empty());
        assert_eq!(allocation.fee_adjustment_base, 546);

        let allocation = distribute(0, 3, "chg", &params()).unwrap();
        assert!(allocation.outputs.is_empty());
        assert_eq!(allocation.fee_adjustment_base, 0);
    }

    #[test]
    fn test_single_slot_takes_everything() {
        let allocation = distribute(48_000, 1, "chg", &params()).unwrap();
        assert_eq!(allocation.outputs.len(), 1);
        assert_eq!(allocation.outputs[0].value_base, 48_000);
        assert_eq!(allocation.outputs[0].address, "chg");
        assert!(allocation.outputs[0].is_change);
        assert_eq!(allocation.fee_adjustment_base, 0);
    }

    #[test]
    fn test_weights_double_per_slot() {
        // Three slots, weights 1/2/4, sum 7.
        let total = 70_000;
        let allocation = distribute(total, 3, "chg", &params()).unwrap();
        assert_eq!(allocation.outputs.len(), 3);
        assert_eq!(allocation.outputs[0].value_base, 10_000);
        assert_eq!(allocation.outputs[1].value_base, 20_000);
        assert_eq!(allocation.outputs[2].value_base, 40_000);
        conservation(total, &allocation);
    }

    #[test]
    fn test_rounding_remainder_folds_into_fee() {
        // Floor shares are 14285/28571/57142 against a sum of 7; the
        // loose 2 base units are below one per output and go to fee.
        let total = 100_000;
        let allocation = distribute(total, 3, "chg", &params()).unwrap();
        assert_eq!(allocation.outputs.len(), 3);
        conservation(total, &allocation);
        assert_eq!(allocation.fee_adjustment_base, 2);
    }

    #[test]
    fn test_dropped_share_spreads_over_survivors() {
        let total = 20_000;
        let allocation = distribute(total, 5, "chg", &params()).unwrap();
        // Shares against a sum of 31: 645, 1290, 2580, 5161, 10322.
        // The first exceeds dust (546) but sits below min_change_base
        // (1000), so it drops.
        assert_eq!(allocation.outputs.len(), 4);
        conservation(total, &allocation);
        // Loose 645+2 spread as floor(647/4)=161 each, 3 to fee.
        assert_eq!(allocation.fee_adjustment_base, 3);
        assert_eq!(allocation.outputs[0].value_base, 1290 + 161);
    }

    #[test]
    fn test_all_dust_allocation_recovers_one_output() {
        // Five slots splinter 1_800 so far that every share lands under
        // the minimum change (largest is 1800*16/31 = 929), yet the
        // total is above dust and must not be lost to fee.
        let total = 1_800;
        let allocation = distribute(total, 5, "chg", &params()).unwrap();
        assert_eq!(allocation.outputs.len(), 1);
        assert_eq!(allocation.outputs[0].value_base, total);
        assert_eq!(allocation.fee_adjustment_base, 0);
    }

    #[test]
    fn test_slot_count_is_capped() {
        // A pathological pool target must not overflow the weights.
        let total = 1_000_000_000;
        let allocation = distribute(total, 10_000, "chg", &params()).unwrap();
        assert!(allocation.outputs.len() <= MAX_CHANGE_SLOTS);
        conservation(total, &allocation);
    }

    #[test]
    fn test_zero_slot_request_behaves_as_one() {
        let allocation = distribute(48_000, 0, "chg", &params()).unwrap();
        assert_eq!(allocation.outputs.len(), 1);
        assert_eq!(allocation.outputs[0].value_base, 48_000);
    }

    #[test]
    fn test_no_sub_dust_outputs_survive() {
        let p = params();
        for total in [547u64, 1_000, 2_000, 5_000, 100_000, 12_345_678] {
            for slots in [1usize, 2, 3, 5, 8, 32] {
                let allocation = distribute(total, slots, "chg", &p).unwrap();
                for output in &allocation.outputs {
                    assert!(
                        output.value_base > p.dust_threshold_base,
                        "sub-dust output {} from total {total} slots {slots}",
                        output.value_base
                    );
                }
                conservation(total, &allocation);
            }
        }
    }
}
