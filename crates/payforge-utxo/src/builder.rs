//! Payment transaction assembly.
//!
//! The builder orchestrates selection, fee estimation, and change
//! distribution into a balanced, immutable [`PaymentTx`]. Address
//! validation is the only awaited collaborator and completes before any
//! arithmetic begins; everything after it is synchronous computation
//! over the snapshot the caller supplied.

use serde::{Deserialize, Serialize};

use payforge_primitives::amount::parse_main_amount;
use payforge_primitives::PrimitivesError;

use crate::change::distribute;
use crate::fee::FeeRate;
use crate::params::ChainParams;
use crate::payment::{DesiredOutput, PaymentOutput, PaymentTx};
use crate::select::select;
use crate::utxo::Utxo;
use crate::UtxoError;

/// Chain-specific address validation.
///
/// Address encoding lives outside this crate; the builder only asks
/// whether a string is a valid destination on the target chain.
pub trait AddressValidator {
    /// Check whether `address` is valid for the target chain.
    fn is_valid(
        &self,
        address: &str,
    ) -> impl std::future::Future<Output = Result<bool, UtxoError>> + Send;
}

/// Everything the caller specifies for one payment build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Requested recipient outputs, amounts in the main denomination.
    pub outputs: Vec<DesiredOutput>,
    /// Address receiving any change.
    pub change_address: String,
    /// Fee rate to apply, already resolved by the caller.
    pub fee_rate: FeeRate,
    /// Spend every supplied UTXO instead of selecting a subset.
    pub use_all_utxos: bool,
    /// Allow unconfirmed UTXOs to fund the payment.
    pub use_unconfirmed_utxos: bool,
    /// Desired number of UTXOs in the pool after this payment; drives
    /// how many change outputs are created.
    pub target_utxo_pool_size: usize,
}

/// Builds unsigned payment transactions from a UTXO snapshot.
///
/// A successful build never mutates the supplied snapshot and always
/// returns a balanced transaction. Concurrent builds over the same pool
/// are each safe in isolation but may select overlapping UTXOs; keeping
/// at most one build in flight per address is the UTXO provider's
/// contract, not this type's.
#[derive(Debug, Clone)]
pub struct TransactionBuilder<V> {
    validator: V,
    params: ChainParams,
}

impl<V: AddressValidator> TransactionBuilder<V> {
    /// Create a builder for one chain.
    pub fn new(validator: V, params: ChainParams) -> Self {
        TransactionBuilder { validator, params }
    }

    /// Chain parameters this builder applies.
    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Build a balanced unsigned payment.
    ///
    /// Steps, in order: validate outputs and change address, filter the
    /// snapshot to confirmed outputs unless unconfirmed spending was
    /// requested, select inputs with room reserved for change in the
    /// fee sizing, handle the exact-balance fee-sharing case, reject
    /// underfunding, then distribute change and assemble. Any failure
    /// aborts; no partial transaction is ever returned.
    pub async fn build(
        &self,
        unused_utxos: &[Utxo],
        request: &PaymentRequest,
    ) -> Result<PaymentTx, UtxoError> {
        let mut external_outputs = self.validated_outputs(&request.outputs).await?;
        if !self.validator.is_valid(&request.change_address).await? {
            return Err(UtxoError::InvalidAddress {
                address: request.change_address.clone(),
            });
        }
        let mut output_total_base: u64 =
            external_outputs.iter().map(|o| o.value_base).sum();

        let spendable: Vec<Utxo> = if request.use_unconfirmed_utxos {
            unused_utxos.to_vec()
        } else {
            unused_utxos
                .iter()
                .filter(|u| u.is_confirmed())
                .cloned()
                .collect()
        };

        // Reserve room for change outputs when sizing fees during
        // selection, so adding change later cannot underfund the fee.
        let max_output_count = external_outputs.len() + request.target_utxo_pool_size;

        let selection = select(
            &spendable,
            output_total_base,
            max_output_count,
            &request.fee_rate,
            request.use_all_utxos,
            &self.params,
        )?;
        let mut fee_base = selection.fee_base;

        if !selection.covers(output_total_base) {
            if output_total_base == selection.selected_total_base {
                // The caller asked to send the whole selected balance;
                // the fee comes out of the external outputs instead.
                let share = fee_base.div_ceil(external_outputs.len() as u64);
                log::warn!(
                    "exact-balance send: sharing fee {} over {} outputs",
                    fee_base,
                    external_outputs.len()
                );
                for output in &mut external_outputs {
                    let reduced = output.value_base.saturating_sub(share);
                    if reduced <= self.params.dust_threshold_base {
                        return Err(UtxoError::DustOutput {
                            address: output.address.clone(),
                            value_base: reduced,
                            dust_threshold: self.params.dust_threshold_base,
                        });
                    }
                    output.value_base = reduced;
                }
                // Ceil division can overcharge by up to count-1 base
                // units; the shares are what is actually collected.
                fee_base = share * external_outputs.len() as u64;
                output_total_base -= fee_base;
            } else {
                return Err(UtxoError::InsufficientFunds {
                    available_base: selection.selected_total_base,
                    output_total_base,
                    fee_base,
                });
            }
        }

        let total_change_base = selection
            .selected_total_base
            .checked_sub(output_total_base)
            .and_then(|rest| rest.checked_sub(fee_base))
            .ok_or(UtxoError::NegativeChangeInvariantViolation {
                selected_total_base: selection.selected_total_base,
                output_total_base,
                fee_base,
            })?;

        // Change output count follows pool health: top the pool back up
        // to its target when this spend would leave it short.
        let remaining = unused_utxos.len() - selection.selected.len();
        let target_change_outputs = if remaining < request.target_utxo_pool_size {
            request.target_utxo_pool_size - remaining
        } else {
            1
        };
        log::debug!(
            "pool {} -> {} against target {}; aiming for {} change outputs",
            unused_utxos.len(),
            remaining,
            request.target_utxo_pool_size,
            target_change_outputs
        );

        let allocation = distribute(
            total_change_base,
            target_change_outputs,
            &request.change_address,
            &self.params,
        )?;
        fee_base += allocation.fee_adjustment_base;

        let change_total_base: u64 = allocation.outputs.iter().map(|o| o.value_base).sum();
        let change_address_if_single = if allocation.outputs.len() == 1 {
            Some(request.change_address.clone())
        } else {
            None
        };

        let mut outputs = external_outputs;
        outputs.extend(allocation.outputs);

        Ok(PaymentTx {
            inputs: selection.selected,
            outputs,
            fee_base,
            change_total_base,
            change_address_if_single,
            external_output_total_base: output_total_base,
        })
    }

    /// Validate every requested output and convert it to base units.
    ///
    /// The first invalid address, unparseable amount, or dust amount
    /// aborts the build.
    async fn validated_outputs(
        &self,
        outputs: &[DesiredOutput],
    ) -> Result<Vec<PaymentOutput>, UtxoError> {
        if outputs.is_empty() {
            return Err(UtxoError::InvalidAmount {
                value: String::new(),
                reason: "at least one output is required".to_string(),
            });
        }

        let mut validated = Vec::with_capacity(outputs.len());
        for desired in outputs {
            if !self.validator.is_valid(&desired.address).await? {
                return Err(UtxoError::InvalidAddress {
                    address: desired.address.clone(),
                });
            }
            let value_base = parse_main_amount(&desired.value_main, self.params.decimals)
                .map_err(|e| match e {
                    PrimitivesError::InvalidAmount { value, reason } => {
                        UtxoError::InvalidAmount { value, reason }
                    }
                    other => UtxoError::Primitives(other),
                })?;
            if value_base <= self.params.dust_threshold_base {
                return Err(UtxoError::DustOutput {
                    address: desired.address.clone(),
                    value_base,
                    dust_threshold: self.params.dust_threshold_base,
                });
            }
            validated.push(PaymentOutput {
                address: desired.address.clone(),
                value_base,
                is_change: false,
            });
        }
        Ok(validated)
    }
}
