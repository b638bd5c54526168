//! Unspent transaction output snapshots.

use payforge_primitives::Txid;
use serde::{Deserialize, Serialize};

/// A single unspent transaction output as observed from the chain.
///
/// Snapshots are immutable once fetched; wallet state changes only by
/// observing new chain state, never by editing an existing snapshot.
/// Produced by the external chain client and consumed read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Id of the transaction that created this output.
    pub txid: Txid,
    /// Output index within that transaction.
    pub vout: u32,
    /// Value in base units.
    pub value_base: u64,
    /// Confirmation count, when the chain client reported one.
    pub confirmations: Option<u32>,
    /// Whether the creating transaction's block height was known at
    /// fetch time.
    pub height_known: bool,
    /// Whether the creating transaction is a coinbase, so maturity
    /// policy can be applied by the provider.
    pub is_coinbase: bool,
}

impl Utxo {
    /// True when this output has at least one confirmation.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.confirmations, Some(c) if c > 0)
    }

    /// The `txid:vout` outpoint form used in logs and diagnostics.
    pub fn outpoint(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

/// Sum of the values of a slice of UTXOs, in base units.
pub fn total_value(utxos: &[Utxo]) -> u64 {
    utxos.iter().map(|u| u.value_base).sum()
}
