//! Collaborator interfaces the wallet consumes.
//!
//! Everything network-facing lives behind these traits: where the
//! spendable outputs come from, what fee rate the network currently
//! wants, how a payment is encoded for the chain, and how it reaches
//! the network. The payment engine itself never performs IO.

use serde::{Deserialize, Serialize};

use payforge_utxo::fee::FeeRate;
use payforge_utxo::{PaymentTx, Utxo};

use crate::WalletError;

/// Urgency of a fee-rate recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeLevel {
    /// Next-block confirmation.
    High,
    /// Confirmation within a few blocks.
    Normal,
    /// Whenever the network gets around to it.
    Low,
}

/// Opaque version tag for one observed UTXO set.
///
/// A build presents its token back to the provider on commit; a stale
/// token means another payment spent from the same snapshot first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotToken(pub u64);

/// The spendable set of an address at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoSnapshot {
    /// Spendable outputs, in the provider's canonical order.
    pub utxos: Vec<Utxo>,
    /// Version tag to present on commit.
    pub token: SnapshotToken,
}

/// Source of spendable outputs.
///
/// Exclusivity contract: two concurrent builds must never spend the
/// same UTXO. The engine does not lock; implementations enforce the
/// contract by handing out at most one live snapshot per address, or
/// by versioning snapshots and rejecting a stale token on commit.
pub trait UtxoProvider {
    /// Observe the current spendable set for an address.
    fn snapshot(
        &self,
        address: &str,
    ) -> impl std::future::Future<Output = Result<UtxoSnapshot, WalletError>> + Send;

    /// Mark the given outputs spent after a successful broadcast,
    /// invalidating the snapshot token.
    fn commit(
        &self,
        token: SnapshotToken,
        spent: &[Utxo],
    ) -> impl std::future::Future<Output = Result<(), WalletError>> + Send;
}

/// Recommends a fee rate for the requested urgency.
pub trait FeeRateResolver {
    /// Fetch the current recommendation.
    fn recommend(
        &self,
        level: FeeLevel,
    ) -> impl std::future::Future<Output = Result<FeeRate, WalletError>> + Send;
}

/// Chain-specific wire encoding.
///
/// The wallet treats the encoded form as opaque bytes; signing and
/// broadcast collaborators are the only consumers.
pub trait WireSerializer {
    /// Encode a payment for signing and broadcast.
    fn to_wire(&self, tx: &PaymentTx) -> Result<Vec<u8>, WalletError>;

    /// Decode a previously encoded payment.
    fn from_wire(&self, raw: &[u8]) -> Result<PaymentTx, WalletError>;
}

/// Result of a successful broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastSuccess {
    /// The transaction id returned by the network.
    pub txid: String,
    /// Human-readable status message from the broadcaster.
    pub message: String,
}

/// Hands a wire-encoded transaction to the network.
pub trait Broadcaster {
    /// Broadcast a raw transaction.
    fn broadcast(
        &self,
        raw_tx: &[u8],
    ) -> impl std::future::Future<Output = Result<BroadcastSuccess, WalletError>> + Send;
}
