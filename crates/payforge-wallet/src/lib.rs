/// payforge SDK - Wallet facade.
///
/// Wires the external collaborators (UTXO provider, fee-rate resolver,
/// wire serializer, broadcaster) around the payment engine and exposes
/// the common create/sign/broadcast interface shared by all chains.

pub mod providers;
pub mod signer;
pub mod wallet;

mod error;
pub use error::WalletError;
pub use providers::{
    BroadcastSuccess, Broadcaster, FeeLevel, FeeRateResolver, SnapshotToken, UtxoProvider,
    UtxoSnapshot, WireSerializer,
};
pub use signer::{KeyDeriver, SignerConfig, SignerIdentity};
pub use wallet::{PaymentService, PreparedPayment, UtxoWallet, WalletConfig};

#[cfg(test)]
mod tests;
