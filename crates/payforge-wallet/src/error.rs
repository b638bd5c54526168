/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("payment error: {0}")]
    Utxo(#[from] payforge_utxo::UtxoError),
    #[error("multisig error: {0}")]
    Multisig(#[from] payforge_multisig::MultisigError),
    #[error("primitives error: {0}")]
    Primitives(#[from] payforge_primitives::PrimitivesError),
    #[error("fee resolver error: {0}")]
    FeeResolver(String),
    #[error("utxo provider error: {0}")]
    Provider(String),
    #[error("wire serialization error: {0}")]
    Serialization(String),
    #[error("broadcast error: {0}")]
    Broadcast(String),
    #[error("key derivation error: {0}")]
    KeyDerivation(String),
}
