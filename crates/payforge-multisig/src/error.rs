/// Error types for multisig coordination.
#[derive(Debug, thiserror::Error)]
pub enum MultisigError {
    #[error("account {account_id} is not in the signer set")]
    NotASigner { account_id: String },
    #[error("account {account_id} has already signed")]
    AlreadySigned { account_id: String },
    #[error("partial references unsigned tx {actual}, expected {expected}")]
    MismatchedUnsignedTx { expected: String, actual: String },
    #[error("finalized transactions cannot be combined")]
    CannotCombineFinalized,
    #[error("combine needs at least two partials, got {count}")]
    CombineRequiresAtLeastTwo { count: usize },
    #[error("input {input_index} has {have} of {need} required signatures")]
    IncompleteSignatures {
        input_index: u32,
        have: usize,
        need: usize,
    },
    #[error("invalid multisig descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("signing failed: {0}")]
    Signing(String),
}
