/// Error types for primitive operations.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// A transaction id could not be parsed.
    #[error("invalid txid: {0}")]
    InvalidTxid(String),
    /// A monetary amount string is malformed, non-positive, or too precise.
    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount {
        /// The offending amount string as supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Invalid hex encoding (forwarded from the `hex` crate).
    #[error("hex error: {0}")]
    Hex(#[from] hex::FromHexError),
}
