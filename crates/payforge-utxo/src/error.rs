/// Error types for payment construction.
///
/// All variants are terminal for the current call; nothing is retried or
/// silently defaulted. The two `*InvariantViolation` variants mark
/// internal logic faults rather than bad caller input.
#[derive(Debug, thiserror::Error)]
pub enum UtxoError {
    /// The injected validator rejected an address.
    #[error("invalid address: {address}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
    },
    /// A requested amount is malformed, non-positive, or too precise.
    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount {
        /// The offending amount string as supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// An output would be at or below the network dust threshold.
    #[error("output to {address} of {value_base} base units is at or below the dust threshold {dust_threshold}")]
    DustOutput {
        /// Destination of the offending output.
        address: String,
        /// Its value in base units.
        value_base: u64,
        /// The dust threshold it violates.
        dust_threshold: u64,
    },
    /// The spendable value cannot cover the requested outputs plus fee.
    #[error("insufficient funds: {available_base} base units available, {output_total_base} requested, {fee_base} fee")]
    InsufficientFunds {
        /// Total value of the selected inputs.
        available_base: u64,
        /// Sum of the requested outputs.
        output_total_base: u64,
        /// Estimated fee at the point of failure.
        fee_base: u64,
    },
    /// A fee rate string could not be interpreted.
    #[error("invalid fee rate {rate:?}: {reason}")]
    FeeRate {
        /// The offending rate string.
        rate: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Internal fault: selection covered less value than it reported.
    #[error("internal: negative change from {selected_total_base} selected against {output_total_base} outputs plus {fee_base} fee")]
    NegativeChangeInvariantViolation {
        /// Total value of the selected inputs.
        selected_total_base: u64,
        /// Sum of the requested outputs.
        output_total_base: u64,
        /// Fee at the point of failure.
        fee_base: u64,
    },
    /// Internal fault: change allocation assigned more than the total.
    #[error("internal: negative loose change, allocated {allocated} of {total}")]
    NegativeLooseChangeInvariantViolation {
        /// The change total being distributed.
        total: u64,
        /// The sum of allocated shares, which exceeded it.
        allocated: u64,
    },
    /// An underlying primitives error (forwarded from `payforge-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] payforge_primitives::PrimitivesError),
}
