/// payforge SDK - Hashing, identifiers, and amount primitives.
///
/// This crate provides the foundational building blocks for the payforge SDK:
/// - Hash functions (SHA-256, SHA-256d)
/// - Transaction id type shared by the chain backends
/// - Exact decimal conversion between main and base denominations

pub mod hash;
pub mod txid;
pub mod amount;

mod error;
pub use error::PrimitivesError;
pub use txid::Txid;
