#![deny(missing_docs)]

//! payforge SDK - Complete SDK.
//!
//! Re-exports all payforge components for convenient single-crate usage.

pub use payforge_primitives as primitives;
pub use payforge_utxo as utxo;
pub use payforge_multisig as multisig;
pub use payforge_wallet as wallet;
