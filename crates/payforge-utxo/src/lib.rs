/// payforge SDK - UTXO payment construction.
///
/// Provides fee estimation, coin selection, change distribution, and the
/// payment transaction builder shared by the UTXO chain backends.

pub mod params;
pub mod utxo;
pub mod fee;
pub mod payment;
pub mod select;
pub mod change;
pub mod builder;

mod error;
pub use error::UtxoError;
pub use builder::{AddressValidator, PaymentRequest, TransactionBuilder};
pub use params::ChainParams;
pub use payment::{DesiredOutput, Fingerprint, PaymentOutput, PaymentTx};
pub use utxo::Utxo;
