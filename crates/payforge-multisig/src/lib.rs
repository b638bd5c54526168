/// payforge SDK - Multisig signing coordination.
///
/// Tracks which of a fixed M-of-N signer set have contributed partial
/// signatures over the same unsigned payment, and combines partials
/// into a finalized transaction once a quorum is reached.

pub mod descriptor;
pub mod partial;
pub mod coordinator;

mod error;
pub use coordinator::{MultisigCoordinator, PartialSigner};
pub use descriptor::{MultisigDescriptor, SignerEntry};
pub use error::MultisigError;
pub use partial::{CombineOutcome, FinalizedTx, InputSignature, PartiallySignedTx};
