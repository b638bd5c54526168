//! Partial signature material exchanged between signers.
//!
//! A [`PartiallySignedTx`] never carries the unsigned payment itself,
//! only its content fingerprint; each signer receives the unsigned form
//! out of band and the coordinator checks the fingerprints match before
//! accepting any contribution. Signature maps are ordered so that two
//! partials carrying the same material serialize identically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use payforge_primitives::Txid;
use payforge_utxo::{Fingerprint, PaymentTx};

use crate::descriptor::MultisigDescriptor;

/// One signer's signature over one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSignature {
    /// Index of the input within the unsigned payment.
    pub input_index: u32,
    /// Public key the signature verifies against.
    pub public_key: String,
    /// Opaque signature bytes produced by the external signing
    /// primitive.
    #[serde(with = "sig_hex")]
    pub signature: Vec<u8>,
}

/// Signature material accumulated for one unsigned payment.
///
/// Maps `input index -> public key -> signature bytes`.
pub type SignatureMap = BTreeMap<u32, BTreeMap<String, Vec<u8>>>;

/// An unsigned payment plus the signatures gathered for it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartiallySignedTx {
    /// Fingerprint of the unsigned payment all signatures refer to.
    pub unsigned_fingerprint: Fingerprint,
    /// The signer set and who has contributed.
    pub multisig: MultisigDescriptor,
    /// Collected signatures, keyed by input index then public key.
    pub signatures: SignatureMap,
    /// Input count of the unsigned payment, kept so quorum validation
    /// does not need the payment itself.
    pub input_count: u32,
    /// Set once a combine reaches quorum; finalized values never
    /// re-enter coordination.
    pub finalized: bool,
}

impl PartiallySignedTx {
    /// Start coordination for an unsigned payment.
    pub fn new(unsigned: &PaymentTx, multisig: MultisigDescriptor) -> PartiallySignedTx {
        PartiallySignedTx {
            unsigned_fingerprint: unsigned.fingerprint(),
            multisig,
            signatures: BTreeMap::new(),
            input_count: unsigned.inputs.len() as u32,
            finalized: false,
        }
    }

    /// Number of signers that have contributed.
    pub fn signed_count(&self) -> usize {
        self.multisig.signed_count()
    }

    /// Signatures recorded for one input.
    pub fn signatures_for_input(&self, input_index: u32) -> usize {
        self.signatures
            .get(&input_index)
            .map_or(0, |per_key| per_key.len())
    }
}

/// A payment that reached quorum, with its network transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedTx {
    /// Deterministic network id of the finalized transaction.
    pub tx_id: Txid,
    /// The quorum signatures chosen per input, in signer-set order.
    pub input_signatures: Vec<Vec<InputSignature>>,
    /// The terminal partial state, `finalized` set.
    pub tx: PartiallySignedTx,
}

/// Outcome of combining partials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineOutcome {
    /// Quorum not reached yet; feed this into a later combine together
    /// with further contributions.
    Partial(PartiallySignedTx),
    /// Quorum reached and every input fully signed.
    Finalized(FinalizedTx),
}

impl CombineOutcome {
    /// Whether this outcome is finalized.
    pub fn is_finalized(&self) -> bool {
        matches!(self, CombineOutcome::Finalized(_))
    }
}

mod sig_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
