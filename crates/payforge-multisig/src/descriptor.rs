//! The fixed M-of-N signer set attached to a multisig payment.

use serde::{Deserialize, Serialize};

use crate::MultisigError;

/// One signer in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEntry {
    /// Stable identity the signer presents when contributing.
    pub account_id: String,
    /// Public key this signer's signatures must verify against.
    pub public_key: String,
    /// Whether this signer has contributed a partial signature.
    pub signed: bool,
}

/// An M-of-N signer set, established once when the unsigned payment is
/// created and never restructured afterwards. The `signed` flags are
/// the only state that evolves, and only through functional updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigDescriptor {
    /// Signatures required to finalize.
    pub m: usize,
    /// All eligible signers, in the fixed order that also decides which
    /// signatures end up in the finalized transaction.
    pub signers: Vec<SignerEntry>,
}

impl MultisigDescriptor {
    /// Create a descriptor for `m` of the given signers.
    ///
    /// # Arguments
    /// * `m` - Quorum size, `1 <= m <= signers.len()`.
    /// * `signers` - `(account_id, public_key)` pairs, one per signer.
    pub fn new(
        m: usize,
        signers: Vec<(String, String)>,
    ) -> Result<MultisigDescriptor, MultisigError> {
        if m == 0 {
            return Err(MultisigError::InvalidDescriptor(
                "quorum must be at least 1".to_string(),
            ));
        }
        if m > signers.len() {
            return Err(MultisigError::InvalidDescriptor(format!(
                "quorum {} exceeds signer count {}",
                m,
                signers.len()
            )));
        }
        for (i, (account_id, public_key)) in signers.iter().enumerate() {
            if account_id.is_empty() || public_key.is_empty() {
                return Err(MultisigError::InvalidDescriptor(format!(
                    "signer {} has an empty account id or public key",
                    i
                )));
            }
            for (other_id, other_key) in &signers[..i] {
                if other_id == account_id {
                    return Err(MultisigError::InvalidDescriptor(format!(
                        "duplicate account id {}",
                        account_id
                    )));
                }
                if other_key == public_key {
                    return Err(MultisigError::InvalidDescriptor(format!(
                        "duplicate public key for account {}",
                        account_id
                    )));
                }
            }
        }
        Ok(MultisigDescriptor {
            m,
            signers: signers
                .into_iter()
                .map(|(account_id, public_key)| SignerEntry {
                    account_id,
                    public_key,
                    signed: false,
                })
                .collect(),
        })
    }

    /// Number of signers that have contributed so far.
    pub fn signed_count(&self) -> usize {
        self.signers.iter().filter(|s| s.signed).count()
    }

    /// Whether enough signers have contributed to finalize.
    pub fn is_quorum_reached(&self) -> bool {
        self.signed_count() >= self.m
    }

    /// Look up a signer by account id.
    pub fn entry(&self, account_id: &str) -> Option<&SignerEntry> {
        self.signers.iter().find(|s| s.account_id == account_id)
    }

    /// Whether two descriptors define the same signer set, ignoring the
    /// evolving `signed` flags.
    pub fn same_signer_set(&self, other: &MultisigDescriptor) -> bool {
        self.m == other.m
            && self.signers.len() == other.signers.len()
            && self
                .signers
                .iter()
                .zip(other.signers.iter())
                .all(|(a, b)| a.account_id == b.account_id && a.public_key == b.public_key)
    }

    pub(crate) fn mark_signed(&mut self, account_id: &str) {
        for signer in &mut self.signers {
            if signer.account_id == account_id {
                signer.signed = true;
            }
        }
    }
}
