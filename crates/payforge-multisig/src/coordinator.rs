//! The M-of-N coordination state machine.
//!
//! A payment moves through `unsigned -> partially signed -> finalized`
//! and never back. Each signer contributes independently through
//! [`MultisigCoordinator::signer_sign`]; contributions are merged with
//! [`MultisigCoordinator::combine`], which finalizes as soon as a
//! quorum of the signer set has signed every input.

use payforge_primitives::hash::sha256d;
use payforge_primitives::Txid;
use payforge_utxo::PaymentTx;

use crate::partial::{CombineOutcome, FinalizedTx, InputSignature, PartiallySignedTx};
use crate::MultisigError;

/// A signing capability bound to one identity in the signer set.
///
/// Implementations wrap the external cryptographic primitive; the
/// coordinator never sees key material, only opaque signature bytes.
pub trait PartialSigner {
    /// Identity presented when contributing, matched against the
    /// signer set by account id.
    fn account_id(&self) -> &str;

    /// Public key the produced signatures verify against.
    fn public_key(&self) -> &str;

    /// Sign every input of the unsigned payment this signer is able to
    /// sign.
    fn sign(
        &self,
        unsigned: &PaymentTx,
    ) -> impl std::future::Future<Output = Result<Vec<InputSignature>, MultisigError>> + Send;
}

/// Coordinates independent partial signatures into one finalized
/// transaction.
///
/// The coordinator holds no state of its own; every operation is a
/// functional update over caller-supplied values, so contributions can
/// be gathered in any order, persisted, and re-combined later.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultisigCoordinator;

impl MultisigCoordinator {
    /// Create a coordinator.
    pub fn new() -> MultisigCoordinator {
        MultisigCoordinator
    }

    /// Record one signer's contribution over the unsigned payment.
    ///
    /// The partial must reference `unsigned` by fingerprint, the signer
    /// must appear in the signer set under its account id and public
    /// key, and must not have contributed before. On success a new
    /// [`PartiallySignedTx`] is returned with the signer's flag set and
    /// its per-input signatures merged; the input value is never
    /// modified.
    pub async fn signer_sign<S: PartialSigner>(
        &self,
        unsigned: &PaymentTx,
        partial: &PartiallySignedTx,
        signer: &S,
    ) -> Result<PartiallySignedTx, MultisigError> {
        if partial.finalized {
            return Err(MultisigError::Signing(
                "transaction is already finalized".to_string(),
            ));
        }
        let actual = unsigned.fingerprint();
        if actual != partial.unsigned_fingerprint {
            return Err(MultisigError::MismatchedUnsignedTx {
                expected: partial.unsigned_fingerprint.to_string(),
                actual: actual.to_string(),
            });
        }

        let account_id = signer.account_id().to_string();
        let entry = partial
            .multisig
            .entry(&account_id)
            .ok_or(MultisigError::NotASigner {
                account_id: account_id.clone(),
            })?;
        if entry.public_key != signer.public_key() {
            return Err(MultisigError::Signing(format!(
                "public key for {} does not match the signer set",
                account_id
            )));
        }
        if entry.signed {
            return Err(MultisigError::AlreadySigned { account_id });
        }

        let signatures = signer.sign(unsigned).await?;
        for sig in &signatures {
            if sig.input_index >= partial.input_count {
                return Err(MultisigError::Signing(format!(
                    "signature for input {} is out of range",
                    sig.input_index
                )));
            }
            if sig.public_key != signer.public_key() {
                return Err(MultisigError::Signing(format!(
                    "signer {} returned a signature under a foreign key",
                    account_id
                )));
            }
        }

        let mut updated = partial.clone();
        updated.multisig.mark_signed(&account_id);
        for sig in signatures {
            updated
                .signatures
                .entry(sig.input_index)
                .or_default()
                .insert(sig.public_key, sig.signature);
        }
        log::debug!(
            "signer {} contributed; {} of {} signed",
            account_id,
            updated.signed_count(),
            updated.multisig.m
        );
        Ok(updated)
    }

    /// Merge partials over the same unsigned payment, finalizing once
    /// a quorum of the signer set has signed.
    ///
    /// Partials are merged left to right starting from the first, and
    /// merging stops as soon as the union of signed identities reaches
    /// the quorum; contributions arriving after that point are ignored.
    /// At quorum every input must carry signatures from at least `m`
    /// signer-set keys, and the finalized transaction always uses the
    /// first `m` available signatures per input in signer-set order, so
    /// the resulting network id does not depend on how a given quorum
    /// was assembled.
    ///
    /// Below quorum the merged partial is returned for a later combine
    /// round.
    pub fn combine(
        &self,
        partials: &[PartiallySignedTx],
    ) -> Result<CombineOutcome, MultisigError> {
        if partials.len() < 2 {
            return Err(MultisigError::CombineRequiresAtLeastTwo {
                count: partials.len(),
            });
        }
        if partials.iter().any(|p| p.finalized) {
            return Err(MultisigError::CannotCombineFinalized);
        }

        let first = &partials[0];
        for partial in &partials[1..] {
            if partial.unsigned_fingerprint != first.unsigned_fingerprint {
                return Err(MultisigError::MismatchedUnsignedTx {
                    expected: first.unsigned_fingerprint.to_string(),
                    actual: partial.unsigned_fingerprint.to_string(),
                });
            }
            if !partial.multisig.same_signer_set(&first.multisig) {
                return Err(MultisigError::InvalidDescriptor(
                    "partials disagree on the signer set".to_string(),
                ));
            }
            if partial.input_count != first.input_count {
                return Err(MultisigError::InvalidDescriptor(
                    "partials disagree on the input count".to_string(),
                ));
            }
        }

        let quorum = first.multisig.m;
        let mut merged = first.clone();
        for partial in &partials[1..] {
            if merged.multisig.signed_count() >= quorum {
                log::debug!("quorum of {} reached, ignoring remaining partials", quorum);
                break;
            }
            for signer in &partial.multisig.signers {
                if signer.signed {
                    merged.multisig.mark_signed(&signer.account_id);
                }
            }
            for (input_index, per_key) in &partial.signatures {
                let slot = merged.signatures.entry(*input_index).or_default();
                for (public_key, signature) in per_key {
                    slot.insert(public_key.clone(), signature.clone());
                }
            }
        }

        if merged.multisig.signed_count() >= quorum {
            Self::finalize(merged).map(CombineOutcome::Finalized)
        } else {
            Ok(CombineOutcome::Partial(merged))
        }
    }

    /// Select quorum signatures for every input and derive the network
    /// id.
    fn finalize(mut merged: PartiallySignedTx) -> Result<FinalizedTx, MultisigError> {
        let need = merged.multisig.m;
        let mut input_signatures = Vec::with_capacity(merged.input_count as usize);
        for input_index in 0..merged.input_count {
            let per_key = merged.signatures.get(&input_index);
            let selected: Vec<InputSignature> = merged
                .multisig
                .signers
                .iter()
                .filter_map(|signer| {
                    per_key
                        .and_then(|keys| keys.get(&signer.public_key))
                        .map(|signature| InputSignature {
                            input_index,
                            public_key: signer.public_key.clone(),
                            signature: signature.clone(),
                        })
                })
                .take(need)
                .collect();
            if selected.len() < need {
                return Err(MultisigError::IncompleteSignatures {
                    input_index,
                    have: selected.len(),
                    need,
                });
            }
            input_signatures.push(selected);
        }

        let mut preimage = Vec::new();
        preimage.extend_from_slice(merged.unsigned_fingerprint.as_bytes());
        for group in &input_signatures {
            for sig in group {
                preimage.extend_from_slice(&sig.input_index.to_le_bytes());
                preimage.extend_from_slice(&(sig.public_key.len() as u64).to_le_bytes());
                preimage.extend_from_slice(sig.public_key.as_bytes());
                preimage.extend_from_slice(&(sig.signature.len() as u64).to_le_bytes());
                preimage.extend_from_slice(&sig.signature);
            }
        }
        let tx_id = Txid::new(sha256d(&preimage));
        log::debug!("finalized multisig payment as {}", tx_id);

        merged.finalized = true;
        Ok(FinalizedTx {
            tx_id,
            input_signatures,
            tx: merged,
        })
    }
}
