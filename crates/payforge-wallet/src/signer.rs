//! Signer configuration and its resolution into a uniform identity.

use serde::{Deserialize, Serialize};

use crate::WalletError;

/// Derives public keys from extended public keys. Key derivation is
/// external to this SDK; the wallet only consumes the derived result.
pub trait KeyDeriver {
    /// Derive the public key at `derivation_path` under `xpub`.
    fn derive_public_key(&self, xpub: &str, derivation_path: &str)
        -> Result<String, WalletError>;
}

/// How one signing identity is configured.
///
/// Closed set of shapes, resolved exactly once at wallet construction;
/// nothing downstream ever inspects the configuration again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignerConfig {
    /// HD wallet signer deriving its key from an extended public key.
    Hd {
        account_id: String,
        xpub: String,
        derivation_path: String,
    },
    /// Signer with a directly configured public key.
    KeyPair {
        account_id: String,
        public_key: String,
    },
}

/// A resolved signing identity, uniform regardless of how it was
/// configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerIdentity {
    /// Identity within a multisig signer set.
    pub account_id: String,
    /// Public key contributions verify against.
    pub public_key: String,
}

impl SignerConfig {
    /// The account id, available without resolution.
    pub fn account_id(&self) -> &str {
        match self {
            SignerConfig::Hd { account_id, .. } => account_id,
            SignerConfig::KeyPair { account_id, .. } => account_id,
        }
    }

    /// Resolve this configuration into a signing identity.
    pub fn resolve<D: KeyDeriver>(&self, deriver: &D) -> Result<SignerIdentity, WalletError> {
        match self {
            SignerConfig::Hd {
                account_id,
                xpub,
                derivation_path,
            } => Ok(SignerIdentity {
                account_id: account_id.clone(),
                public_key: deriver.derive_public_key(xpub, derivation_path)?,
            }),
            SignerConfig::KeyPair {
                account_id,
                public_key,
            } => Ok(SignerIdentity {
                account_id: account_id.clone(),
                public_key: public_key.clone(),
            }),
        }
    }
}
