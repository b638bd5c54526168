//! Payment descriptions: requested outputs and the built transaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use payforge_primitives::hash::sha256d;
use payforge_primitives::PrimitivesError;

use crate::utxo::Utxo;

/// A recipient output as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredOutput {
    /// Destination address.
    pub address: String,
    /// Amount as a main-denomination decimal string.
    pub value_main: String,
}

impl DesiredOutput {
    /// Create a desired output.
    pub fn new(address: impl Into<String>, value_main: impl Into<String>) -> Self {
        DesiredOutput {
            address: address.into(),
            value_main: value_main.into(),
        }
    }
}

/// One output of a built payment.
///
/// The `is_change` flag is a local annotation distinguishing change from
/// the externally requested outputs; it does not alter what reaches the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutput {
    /// Destination address.
    pub address: String,
    /// Value in base units.
    pub value_base: u64,
    /// Whether this output returns leftover value to the sender.
    pub is_change: bool,
}

/// A fully determined unsigned payment transaction.
///
/// Values of this type are immutable once returned by the builder and
/// always satisfy `sum(inputs) == sum(outputs) + fee_base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTx {
    /// Inputs funding the payment.
    pub inputs: Vec<Utxo>,
    /// All outputs, external first, change after.
    pub outputs: Vec<PaymentOutput>,
    /// Total fee in base units.
    pub fee_base: u64,
    /// Sum of the change output values in base units.
    pub change_total_base: u64,
    /// The change address, populated only when exactly one change
    /// output exists. Kept for single-change-address callers.
    pub change_address_if_single: Option<String>,
    /// Sum of the non-change output values in base units.
    pub external_output_total_base: u64,
}

impl PaymentTx {
    /// Sum of the input values in base units.
    pub fn input_total_base(&self) -> u64 {
        self.inputs.iter().map(|u| u.value_base).sum()
    }

    /// Sum of all output values in base units.
    pub fn output_total_base(&self) -> u64 {
        self.outputs.iter().map(|o| o.value_base).sum()
    }

    /// The externally requested outputs, in request order.
    pub fn external_outputs(&self) -> impl Iterator<Item = &PaymentOutput> {
        self.outputs.iter().filter(|o| !o.is_change)
    }

    /// The change outputs, in slot order.
    pub fn change_outputs(&self) -> impl Iterator<Item = &PaymentOutput> {
        self.outputs.iter().filter(|o| o.is_change)
    }

    /// Content fingerprint of the unsigned transaction.
    ///
    /// Double SHA-256 over a fixed-order encoding of the outpoints and
    /// outputs. This is not a wire format; co-signers use it to confirm
    /// they are signing the same transaction.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut buf = Vec::with_capacity(64 + 40 * self.inputs.len() + 48 * self.outputs.len());
        buf.extend_from_slice(b"payforge/unsigned/v1");

        buf.extend_from_slice(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(input.txid.as_bytes());
            buf.extend_from_slice(&input.vout.to_le_bytes());
        }

        buf.extend_from_slice(&(self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(&(output.address.len() as u64).to_le_bytes());
            buf.extend_from_slice(output.address.as_bytes());
            buf.extend_from_slice(&output.value_base.to_le_bytes());
        }

        Fingerprint(sha256d(&buf))
    }
}

/// Content hash identifying one unsigned transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Access the internal digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s)?;
        if decoded.len() != 32 {
            return Err(PrimitivesError::InvalidTxid(format!(
                "fingerprint must be 32 bytes, got {}",
                decoded.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&decoded);
        Ok(Fingerprint(arr))
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
