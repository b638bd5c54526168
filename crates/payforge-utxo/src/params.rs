//! Chain parameters for UTXO-based networks.

use serde::{Deserialize, Serialize};

/// Policy and denomination constants for one UTXO-based chain.
///
/// All monetary fields are in base units. The defaults describe a
/// Bitcoin-like mainnet; other chains override what they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Decimal places between the main and base denominations.
    pub decimals: u32,
    /// Outputs at or below this value are uneconomical to spend.
    pub dust_threshold_base: u64,
    /// Soft floor below which a change output is not worth creating.
    pub min_change_base: u64,
    /// Optional floor fee rate, base units per virtual byte, as a
    /// decimal string. When set, every fee is recomputed at this rate
    /// and the maximum taken.
    pub min_fee_rate: Option<String>,
    /// Absolute network minimum fee for any transaction, in base units.
    pub min_relay_fee_base: u64,
    /// Upper bound on change outputs created by one transaction.
    pub max_change_slots: usize,
}

impl Default for ChainParams {
    fn default() -> Self {
        ChainParams {
            decimals: 8,
            dust_threshold_base: 546,
            min_change_base: 1_000,
            min_fee_rate: Some("1".to_string()),
            min_relay_fee_base: 1_000,
            max_change_slots: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bitcoin_like() {
        let params = ChainParams::default();
        assert_eq!(params.decimals, 8);
        assert_eq!(params.dust_threshold_base, 546);
        assert!(params.min_fee_rate.is_some());
    }

    #[test]
    fn test_json_roundtrip() {
        let params = ChainParams {
            decimals: 6,
            min_fee_rate: None,
            ..ChainParams::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: ChainParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
