//! Tests for the payforge-wallet crate.
//!
//! Drives the wallet facade end to end through mock collaborators:
//! snapshot provider, fee resolver, wire serializer, and broadcaster.

use std::sync::{Arc, Mutex};

use payforge_primitives::Txid;
use payforge_utxo::fee::{FeeRate, FeeRateKind};
use payforge_utxo::{AddressValidator, DesiredOutput, PaymentTx, Utxo, UtxoError};

use crate::providers::{
    BroadcastSuccess, Broadcaster, FeeLevel, FeeRateResolver, SnapshotToken, UtxoProvider,
    UtxoSnapshot, WireSerializer,
};
use crate::wallet::{PaymentService, UtxoWallet, WalletConfig};
use crate::WalletError;

// -----------------------------------------------------------------------
// Test fixtures
// -----------------------------------------------------------------------

/// Validator that rejects any address starting with "bad".
struct MockValidator;

impl AddressValidator for MockValidator {
    async fn is_valid(&self, address: &str) -> Result<bool, UtxoError> {
        Ok(!address.starts_with("bad"))
    }
}

/// Commit calls observed by the mock provider, as (token, spent count).
type CommitLog = Arc<Mutex<Vec<(SnapshotToken, usize)>>>;

/// Raw payloads observed by the mock broadcaster.
type BroadcastLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// Serves a fixed snapshot and records commits.
struct MockProvider {
    utxos: Vec<Utxo>,
    token: SnapshotToken,
    committed: CommitLog,
}

impl MockProvider {
    fn new(utxos: Vec<Utxo>) -> (MockProvider, CommitLog) {
        let committed = Arc::new(Mutex::new(Vec::new()));
        let provider = MockProvider {
            utxos,
            token: SnapshotToken(42),
            committed: Arc::clone(&committed),
        };
        (provider, committed)
    }
}

impl UtxoProvider for MockProvider {
    async fn snapshot(&self, _address: &str) -> Result<UtxoSnapshot, WalletError> {
        Ok(UtxoSnapshot {
            utxos: self.utxos.clone(),
            token: self.token,
        })
    }

    async fn commit(&self, token: SnapshotToken, spent: &[Utxo]) -> Result<(), WalletError> {
        self.committed.lock().unwrap().push((token, spent.len()));
        Ok(())
    }
}

/// Recommends a fixed rate, or fails when none is configured.
struct MockResolver {
    rate: Option<FeeRate>,
}

impl FeeRateResolver for MockResolver {
    async fn recommend(&self, _level: FeeLevel) -> Result<FeeRate, WalletError> {
        self.rate
            .clone()
            .ok_or_else(|| WalletError::FeeResolver("estimator offline".to_string()))
    }
}

/// JSON stand-in for a chain wire format.
struct MockSerializer;

impl WireSerializer for MockSerializer {
    fn to_wire(&self, tx: &PaymentTx) -> Result<Vec<u8>, WalletError> {
        serde_json::to_vec(tx).map_err(|e| WalletError::Serialization(e.to_string()))
    }

    fn from_wire(&self, raw: &[u8]) -> Result<PaymentTx, WalletError> {
        serde_json::from_slice(raw).map_err(|e| WalletError::Serialization(e.to_string()))
    }
}

/// Accepts everything and records the payloads it saw.
struct MockBroadcaster {
    seen: BroadcastLog,
}

impl MockBroadcaster {
    fn new() -> (MockBroadcaster, BroadcastLog) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let broadcaster = MockBroadcaster {
            seen: Arc::clone(&seen),
        };
        (broadcaster, seen)
    }
}

impl Broadcaster for MockBroadcaster {
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, WalletError> {
        self.seen.lock().unwrap().push(raw_tx.to_vec());
        Ok(BroadcastSuccess {
            txid: "mock-txid".to_string(),
            message: "seen on network".to_string(),
        })
    }
}

fn confirmed(tag: u8, value_base: u64) -> Utxo {
    Utxo {
        txid: Txid::new([tag; 32]),
        vout: 0,
        value_base,
        confirmations: Some(3),
        height_known: true,
        is_coinbase: false,
    }
}

fn unconfirmed(tag: u8, value_base: u64) -> Utxo {
    Utxo {
        confirmations: None,
        height_known: false,
        ..confirmed(tag, value_base)
    }
}

fn flat_fee(base_units: &str) -> FeeRate {
    FeeRate::new(base_units, FeeRateKind::BaseDenomination)
}

fn per_vbyte(rate: &str) -> FeeRate {
    FeeRate::new(rate, FeeRateKind::BasePerWeightUnit)
}

type MockWallet =
    UtxoWallet<MockProvider, MockResolver, MockValidator, MockSerializer, MockBroadcaster>;

/// Wallet over the given pool, with handles to the commit and broadcast
/// records.
fn wallet(
    utxos: Vec<Utxo>,
    rate: Option<FeeRate>,
    config: WalletConfig,
) -> (MockWallet, CommitLog, BroadcastLog) {
    let (provider, committed) = MockProvider::new(utxos);
    let (broadcaster, seen) = MockBroadcaster::new();
    let wallet = UtxoWallet::new(
        "wallet-addr",
        MockValidator,
        provider,
        MockResolver { rate },
        MockSerializer,
        broadcaster,
        config,
    );
    (wallet, committed, seen)
}

// -----------------------------------------------------------------------
// Payment creation
// -----------------------------------------------------------------------

/// The facade threads the snapshot through the builder and returns the
/// change to its own address.
#[tokio::test]
async fn test_create_payment_selects_and_funds_change() {
    let config = WalletConfig {
        target_utxo_pool_size: 1,
        ..WalletConfig::default()
    };
    let (wallet, _, _) = wallet(vec![confirmed(1, 150_000)], Some(flat_fee("2000")), config);

    let prepared = wallet
        .create_payment(&[DesiredOutput::new("recipient", "0.001")])
        .await
        .unwrap();

    assert_eq!(prepared.token, SnapshotToken(42), "token must ride along");
    let tx = &prepared.tx;
    assert_eq!(tx.fee_base, 2_000);
    assert_eq!(tx.outputs.len(), 2, "one recipient output plus one change");
    assert_eq!(tx.outputs[0].address, "recipient");
    assert_eq!(tx.outputs[0].value_base, 100_000);
    assert_eq!(tx.outputs[1].address, "wallet-addr", "change returns home");
    assert_eq!(tx.outputs[1].value_base, 48_000);
    assert_eq!(
        tx.change_address_if_single.as_deref(),
        Some("wallet-addr")
    );
}

/// The default pool target replenishes the wallet with several change
/// outputs after spending its only UTXO.
#[tokio::test]
async fn test_default_pool_target_spreads_change() {
    let (wallet, _, _) = wallet(
        vec![confirmed(1, 150_000)],
        Some(flat_fee("2000")),
        WalletConfig::default(),
    );

    let prepared = wallet
        .create_payment(&[DesiredOutput::new("recipient", "0.001")])
        .await
        .unwrap();

    let tx = &prepared.tx;
    let change: Vec<u64> = tx.change_outputs().map(|o| o.value_base).collect();
    assert_eq!(
        change,
        vec![1_548, 3_096, 6_193, 12_387, 24_774],
        "five weighted slots over 48000"
    );
    assert_eq!(tx.fee_base, 2_002, "loose remainder folds into the fee");
    assert_eq!(tx.input_total_base(), tx.output_total_base() + tx.fee_base);
    assert!(
        tx.change_address_if_single.is_none(),
        "multiple change outputs leave the single-address field empty"
    );
}

/// A failing resolver falls back to the configured rate instead of
/// failing the payment.
#[tokio::test]
async fn test_fee_resolver_failure_uses_fallback_rate() {
    let config = WalletConfig {
        fallback_fee_rate: flat_fee("2000"),
        target_utxo_pool_size: 1,
        ..WalletConfig::default()
    };
    let (wallet, _, _) = wallet(vec![confirmed(1, 150_000)], None, config);

    let prepared = wallet
        .create_payment(&[DesiredOutput::new("recipient", "0.001")])
        .await
        .unwrap();

    assert_eq!(prepared.tx.fee_base, 2_000, "fallback rate applied");
    assert_eq!(prepared.tx.outputs[1].value_base, 48_000);
}

/// A bad recipient surfaces as a validation error from the engine.
#[tokio::test]
async fn test_invalid_recipient_address_propagates() {
    let (wallet, _, _) = wallet(
        vec![confirmed(1, 150_000)],
        Some(flat_fee("2000")),
        WalletConfig::default(),
    );

    let err = wallet
        .create_payment(&[DesiredOutput::new("bad-recipient", "0.001")])
        .await
        .unwrap_err();

    match err {
        WalletError::Utxo(UtxoError::InvalidAddress { address }) => {
            assert_eq!(address, "bad-recipient");
        }
        other => panic!("expected invalid address, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Sweeping
// -----------------------------------------------------------------------

/// Sweep moves the whole confirmed balance, leaving unconfirmed outputs
/// untouched and no change behind.
#[tokio::test]
async fn test_sweep_spends_confirmed_balance() {
    let pool = vec![
        confirmed(1, 50_000),
        confirmed(2, 30_000),
        unconfirmed(3, 20_000),
    ];
    let (wallet, _, _) = wallet(pool, Some(per_vbyte("1")), WalletConfig::default());

    let prepared = wallet.sweep("destination").await.unwrap();

    let tx = &prepared.tx;
    assert_eq!(tx.inputs.len(), 2, "unconfirmed UTXO stays put");
    assert_eq!(tx.inputs[0].txid, Txid::new([1; 32]));
    assert_eq!(tx.inputs[1].txid, Txid::new([2; 32]));
    assert_eq!(tx.fee_base, 1_000, "relay floor beats the rate fee");
    assert_eq!(tx.outputs.len(), 1);
    assert_eq!(tx.outputs[0].address, "destination");
    assert_eq!(tx.outputs[0].value_base, 79_000, "80000 minus the fee");
    assert_eq!(tx.change_total_base, 0);
}

/// Enabling unconfirmed spending widens the sweep to the whole pool.
#[tokio::test]
async fn test_sweep_includes_unconfirmed_when_enabled() {
    let pool = vec![
        confirmed(1, 50_000),
        confirmed(2, 30_000),
        unconfirmed(3, 20_000),
    ];
    let config = WalletConfig {
        use_unconfirmed_utxos: true,
        ..WalletConfig::default()
    };
    let (wallet, _, _) = wallet(pool, Some(per_vbyte("1")), config);

    let prepared = wallet.sweep("destination").await.unwrap();

    assert_eq!(prepared.tx.inputs.len(), 3);
    assert_eq!(prepared.tx.outputs[0].value_base, 99_000);
    assert_eq!(prepared.tx.fee_base, 1_000);
}

/// Sweeping a wallet with nothing spendable fails up front instead of
/// asking the builder for a zero-value output.
#[tokio::test]
async fn test_sweep_of_empty_wallet_is_insufficient_funds() {
    let (wallet, _, _) = wallet(
        vec![unconfirmed(1, 20_000)],
        Some(per_vbyte("1")),
        WalletConfig::default(),
    );

    let err = wallet.sweep("destination").await.unwrap_err();

    match err {
        WalletError::Utxo(UtxoError::InsufficientFunds {
            available_base, ..
        }) => {
            assert_eq!(available_base, 0);
        }
        other => panic!("expected insufficient funds, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Broadcasting
// -----------------------------------------------------------------------

/// Broadcast serializes the payment, hands it to the network, and
/// commits the spent snapshot back to the provider.
#[tokio::test]
async fn test_broadcast_commits_spent_snapshot() {
    let config = WalletConfig {
        target_utxo_pool_size: 1,
        ..WalletConfig::default()
    };
    let (wallet, committed, seen) =
        wallet(vec![confirmed(1, 150_000)], Some(flat_fee("2000")), config);

    let prepared = wallet
        .create_payment(&[DesiredOutput::new("recipient", "0.001")])
        .await
        .unwrap();
    let success = wallet.broadcast_payment(&prepared).await.unwrap();

    assert_eq!(success.txid, "mock-txid");
    let payloads = seen.lock().unwrap();
    assert_eq!(payloads.len(), 1, "exactly one network submission");
    let decoded = MockSerializer.from_wire(&payloads[0]).unwrap();
    assert_eq!(decoded, prepared.tx, "the network sees the built payment");
    assert_eq!(
        *committed.lock().unwrap(),
        vec![(SnapshotToken(42), 1)],
        "the snapshot token and spent inputs reach the provider"
    );
}

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Defaults are conservative: confirmed-only spending at a normal fee
/// level with a one-unit-per-vbyte fallback.
#[test]
fn test_default_config_is_conservative() {
    let config = WalletConfig::default();
    assert_eq!(config.fee_level, FeeLevel::Normal);
    assert_eq!(config.target_utxo_pool_size, 5);
    assert!(!config.use_unconfirmed_utxos);
    assert_eq!(config.fallback_fee_rate, per_vbyte("1"));
    assert_eq!(config.chain.decimals, 8);
}

#[test]
fn test_config_json_roundtrip() {
    let config = WalletConfig {
        use_unconfirmed_utxos: true,
        ..WalletConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: WalletConfig = serde_json::from_str(&json).unwrap();
    assert!(back.use_unconfirmed_utxos);
    assert_eq!(back.target_utxo_pool_size, config.target_utxo_pool_size);
}
