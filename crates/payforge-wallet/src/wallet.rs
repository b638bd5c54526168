//! The wallet facade over one spendable address.

use serde::{Deserialize, Serialize};

use payforge_primitives::amount::format_base_amount;
use payforge_utxo::fee::{FeeRate, FeeRateKind};
use payforge_utxo::{
    AddressValidator, ChainParams, DesiredOutput, PaymentRequest, PaymentTx, TransactionBuilder,
    UtxoError,
};

use crate::providers::{
    BroadcastSuccess, Broadcaster, FeeLevel, FeeRateResolver, SnapshotToken, UtxoProvider,
    WireSerializer,
};
use crate::WalletError;

/// Configuration for a [`UtxoWallet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Chain parameters driving fee, dust, and change decisions.
    pub chain: ChainParams,
    /// Urgency requested from the fee resolver.
    pub fee_level: FeeLevel,
    /// Rate applied when the resolver is unavailable.
    pub fallback_fee_rate: FeeRate,
    /// Desired number of UTXOs kept spendable for this address.
    pub target_utxo_pool_size: usize,
    /// Spend unconfirmed outputs.
    pub use_unconfirmed_utxos: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            chain: ChainParams::default(),
            fee_level: FeeLevel::Normal,
            fallback_fee_rate: FeeRate::new("1", FeeRateKind::BasePerWeightUnit),
            target_utxo_pool_size: 5,
            use_unconfirmed_utxos: false,
        }
    }
}

/// A built payment still tied to the snapshot it was planned against.
///
/// The token travels with the payment so the provider can invalidate
/// the snapshot once the payment is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedPayment {
    /// The balanced unsigned payment.
    pub tx: PaymentTx,
    /// Snapshot the inputs were selected from.
    pub token: SnapshotToken,
}

/// The create/broadcast interface shared by every chain backend.
pub trait PaymentService {
    /// Plan a payment to the given outputs.
    fn create_payment(
        &self,
        outputs: &[DesiredOutput],
    ) -> impl std::future::Future<Output = Result<PreparedPayment, WalletError>> + Send;

    /// Plan a payment sending the entire spendable balance to one
    /// address.
    fn sweep(
        &self,
        to_address: &str,
    ) -> impl std::future::Future<Output = Result<PreparedPayment, WalletError>> + Send;

    /// Encode, broadcast, and commit a prepared payment.
    fn broadcast_payment(
        &self,
        prepared: &PreparedPayment,
    ) -> impl std::future::Future<Output = Result<BroadcastSuccess, WalletError>> + Send;
}

/// Payment service for one UTXO-chain address.
///
/// Holds no mutable state; every operation re-observes the provider
/// and plans against that snapshot, so the wallet value can be shared
/// freely across tasks.
#[derive(Debug, Clone)]
pub struct UtxoWallet<P, R, V, W, B> {
    address: String,
    provider: P,
    fee_resolver: R,
    builder: TransactionBuilder<V>,
    serializer: W,
    broadcaster: B,
    config: WalletConfig,
}

impl<P, R, V, W, B> UtxoWallet<P, R, V, W, B>
where
    P: UtxoProvider + Sync,
    R: FeeRateResolver + Sync,
    V: AddressValidator + Sync,
    W: WireSerializer + Sync,
    B: Broadcaster + Sync,
{
    /// Create a wallet over `address` with the given collaborators.
    pub fn new(
        address: &str,
        validator: V,
        provider: P,
        fee_resolver: R,
        serializer: W,
        broadcaster: B,
        config: WalletConfig,
    ) -> UtxoWallet<P, R, V, W, B> {
        let builder = TransactionBuilder::new(validator, config.chain.clone());
        UtxoWallet {
            address: address.to_string(),
            provider,
            fee_resolver,
            builder,
            serializer,
            broadcaster,
            config,
        }
    }

    /// The address this wallet spends from and sends change to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The active configuration.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Ask the resolver for a rate, falling back to the configured one.
    async fn resolved_fee_rate(&self) -> FeeRate {
        match self.fee_resolver.recommend(self.config.fee_level).await {
            Ok(rate) => rate,
            Err(e) => {
                log::warn!("fee resolver unavailable, using fallback rate: {}", e);
                self.config.fallback_fee_rate.clone()
            }
        }
    }
}

impl<P, R, V, W, B> PaymentService for UtxoWallet<P, R, V, W, B>
where
    P: UtxoProvider + Sync,
    R: FeeRateResolver + Sync,
    V: AddressValidator + Sync,
    W: WireSerializer + Sync,
    B: Broadcaster + Sync,
{
    async fn create_payment(
        &self,
        outputs: &[DesiredOutput],
    ) -> Result<PreparedPayment, WalletError> {
        let snapshot = self.provider.snapshot(&self.address).await?;
        let request = PaymentRequest {
            outputs: outputs.to_vec(),
            change_address: self.address.clone(),
            fee_rate: self.resolved_fee_rate().await,
            use_all_utxos: false,
            use_unconfirmed_utxos: self.config.use_unconfirmed_utxos,
            target_utxo_pool_size: self.config.target_utxo_pool_size,
        };
        let tx = self.builder.build(&snapshot.utxos, &request).await?;
        Ok(PreparedPayment {
            tx,
            token: snapshot.token,
        })
    }

    async fn sweep(&self, to_address: &str) -> Result<PreparedPayment, WalletError> {
        let snapshot = self.provider.snapshot(&self.address).await?;
        // The swept amount is the spendable subset the builder will
        // see, not the raw snapshot total.
        let spendable: u64 = snapshot
            .utxos
            .iter()
            .filter(|u| self.config.use_unconfirmed_utxos || u.is_confirmed())
            .map(|u| u.value_base)
            .sum();
        if spendable == 0 {
            return Err(UtxoError::InsufficientFunds {
                available_base: 0,
                output_total_base: 0,
                fee_base: 0,
            }
            .into());
        }
        let request = PaymentRequest {
            outputs: vec![DesiredOutput::new(
                to_address,
                format_base_amount(spendable, self.config.chain.decimals),
            )],
            change_address: self.address.clone(),
            fee_rate: self.resolved_fee_rate().await,
            use_all_utxos: true,
            use_unconfirmed_utxos: self.config.use_unconfirmed_utxos,
            target_utxo_pool_size: 0,
        };
        let tx = self.builder.build(&snapshot.utxos, &request).await?;
        Ok(PreparedPayment {
            tx,
            token: snapshot.token,
        })
    }

    async fn broadcast_payment(
        &self,
        prepared: &PreparedPayment,
    ) -> Result<BroadcastSuccess, WalletError> {
        let raw = self.serializer.to_wire(&prepared.tx)?;
        let success = self.broadcaster.broadcast(&raw).await?;
        self.provider
            .commit(prepared.token, &prepared.tx.inputs)
            .await?;
        log::info!(
            "broadcast {} spending {} inputs",
            success.txid,
            prepared.tx.inputs.len()
        );
        Ok(success)
    }
}
