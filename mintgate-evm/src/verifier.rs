//! On-chain payment verification against a transaction receipt.
//!
//! The verifier resolves the receipt for a claimed transaction hash and
//! scans its logs, in order, for an asset `Transfer` that pays the
//! treasury at least the configured minimum. Decoding is defensive: logs
//! emitted by other contracts and logs that do not match the `Transfer`
//! signature are skipped, never an error. A transaction with no receipt
//! yet is the common "not confirmed" case and scans as empty.

use std::time::Duration;

use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tokio::time::timeout;

use mintgate::error::ChainError;
use mintgate::payment::{
    PaymentVerifier, TransferEvent, Verification, VerifiedPayment, qualifying_transfer,
};

use crate::contract::Transfer;
use crate::error::unavailable;

/// Default deadline for a receipt lookup.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Verifies payments by scanning ERC-20 transfer logs of a receipt.
#[derive(Debug, Clone)]
pub struct EvmPaymentVerifier<P> {
    provider: P,
    asset: Address,
    treasury: Address,
    min_amount: U256,
    rpc_timeout: Duration,
}

impl<P: Provider> EvmPaymentVerifier<P> {
    /// Creates a verifier for transfers of `asset` into `treasury` worth
    /// at least `min_amount` base units.
    pub fn new(provider: P, asset: Address, treasury: Address, min_amount: U256) -> Self {
        Self {
            provider,
            asset,
            treasury,
            min_amount,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }

    /// Overrides the receipt-lookup deadline.
    #[must_use]
    pub const fn with_rpc_timeout(mut self, rpc_timeout: Duration) -> Self {
        self.rpc_timeout = rpc_timeout;
        self
    }

    /// Fetches the receipt for `tx_hash` and decodes its asset-transfer
    /// events, in receipt log order.
    ///
    /// A missing receipt yields an empty sequence: an unconfirmed
    /// transaction is not an error, it is simply no evidence yet.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when the RPC endpoint is unreachable or the
    /// lookup exceeds the configured deadline.
    pub async fn fetch_transfer_events(
        &self,
        tx_hash: TxHash,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        let lookup = self.provider.get_transaction_receipt(tx_hash);
        let receipt = timeout(self.rpc_timeout, lookup)
            .await
            .map_err(|_| ChainError::Timeout(self.rpc_timeout))?
            .map_err(unavailable)?;

        let Some(receipt) = receipt else {
            tracing::debug!(tx = %tx_hash, "no receipt found, treating as no qualifying transfer");
            return Ok(Vec::new());
        };

        Ok(decode_transfer_events(self.asset, receipt.inner.logs()))
    }
}

/// Decodes the `Transfer` events emitted by `asset`, skipping everything
/// else.
fn decode_transfer_events(asset: Address, logs: &[Log]) -> Vec<TransferEvent> {
    logs.iter()
        .filter(|log| log.address() == asset)
        .filter_map(|log| Transfer::decode_log(&log.inner).ok())
        .map(|event| TransferEvent {
            from: event.data.from,
            to: event.data.to,
            value: event.data.value,
        })
        .collect()
}

#[async_trait]
impl<P: Provider> PaymentVerifier for EvmPaymentVerifier<P> {
    async fn verify(&self, tx_hash: TxHash) -> Result<Verification, ChainError> {
        let events = self.fetch_transfer_events(tx_hash).await?;
        match qualifying_transfer(&events, self.treasury, self.min_amount) {
            Some(event) => Ok(Verification::Verified(VerifiedPayment {
                payer: event.from,
                amount: event.value,
            })),
            None => {
                tracing::debug!(
                    tx = %tx_hash,
                    scanned = events.len(),
                    "no qualifying transfer to the treasury"
                );
                Ok(Verification::NotVerified)
            }
        }
    }
}
