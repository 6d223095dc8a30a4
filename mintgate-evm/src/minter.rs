//! The external mint capability: a single-attempt contract call.
//!
//! One successful [`EvmMinter::mint`] produces exactly one on-chain mint
//! transaction, and the confirmation is awaited before returning so the
//! HTTP caller receives a final outcome rather than an optimistic
//! acknowledgment. There is no retry loop; a failed attempt is terminal
//! for its request. The contract enforces "no second mint for the same
//! payment id" by reverting, which surfaces here as a rejection.

use std::fmt;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use async_trait::async_trait;
use tokio::time::timeout;

use mintgate::error::{ChainError, MintError};
use mintgate::payment::{MintOutcome, Minter};
use mintgate::payment_id::PaymentId;

use crate::contract::IPaidMint;
use crate::error::classify_send_error;

/// Default deadline covering the send and the confirmation wait, each.
pub const DEFAULT_MINT_TIMEOUT: Duration = Duration::from_secs(90);

/// Mints through the NFT contract's `mintAfterPayment` entry point.
///
/// The provider must carry the owner signer; the contract restricts this
/// entry point to the collection owner.
pub struct EvmMinter<P> {
    contract: IPaidMint::IPaidMintInstance<P>,
    mint_timeout: Duration,
}

impl<P: Provider> fmt::Debug for EvmMinter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmMinter")
            .field("contract", self.contract.address())
            .field("mint_timeout", &self.mint_timeout)
            .finish_non_exhaustive()
    }
}

impl<P: Provider> EvmMinter<P> {
    /// Creates a minter bound to the NFT contract at `contract`.
    pub fn new(provider: P, contract: Address) -> Self {
        Self {
            contract: IPaidMint::new(contract, provider),
            mint_timeout: DEFAULT_MINT_TIMEOUT,
        }
    }

    /// Overrides the per-step settlement deadline.
    #[must_use]
    pub const fn with_mint_timeout(mut self, mint_timeout: Duration) -> Self {
        self.mint_timeout = mint_timeout;
        self
    }
}

#[async_trait]
impl<P: Provider> Minter for EvmMinter<P> {
    async fn mint(
        &self,
        to: Address,
        qty: u64,
        payment_id: PaymentId,
    ) -> Result<MintOutcome, MintError> {
        let call = self
            .contract
            .mintAfterPayment(to, U256::from(qty), payment_id.as_bytes());

        let pending = timeout(self.mint_timeout, call.send())
            .await
            .map_err(|_| ChainError::Timeout(self.mint_timeout))?
            .map_err(classify_send_error)?;

        let mint_tx = *pending.tx_hash();
        tracing::info!(tx = %mint_tx, to = %to, qty, "mint transaction sent, awaiting confirmation");

        let receipt = timeout(self.mint_timeout, pending.get_receipt())
            .await
            .map_err(|_| ChainError::Timeout(self.mint_timeout))?
            .map_err(|err| MintError::Chain(ChainError::Unavailable(err.to_string())))?;

        if receipt.status() {
            Ok(MintOutcome {
                to,
                qty,
                tx_hash: receipt.transaction_hash,
            })
        } else {
            Err(MintError::Rejected(format!(
                "mint transaction {:#x} reverted",
                receipt.transaction_hash
            )))
        }
    }
}
