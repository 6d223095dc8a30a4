//! Payment verification and mint value types, plus the collaborator traits
//! the coordinator is generic over.
//!
//! The traits are object-safe seams: the HTTP layer holds a
//! `Box<dyn PaymentVerifier>` and a `Box<dyn Minter>`, so tests substitute
//! doubles without touching a chain.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::error::{ChainError, MintError};
use crate::payment_id::PaymentId;

/// A decoded on-chain value-transfer record, in the asset's base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEvent {
    /// Sender of the transfer.
    pub from: Address,
    /// Recipient of the transfer.
    pub to: Address,
    /// Transferred amount in the asset's smallest unit.
    pub value: U256,
}

/// A payment that passed on-chain verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedPayment {
    /// The on-chain sender of the qualifying transfer. Authoritative over
    /// any caller-claimed identity.
    pub payer: Address,
    /// The transferred amount in base units.
    pub amount: U256,
}

/// Tagged outcome of a payment verification.
///
/// Transport failures are carried separately as [`ChainError`] so an outage
/// can never masquerade as an absent payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// A qualifying transfer was found.
    Verified(VerifiedPayment),
    /// The transaction exists (or is unconfirmed) but carries no qualifying
    /// transfer.
    NotVerified,
}

impl Verification {
    /// Whether a qualifying transfer was found.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Returns the first event in log order that pays `treasury` at least
/// `min_amount`.
///
/// Scanning in receipt log order and taking the first match is the fixed
/// tie-break when several events qualify.
#[must_use]
pub fn qualifying_transfer(
    events: &[TransferEvent],
    treasury: Address,
    min_amount: U256,
) -> Option<&TransferEvent> {
    events
        .iter()
        .find(|event| event.to == treasury && event.value >= min_amount)
}

/// Result of one successfully authorized mint. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintOutcome {
    /// Recipient of the minted token.
    pub to: Address,
    /// Number of tokens minted.
    pub qty: u64,
    /// Hash of the confirmed mint transaction.
    pub tx_hash: TxHash,
}

/// Verifies that a claimed transaction hash pays the configured treasury.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Resolves the transaction's receipt and scans its logs for a
    /// qualifying transfer.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when the chain cannot be queried; an absent
    /// or insufficient payment is `Ok(Verification::NotVerified)`, not an
    /// error.
    async fn verify(&self, tx_hash: TxHash) -> Result<Verification, ChainError>;
}

/// The external mint capability.
///
/// One successful call produces exactly one on-chain mint transaction. The
/// capability itself rejects a reused payment id, which is the durable
/// backstop of the in-process ledger.
#[async_trait]
pub trait Minter: Send + Sync {
    /// Mints `qty` tokens to `to`, bound to `payment_id`, and awaits the
    /// on-chain confirmation before returning.
    ///
    /// # Errors
    ///
    /// Returns [`MintError::Rejected`] when the contract refuses the mint
    /// and [`MintError::Chain`] when the chain is unreachable.
    async fn mint(
        &self,
        to: Address,
        qty: u64,
        payment_id: PaymentId,
    ) -> Result<MintOutcome, MintError>;
}
