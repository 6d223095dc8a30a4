//! Notify-flow coordination: validate, verify, claim, mint, confirm.
//!
//! [`MintGate`] is the single entry point behind the notify endpoint. Per
//! request the flow is strictly sequential: the payment proof is verified
//! before the payment id is claimed, and the id is claimed before the mint
//! capability is invoked. There is no cross-request ordering; concurrent
//! requests for the same payment are serialized by the
//! [`FulfillmentLedger`] claim.

use std::fmt;

use alloy_primitives::{Address, TxHash};
use serde::Deserialize;

use crate::error::{FulfillError, MintError, ValidationError};
use crate::ledger::{Claim, FulfillmentLedger};
use crate::payment::{MintOutcome, Minter, PaymentVerifier, Verification};
use crate::payment_id::PaymentId;

/// Tokens minted per verified payment.
pub const MINT_QTY: u64 = 1;

/// Resource identifier bound into derived payment ids when neither the
/// deployment nor the caller names one.
pub const DEFAULT_RESOURCE: &str = "mint:nft:1";

/// The notify request body.
///
/// Only `txHash` is required. `payer` is advisory (the on-chain sender is
/// authoritative), `paymentId` overrides the derived id, and `resource`
/// overrides the gate's default resource in the derivation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    /// Hash of the payment transaction.
    #[serde(default)]
    pub tx_hash: Option<String>,
    /// Caller-claimed payer address, advisory only.
    #[serde(default)]
    pub payer: Option<String>,
    /// Explicit payment id, overriding the derived one.
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Resource identifier used in payment-id derivation.
    #[serde(default)]
    pub resource: Option<String>,
}

/// Coordinates payment verification and mint authorization.
pub struct MintGate {
    verifier: Box<dyn PaymentVerifier>,
    minter: Box<dyn Minter>,
    ledger: FulfillmentLedger,
    resource: String,
}

impl fmt::Debug for MintGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintGate")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl MintGate {
    /// Creates a gate over a verifier and a mint capability.
    ///
    /// `resource` is the identifier bound into derived payment ids when
    /// the caller does not name one.
    pub fn new(
        verifier: Box<dyn PaymentVerifier>,
        minter: Box<dyn Minter>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            minter,
            ledger: FulfillmentLedger::new(),
            resource: resource.into(),
        }
    }

    /// Runs the full notify flow for one request.
    ///
    /// Terminal on the first applicable branch: request validation, then
    /// on-chain verification, then the ledger claim, then the mint call.
    /// A payment that was already fulfilled returns its recorded outcome
    /// without a second mint.
    ///
    /// # Errors
    ///
    /// - [`FulfillError::Validation`] for a missing or malformed field,
    ///   before any chain call is made.
    /// - [`FulfillError::PaymentNotVerified`] when no qualifying transfer
    ///   exists.
    /// - [`FulfillError::Chain`] when the chain cannot be queried
    ///   (retryable, never conflated with an absent payment).
    /// - [`FulfillError::Mint`] when the mint capability refuses or fails.
    pub async fn fulfill(&self, request: &NotifyRequest) -> Result<MintOutcome, FulfillError> {
        let tx_hash = parse_tx_hash(request)?;
        let payment_id = self.resolve_payment_id(request, tx_hash)?;

        let payment = match self.verifier.verify(tx_hash).await? {
            Verification::Verified(payment) => payment,
            Verification::NotVerified => return Err(FulfillError::PaymentNotVerified),
        };
        warn_on_payer_mismatch(request.payer.as_deref(), payment.payer);

        match self.ledger.claim(payment_id) {
            Claim::Fulfilled(outcome) => {
                tracing::info!(
                    payment_id = %payment_id,
                    mint_tx = %outcome.tx_hash,
                    "payment already fulfilled, returning recorded outcome"
                );
                return Ok(outcome);
            }
            Claim::InFlight => {
                return Err(MintError::Rejected(format!(
                    "mint already in progress for payment {payment_id}"
                ))
                .into());
            }
            Claim::Acquired => {}
        }

        tracing::info!(
            payer = %payment.payer,
            amount = %payment.amount,
            payment_id = %payment_id,
            "payment verified, minting"
        );

        match self.minter.mint(payment.payer, MINT_QTY, payment_id).await {
            Ok(outcome) => {
                self.ledger.confirm(payment_id, outcome);
                tracing::info!(to = %outcome.to, mint_tx = %outcome.tx_hash, "mint confirmed");
                Ok(outcome)
            }
            Err(err) => {
                self.ledger.release(payment_id);
                Err(err.into())
            }
        }
    }

    /// Uses the caller-supplied id verbatim when present, otherwise derives
    /// one from the resource and transaction hash.
    fn resolve_payment_id(
        &self,
        request: &NotifyRequest,
        tx_hash: TxHash,
    ) -> Result<PaymentId, ValidationError> {
        if let Some(raw) = non_empty(request.payment_id.as_deref()) {
            return raw.parse();
        }
        let resource = non_empty(request.resource.as_deref()).unwrap_or(&self.resource);
        Ok(PaymentId::derive(resource, tx_hash))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_tx_hash(request: &NotifyRequest) -> Result<TxHash, ValidationError> {
    let raw = non_empty(request.tx_hash.as_deref()).ok_or(ValidationError::MissingTxHash)?;
    raw.parse()
        .map_err(|_| ValidationError::InvalidTxHash(raw.to_owned()))
}

/// The on-chain sender is authoritative; a differing caller claim is only
/// worth a warning.
fn warn_on_payer_mismatch(claimed: Option<&str>, verified: Address) {
    let Some(raw) = non_empty(claimed) else {
        return;
    };
    match raw.parse::<Address>() {
        Ok(address) if address == verified => {}
        Ok(address) => tracing::warn!(
            claimed = %address,
            verified = %verified,
            "caller-supplied payer differs from on-chain sender, using on-chain sender"
        ),
        Err(_) => tracing::warn!(claimed = raw, "ignoring malformed caller-supplied payer"),
    }
}
