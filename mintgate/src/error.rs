//! Error taxonomy for the mint-gate workflow.
//!
//! The variants deliberately keep "payment genuinely absent"
//! ([`FulfillError::PaymentNotVerified`]) apart from "unable to obtain
//! evidence" ([`ChainError`]): the former is a terminal client error, the
//! latter is retryable and must never be reported as a payment failure.

use std::time::Duration;

/// Invalid or missing static configuration.
///
/// Fatal at startup or at challenge-build time; never silently defaulted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigurationError {
    /// The treasury (`payTo`) address is absent.
    #[error("payTo treasury address is not configured")]
    MissingPayTo,

    /// An address field does not parse as a 20-byte `0x` hex address.
    #[error("invalid {field} address: {value:?}")]
    InvalidAddress {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// The configured price does not convert to base units.
    #[error("invalid price amount {amount:?}: {reason}")]
    InvalidAmount {
        /// The rejected raw amount string.
        amount: String,
        /// Why the amount was rejected.
        reason: String,
    },
}

/// A required request field is missing or malformed.
///
/// Surfaced as HTTP 400; fully recoverable by the client resubmitting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    /// The notify body carried no `txHash`.
    #[error("Missing txHash")]
    MissingTxHash,

    /// The `txHash` is not a 32-byte hex hash.
    #[error("invalid txHash: {0:?}")]
    InvalidTxHash(String),

    /// The caller-supplied `paymentId` is not a 32-byte hex value.
    #[error("invalid paymentId: {0:?}")]
    InvalidPaymentId(String),
}

/// The chain could not be reached or answered too slowly.
///
/// Retryable by the caller; distinct from a payment that is genuinely
/// absent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// The RPC endpoint is unreachable or returned a transport error.
    #[error("chain RPC unavailable: {0}")]
    Unavailable(String),

    /// An RPC or settlement call exceeded the configured deadline.
    #[error("chain call timed out after {0:?}")]
    Timeout(Duration),
}

/// The external mint capability failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MintError {
    /// The contract refused the mint (revert, reused payment id).
    #[error("mint rejected: {0}")]
    Rejected(String),

    /// The mint chain was unreachable; the mint may be retried.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Terminal outcome of a failed notify request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FulfillError {
    /// The request body failed validation before any chain call.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The on-chain scan found no qualifying transfer.
    #[error("Payment not verified")]
    PaymentNotVerified,

    /// Verification could not obtain evidence from the chain.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The mint step failed after successful verification.
    #[error(transparent)]
    Mint(#[from] MintError),
}
