#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types and workflow for the x402-gated NFT mint service.
//!
//! This crate implements the payment-to-mint workflow behind an HTTP 402
//! paywall: a client receives a payment challenge, pays the treasury
//! on-chain, then presents the transaction hash as proof of payment. The
//! crate verifies that proof independently and authorizes exactly one mint
//! per verified payment. It is chain-agnostic apart from the
//! `alloy-primitives` value types; the actual chain collaborators live in
//! separate crates and plug in through the [`payment::PaymentVerifier`] and
//! [`payment::Minter`] traits.
//!
//! # Modules
//!
//! - [`challenge`] - 402 payment-challenge body construction
//! - [`error`] - Error taxonomy for the whole workflow
//! - [`gate`] - The notify-flow coordinator ([`gate::MintGate`])
//! - [`ledger`] - In-process fulfillment ledger keyed by payment id
//! - [`payment`] - Verification and mint value types and collaborator traits
//! - [`payment_id`] - Deterministic anti-replay payment identifier
//! - [`units`] - Decimal amount to base-unit conversion

pub mod challenge;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod payment;
pub mod payment_id;
pub mod units;

pub use challenge::{ChallengeConfig, ChallengeVariant, PaymentRequired, PaymentTerms};
pub use error::{ChainError, ConfigurationError, FulfillError, MintError, ValidationError};
pub use gate::{MintGate, NotifyRequest};
pub use ledger::FulfillmentLedger;
pub use payment::{MintOutcome, Minter, PaymentVerifier, TransferEvent, Verification, VerifiedPayment};
pub use payment_id::PaymentId;
