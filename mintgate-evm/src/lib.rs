#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM chain collaborators for the x402 mint gate.
//!
//! Implements the two chain-facing seams of the core workflow on top of
//! `alloy`:
//!
//! - [`verifier::EvmPaymentVerifier`] resolves a transaction receipt over
//!   JSON-RPC, decodes the asset's ERC-20 `Transfer` logs, and decides
//!   whether a qualifying payment to the treasury occurred.
//! - [`minter::EvmMinter`] invokes the NFT contract's
//!   `mintAfterPayment(to, qty, paymentId)` with the process signer and
//!   awaits the on-chain confirmation.
//!
//! Both collaborators take an explicitly constructed provider; nothing is
//! reached through ambient state, so tests substitute a mock RPC endpoint.

pub mod contract;
pub mod minter;
pub mod verifier;

mod error;

pub use minter::EvmMinter;
pub use verifier::EvmPaymentVerifier;
