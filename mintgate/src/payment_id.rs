//! Deterministic anti-replay payment identifier.
//!
//! A [`PaymentId`] binds one payment transaction to one resource: it is the
//! keccak-256 digest of the UTF-8 string `"{resource}:{tx_hash}"`. The same
//! id is handed to the mint contract, whose own replay check shares this
//! key space.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{B256, TxHash, keccak256};

use crate::error::ValidationError;

/// A 256-bit identifier binding a transaction hash to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentId(B256);

impl PaymentId {
    /// Derives the id for a `(resource, tx_hash)` pair.
    ///
    /// Deterministic: identical inputs always produce the identical id; the
    /// transaction hash is rendered in lowercase `0x` hex form before
    /// hashing so the textual casing of client input cannot change the id.
    #[must_use]
    pub fn derive(resource: &str, tx_hash: TxHash) -> Self {
        let preimage = format!("{resource}:{tx_hash:#x}");
        Self(keccak256(preimage.as_bytes()))
    }

    /// The raw 32-byte digest, as passed to the mint contract.
    #[must_use]
    pub const fn as_bytes(&self) -> B256 {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for PaymentId {
    type Err = ValidationError;

    /// Parses a caller-supplied id. The override path deliberately bypasses
    /// the resource/txHash binding, so at least the shape is enforced: a
    /// 32-byte hex value, with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Self)
            .map_err(|_| ValidationError::InvalidPaymentId(s.to_owned()))
    }
}
