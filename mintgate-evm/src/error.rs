//! Classification of alloy errors into the core taxonomy.
//!
//! A JSON-RPC error response means the chain answered and refused (a
//! revert, a reused payment id); anything else on the transport path means
//! the chain could not be queried at all. The two must map to different
//! variants so an outage never reads as a rejection, and vice versa.

use alloy_transport::{RpcError, TransportError};
use mintgate::error::{ChainError, MintError};

/// Maps a read-path transport failure to [`ChainError::Unavailable`].
pub(crate) fn unavailable(err: TransportError) -> ChainError {
    ChainError::Unavailable(err.to_string())
}

/// Classifies a failed `send` of the mint transaction.
///
/// An error response from the node (execution revert, rejected by the
/// contract during gas estimation) is a [`MintError::Rejected`]; transport
/// failures stay retryable as [`MintError::Chain`].
pub(crate) fn classify_send_error(err: alloy_contract::Error) -> MintError {
    match err {
        alloy_contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            MintError::Rejected(payload.to_string())
        }
        alloy_contract::Error::TransportError(transport) => {
            MintError::Chain(ChainError::Unavailable(transport.to_string()))
        }
        other => MintError::Rejected(other.to_string()),
    }
}
