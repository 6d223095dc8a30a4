//! Solidity interface definitions for on-chain interactions.
//!
//! Contains the minimal ABI surface needed by the gate:
//! - [`Transfer`] — the ERC-20 transfer event scanned during payment
//!   verification
//! - [`IPaidMint`] — the NFT contract's payment-bound mint entry point

use alloy_sol_types::sol;

sol! {
    /// ERC-20 `Transfer` event.
    ///
    /// Reference: <https://eips.ethereum.org/EIPS/eip-20>
    #[derive(Debug)]
    event Transfer(address indexed from, address indexed to, uint256 value);
}

sol! {
    /// Payment-bound mint interface of the NFT contract.
    ///
    /// `paymentId` is the contract's replay key: a second call with the
    /// same id reverts, which is the durable backstop behind the gate's
    /// in-process ledger.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IPaidMint {
        function mintAfterPayment(address to, uint256 qty, bytes32 paymentId) external;
    }
}
