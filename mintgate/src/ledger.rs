//! In-process fulfillment ledger keyed by payment id.
//!
//! The mint contract is the durable enforcer of "one mint per payment id";
//! this ledger is the in-process first line. A request must atomically
//! claim the id before calling the mint capability, so two concurrent
//! notifies for the same payment race on a map entry instead of both
//! reaching the chain, and a retry of an already-fulfilled payment gets
//! the recorded outcome back without a second mint attempt.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::payment::MintOutcome;
use crate::payment_id::PaymentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fulfillment {
    Pending,
    Confirmed(MintOutcome),
}

/// Outcome of attempting to claim a payment id for fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The id was unclaimed; the caller now owns the mint attempt.
    Acquired,
    /// Another request is currently minting for this id.
    InFlight,
    /// The id was already fulfilled; the recorded outcome is returned.
    Fulfilled(MintOutcome),
}

/// Concurrent map of payment id to fulfillment state.
#[derive(Debug, Default)]
pub struct FulfillmentLedger {
    entries: DashMap<PaymentId, Fulfillment>,
}

impl FulfillmentLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `id` for a mint attempt.
    ///
    /// Exactly one caller per id observes [`Claim::Acquired`] until the
    /// claim is confirmed or released.
    pub fn claim(&self, id: PaymentId) -> Claim {
        match self.entries.entry(id) {
            Entry::Occupied(occupied) => match *occupied.get() {
                Fulfillment::Pending => Claim::InFlight,
                Fulfillment::Confirmed(outcome) => Claim::Fulfilled(outcome),
            },
            Entry::Vacant(vacant) => {
                vacant.insert(Fulfillment::Pending);
                Claim::Acquired
            }
        }
    }

    /// Records the confirmed outcome for a claimed id.
    pub fn confirm(&self, id: PaymentId, outcome: MintOutcome) {
        self.entries.insert(id, Fulfillment::Confirmed(outcome));
    }

    /// Releases a pending claim after a failed mint so the client may
    /// retry. A confirmed entry is never released.
    pub fn release(&self, id: PaymentId) {
        self.entries
            .remove_if(&id, |_, state| matches!(state, Fulfillment::Pending));
    }
}
