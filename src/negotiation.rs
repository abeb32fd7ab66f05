// ABOUTME: Negotiation state machine validating and applying booking transitions
// ABOUTME: Every legal transition lands as one conditional store write plus one ledger entry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! # Negotiation State Machine
//!
//! Validates a single `(current state, action, actor)` tuple and applies it
//! as one atomic store write: status change, money-field change, and ledger
//! append succeed together or not at all. An illegal tuple is rejected with
//! `InvalidTransition` before anything is written.
//!
//! Transition table (initial `pending`; terminal `rejected`,
//! `payment_confirmed`):
//!
//! | from              | action           | actor | to                |
//! |-------------------|------------------|-------|-------------------|
//! | `pending`         | `propose_cost`   | admin | `counter_proposed`|
//! | `counter_proposed`| `accept`         | client| `accepted`        |
//! | `counter_proposed`| `counter`        | client| `counter_proposed`|
//! | `counter_proposed`| `cancel`         | client| `rejected`        |
//! | `counter_proposed`| `accept_counter` | admin | `accepted`        |
//! | any unsettled     | `mark_pending`   | admin | `pending`         |
//!
//! `accepted` leaves the table only through the payment reconciler.

use crate::errors::{AppError, AppResult};
use crate::models::{validate_amount, Actor, Booking, BookingStatus, LedgerEntry, NegotiationAction};
use crate::store::{BookingStore, TransitionChanges};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a successfully applied transition
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The booking after the transition
    pub booking: Booking,
    /// True when this call moved the booking into `accepted`, which is the
    /// cue to issue a payment link
    pub newly_accepted: bool,
}

/// Client's answer to an operator cost proposal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientResponse {
    Accept,
    Counter(f64),
    Cancel,
}

/// Validates and applies negotiation transitions
pub struct NegotiationStateMachine {
    store: Arc<dyn BookingStore>,
}

impl NegotiationStateMachine {
    /// Create a state machine over the given store
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Operator proposes a cost for a `pending` booking
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn propose_cost(
        &self,
        id: &str,
        amount: f64,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        let amount = validate_amount(amount)?;
        let booking = self.fetch(id).await?;

        if booking.status != BookingStatus::Pending {
            return Err(Self::illegal(&booking, "propose_cost", Actor::Admin));
        }

        let changes = TransitionChanges {
            status: Some(BookingStatus::CounterProposed),
            proposed_cost: Some(amount),
            ..TransitionChanges::default()
        };
        let entry = LedgerEntry::now(
            Actor::Admin,
            NegotiationAction::ProposeCost { amount, notes },
        );
        self.commit(id, booking.status, &changes, entry, false).await
    }

    /// Client accepts, counters, or cancels an open proposal
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn client_respond(
        &self,
        id: &str,
        response: ClientResponse,
    ) -> AppResult<TransitionOutcome> {
        if let ClientResponse::Counter(amount) = response {
            validate_amount(amount)?;
        }
        let booking = self.fetch(id).await?;

        // Double-submit of accept against an already accepted booking is an
        // idempotent no-op: nothing changes, so no ledger entry either.
        if response == ClientResponse::Accept && booking.status == BookingStatus::Accepted {
            return Ok(TransitionOutcome {
                booking,
                newly_accepted: false,
            });
        }

        if booking.status != BookingStatus::CounterProposed {
            let action = match response {
                ClientResponse::Accept => "accept",
                ClientResponse::Counter(_) => "counter",
                ClientResponse::Cancel => "cancel",
            };
            return Err(Self::illegal(&booking, action, Actor::Client));
        }

        let (changes, entry, newly_accepted) = match response {
            ClientResponse::Accept => (
                TransitionChanges {
                    status: Some(BookingStatus::Accepted),
                    clear_counter_offer: true,
                    ..TransitionChanges::default()
                },
                LedgerEntry::now(Actor::Client, NegotiationAction::Accept),
                true,
            ),
            ClientResponse::Counter(amount) => (
                // Self-loop: status stays counter_proposed, only the counter
                // field and the ledger move.
                TransitionChanges {
                    client_counter_offer: Some(amount),
                    ..TransitionChanges::default()
                },
                LedgerEntry::now(Actor::Client, NegotiationAction::CounterOffer { amount }),
                false,
            ),
            ClientResponse::Cancel => (
                TransitionChanges {
                    status: Some(BookingStatus::Rejected),
                    ..TransitionChanges::default()
                },
                LedgerEntry::now(Actor::Client, NegotiationAction::Cancel),
                false,
            ),
        };
        self.commit(id, booking.status, &changes, entry, newly_accepted)
            .await
    }

    /// Operator adopts the client's counter offer as the agreed cost
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn accept_counter(&self, id: &str) -> AppResult<TransitionOutcome> {
        let booking = self.fetch(id).await?;

        if booking.status != BookingStatus::CounterProposed {
            return Err(Self::illegal(&booking, "accept_counter", Actor::Admin));
        }
        let Some(counter) = booking.client_counter_offer else {
            return Err(AppError::invalid_transition(
                "no client counter offer to accept",
            ));
        };

        let changes = TransitionChanges {
            status: Some(BookingStatus::Accepted),
            proposed_cost: Some(counter),
            clear_counter_offer: true,
            ..TransitionChanges::default()
        };
        let entry = LedgerEntry::now(Actor::Admin, NegotiationAction::Accept);
        self.commit(id, booking.status, &changes, entry, true).await
    }

    /// Administrative override: reset the booking to `pending`.
    ///
    /// Legal from any state except a settled booking; a paid booking must
    /// keep `payment_confirmed` status.
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn mark_pending(&self, id: &str) -> AppResult<TransitionOutcome> {
        let booking = self.fetch(id).await?;

        if booking.is_paid() {
            return Err(Self::illegal(&booking, "mark_pending", Actor::Admin));
        }

        let changes = TransitionChanges {
            status: Some(BookingStatus::Pending),
            ..TransitionChanges::default()
        };
        let entry = LedgerEntry::now(Actor::Admin, NegotiationAction::MarkPending);
        self.commit(id, booking.status, &changes, entry, false).await
    }

    async fn fetch(&self, id: &str) -> AppResult<Booking> {
        self.store
            .get_booking(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))
    }

    /// Apply the transition conditionally on the status observed above. A
    /// status that changed underneath us means the request raced another
    /// actor and is stale; it is rejected without any observable change.
    async fn commit(
        &self,
        id: &str,
        expected: BookingStatus,
        changes: &TransitionChanges,
        entry: LedgerEntry,
        newly_accepted: bool,
    ) -> AppResult<TransitionOutcome> {
        let applied = self
            .store
            .apply_transition(id, expected, changes, entry)
            .await?;
        if !applied {
            return Err(AppError::invalid_transition(
                "booking state changed concurrently; re-read and retry",
            )
            .with_resource_id(id));
        }

        let booking = self.fetch(id).await?;
        info!(
            booking_id = %id,
            status = ?booking.status,
            history_len = booking.negotiation_history.len(),
            "negotiation transition applied"
        );
        Ok(TransitionOutcome {
            booking,
            newly_accepted,
        })
    }

    fn illegal(booking: &Booking, action: &str, actor: Actor) -> AppError {
        AppError::invalid_transition(format!(
            "{actor} cannot {action} a booking in state {:?}",
            booking.status
        ))
        .with_resource_id(booking.id.clone())
    }
}
