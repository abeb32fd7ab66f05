// ABOUTME: Storage abstraction for bookings, transactions, and calendar events
// ABOUTME: Conditional-update contract that makes at-most-once settlement possible
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! # Booking Store
//!
//! The store is the single source of truth for booking state. The engine may
//! run in several processes at once, so correctness cannot rely on in-process
//! locking; every cross-field mutation goes through a conditional update
//! keyed on the expected prior value. The engine never reads a guarded field
//! and then writes it unconditionally.

use crate::models::{
    Booking, BookingStatus, CalendarEvent, LedgerEntry, PaymentLink, Transaction,
};
use anyhow::Result;
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryBookingStore;

/// Field mutations applied together with a status transition.
///
/// `Some` sets the field; clearing is explicit so a transition can both set
/// and clear money fields in the same atomic write.
#[derive(Debug, Clone, Default)]
pub struct TransitionChanges {
    /// New booking status
    pub status: Option<BookingStatus>,
    /// Set the operator's proposed cost
    pub proposed_cost: Option<f64>,
    /// Set the client's counter offer
    pub client_counter_offer: Option<f64>,
    /// Clear the client's counter offer
    pub clear_counter_offer: bool,
}

/// Filter for booking listings
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingFilter {
    /// Include settled (archived) bookings in the result
    pub include_archived: bool,
    /// Restrict to a single status
    pub status: Option<BookingStatus>,
}

/// Result of the guarded settlement write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// This caller won the conditional write and must run the settlement bundle
    Won,
    /// Payment was already settled; duplicate delivery, no further effect
    AlreadyPaid,
    /// No booking with this id
    NotFound,
}

/// Storage collaborator contract.
///
/// All implementations must make [`apply_transition`](BookingStore::apply_transition)
/// and [`conditional_settle`](BookingStore::conditional_settle) atomic with
/// respect to concurrent callers: compare and mutate must happen under a
/// single lock or conditional statement, never as separate read and write.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a freshly submitted booking
    async fn create_booking(&self, booking: &Booking) -> Result<()>;

    /// Fetch a booking by id
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>>;

    /// List bookings matching the filter, oldest first
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;

    /// Atomically apply a negotiation transition: compare `expected` against
    /// the current status, and if they match, mutate fields per `changes` and
    /// append `entry` to the negotiation history in the same write.
    ///
    /// Returns `false` when the status no longer matches `expected` (stale
    /// transition); the booking is left untouched and no entry is appended.
    async fn apply_transition(
        &self,
        id: &str,
        expected: BookingStatus,
        changes: &TransitionChanges,
        entry: LedgerEntry,
    ) -> Result<bool>;

    /// Record the client's weak payment claim: set the client witness flag
    /// and move status to `payment_processing`, guarded on the payment still
    /// being unpaid. Returns `false` when payment was already settled.
    async fn record_client_claim(&self, id: &str) -> Result<bool>;

    /// The settlement commit point: compare-and-swap `payment_status` from
    /// `unpaid` to `paid`, and in the same write set status to
    /// `payment_confirmed`, archive the booking, and optionally set the admin
    /// witness flag. Exactly one caller observes [`SettleOutcome::Won`] for
    /// any booking, ever.
    async fn conditional_settle(&self, id: &str, confirmed_by_admin: bool)
        -> Result<SettleOutcome>;

    /// Persist the gateway order issued for a booking
    async fn store_payment_link(&self, id: &str, link: &PaymentLink) -> Result<()>;

    /// Record the settlement transaction. At most one per booking; a second
    /// insert for the same booking id is an error.
    async fn create_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Transactions recorded for a booking (zero or one)
    async fn transactions_for_booking(&self, booking_id: &str) -> Result<Vec<Transaction>>;

    /// Record the settlement calendar event. At most one per booking.
    async fn create_calendar_event(&self, event: &CalendarEvent) -> Result<()>;

    /// Calendar events recorded for a booking (zero or one)
    async fn calendar_events_for_booking(&self, booking_id: &str) -> Result<Vec<CalendarEvent>>;
}
