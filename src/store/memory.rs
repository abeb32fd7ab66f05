// ABOUTME: In-memory reference implementation of the booking store
// ABOUTME: DashMap shard locks give real compare-and-swap semantics per booking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! In-memory [`BookingStore`] implementation.
//!
//! Backed by [`DashMap`]; each conditional update runs while holding the
//! entry's shard lock, so compare and mutate are a single atomic step exactly
//! as a SQL backend would achieve with `UPDATE ... WHERE payment_status = ?`.

use super::{BookingFilter, BookingStore, SettleOutcome, TransitionChanges};
use crate::models::{
    Booking, BookingStatus, CalendarEvent, LedgerEntry, PaymentLink, PaymentStatus, Transaction,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

/// In-memory booking store with per-entry conditional updates
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    bookings: DashMap<String, Booking>,
    // Keyed by booking id: the map itself enforces at-most-once creation.
    transactions: DashMap<String, Transaction>,
    calendar_events: DashMap<String, CalendarEvent>,
}

impl MemoryBookingStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn create_booking(&self, booking: &Booking) -> Result<()> {
        if self.bookings.contains_key(&booking.id) {
            bail!("booking {} already exists", booking.id);
        }
        self.bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.bookings.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| filter.include_archived || !entry.archived)
            .filter(|entry| filter.status.map_or(true, |status| entry.status == status))
            .map(|entry| entry.value().clone())
            .collect();
        bookings.sort_by_key(|booking| booking.created_at);
        Ok(bookings)
    }

    async fn apply_transition(
        &self,
        id: &str,
        expected: BookingStatus,
        changes: &TransitionChanges,
        entry: LedgerEntry,
    ) -> Result<bool> {
        let mut booking = self
            .bookings
            .get_mut(id)
            .ok_or_else(|| anyhow!("booking {id} not found"))?;

        // Compare and mutate under the shard lock: the guard below and every
        // write after it are one atomic step for concurrent callers.
        if booking.status != expected {
            return Ok(false);
        }

        if let Some(status) = changes.status {
            booking.status = status;
        }
        if let Some(amount) = changes.proposed_cost {
            booking.proposed_cost = Some(amount);
        }
        if let Some(amount) = changes.client_counter_offer {
            booking.client_counter_offer = Some(amount);
        }
        if changes.clear_counter_offer {
            booking.client_counter_offer = None;
        }
        booking.negotiation_history.push(entry);
        booking.updated_at = Utc::now();
        Ok(true)
    }

    async fn record_client_claim(&self, id: &str) -> Result<bool> {
        let mut booking = self
            .bookings
            .get_mut(id)
            .ok_or_else(|| anyhow!("booking {id} not found"))?;

        if booking.is_paid() {
            return Ok(false);
        }
        booking.payment_confirmed_by_client = true;
        booking.status = BookingStatus::PaymentProcessing;
        booking.updated_at = Utc::now();
        Ok(true)
    }

    async fn conditional_settle(
        &self,
        id: &str,
        confirmed_by_admin: bool,
    ) -> Result<SettleOutcome> {
        let Some(mut booking) = self.bookings.get_mut(id) else {
            return Ok(SettleOutcome::NotFound);
        };

        if booking.is_paid() {
            return Ok(SettleOutcome::AlreadyPaid);
        }
        booking.payment_status = PaymentStatus::Paid;
        booking.status = BookingStatus::PaymentConfirmed;
        booking.archived = true;
        if confirmed_by_admin {
            booking.payment_confirmed_by_admin = true;
        }
        booking.updated_at = Utc::now();
        Ok(SettleOutcome::Won)
    }

    async fn store_payment_link(&self, id: &str, link: &PaymentLink) -> Result<()> {
        let mut booking = self
            .bookings
            .get_mut(id)
            .ok_or_else(|| anyhow!("booking {id} not found"))?;
        booking.payment_link = Some(link.clone());
        booking.updated_at = Utc::now();
        Ok(())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<()> {
        match self.transactions.entry(transaction.booking_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                bail!(
                    "transaction for booking {} already recorded",
                    transaction.booking_id
                )
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(transaction.clone());
                Ok(())
            }
        }
    }

    async fn transactions_for_booking(&self, booking_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .get(booking_id)
            .map(|entry| vec![entry.value().clone()])
            .unwrap_or_default())
    }

    async fn create_calendar_event(&self, event: &CalendarEvent) -> Result<()> {
        match self.calendar_events.entry(event.booking_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                bail!(
                    "calendar event for booking {} already recorded",
                    event.booking_id
                )
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(event.clone());
                Ok(())
            }
        }
    }

    async fn calendar_events_for_booking(&self, booking_id: &str) -> Result<Vec<CalendarEvent>> {
        Ok(self
            .calendar_events
            .get(booking_id)
            .map(|entry| vec![entry.value().clone()])
            .unwrap_or_default())
    }
}
