// ABOUTME: Core domain models for bookings, negotiation ledger, transactions, and calendar events
// ABOUTME: The Booking aggregate and its append-only negotiation history live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Domain models for the booking engine.
//!
//! The [`Booking`] aggregate is the unit of consistency: its status, money
//! fields, and append-only [`LedgerEntry`] history always change together
//! through a single conditional store write. [`Transaction`] and
//! [`CalendarEvent`] are settlement artifacts created at most once per
//! booking.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Submitted by the client, awaiting an operator cost proposal
    Pending,
    /// Operator proposed a cost; client may accept, counter, or cancel
    CounterProposed,
    /// Cost agreed; awaiting payment
    Accepted,
    /// Client cancelled the negotiation (terminal)
    Rejected,
    /// Client reported an out-of-band transfer; awaiting operator verification
    PaymentProcessing,
    /// Payment settled (terminal)
    PaymentConfirmed,
}

/// Whether payment for a booking has been settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// Who performed a negotiation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Client,
    Admin,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A negotiation action, as a closed tagged union.
///
/// Each variant carries exactly the fields that action requires; there is no
/// open bag of optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NegotiationAction {
    /// Operator proposes a cost to the client
    ProposeCost {
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    /// Client counters with a different amount
    CounterOffer { amount: f64 },
    /// Accept the amount currently on the table
    Accept,
    /// Client walks away from the negotiation
    Cancel,
    /// Administrative reset of the booking to `pending`
    MarkPending,
}

impl NegotiationAction {
    /// The amount carried by this action, if any
    #[must_use]
    pub const fn amount(&self) -> Option<f64> {
        match self {
            Self::ProposeCost { amount, .. } | Self::CounterOffer { amount } => Some(*amount),
            Self::Accept | Self::Cancel | Self::MarkPending => None,
        }
    }
}

/// One immutable record in a booking's negotiation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    #[serde(flatten)]
    pub action: NegotiationAction,
}

impl LedgerEntry {
    /// Record an action as performed now
    #[must_use]
    pub fn now(actor: Actor, action: NegotiationAction) -> Self {
        Self {
            timestamp: Utc::now(),
            actor,
            action,
        }
    }
}

/// A payable order issued at the payment gateway for a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    /// Gateway-side order id
    pub order_id: String,
    /// Opaque redirect URL presented to the client
    pub approval_url: String,
}

/// The booking aggregate root.
///
/// Persisted exclusively through the store collaborator; the engine never
/// holds a long-lived in-memory copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Opaque unique identifier, immutable
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    /// Requested service, free-form (catalog lives outside the engine)
    pub service: String,
    /// When the booked event takes place
    pub event_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub status: BookingStatus,
    /// Operator's current cost proposal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_cost: Option<f64>,
    /// Client's outstanding counter offer; cleared once resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_counter_offer: Option<f64>,
    /// Append-only, insertion-ordered negotiation history
    pub negotiation_history: Vec<LedgerEntry>,

    pub payment_status: PaymentStatus,
    /// Client claims to have paid out-of-band
    pub payment_confirmed_by_client: bool,
    /// Operator verified the payment
    pub payment_confirmed_by_admin: bool,
    /// Live gateway order, if one has been issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<PaymentLink>,
    /// Set exactly once, when settlement completes
    pub archived: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a client supplies when submitting a booking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_name: String,
    pub client_email: String,
    pub service: String,
    pub event_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Booking {
    /// Create a fresh `pending` booking from a client request
    #[must_use]
    pub fn new(request: BookingRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            client_name: request.client_name,
            client_email: request.client_email,
            service: request.service,
            event_date: request.event_date,
            notes: request.notes,
            status: BookingStatus::Pending,
            proposed_cost: None,
            client_counter_offer: None,
            negotiation_history: Vec::new(),
            payment_status: PaymentStatus::Unpaid,
            payment_confirmed_by_client: false,
            payment_confirmed_by_admin: false,
            payment_link: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether payment for this booking has been settled
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// How a settled payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Settled through the payment gateway (webhook capture)
    Gateway,
    /// Out-of-band bank transfer verified by the operator
    BankTransfer,
}

/// Status of a recorded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
}

/// Record of a settled payment. Created at most once per booking; immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub booking_id: String,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    /// Gateway capture id, or a generated id for manual transfers
    pub external_transaction_id: String,
    pub status: TransactionStatus,
    pub client_name: String,
    pub client_email: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build the settlement transaction for a booking
    #[must_use]
    pub fn for_settlement(
        booking: &Booking,
        amount: f64,
        payment_method: PaymentMethod,
        external_transaction_id: String,
    ) -> Self {
        Self {
            booking_id: booking.id.clone(),
            amount,
            payment_method,
            external_transaction_id,
            status: TransactionStatus::Completed,
            client_name: booking.client_name.clone(),
            client_email: booking.client_email.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Calendar entry derived from a settled booking. Created at most once per
/// booking; visibility defaults to private.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub booking_id: String,
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Derive the calendar event for a settled booking
    #[must_use]
    pub fn for_booking(booking: &Booking) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            title: format!("{} ({})", booking.service, booking.client_name),
            event_date: booking.event_date,
            is_public: false,
            created_at: Utc::now(),
        }
    }
}

/// Validate a money amount: non-negative and finite
pub fn validate_amount(amount: f64) -> AppResult<f64> {
    if !amount.is_finite() {
        return Err(AppError::invalid_input("amount must be a finite number"));
    }
    if amount < 0.0 {
        return Err(AppError::invalid_input("amount must not be negative"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_new_booking_defaults() {
        let booking = Booking::new(BookingRequest {
            client_name: "Ada".into(),
            client_email: "ada@example.com".into(),
            service: "Wedding set".into(),
            event_date: Utc::now(),
            notes: None,
        });
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert!(booking.negotiation_history.is_empty());
        assert!(!booking.archived);
    }

    #[test]
    fn test_ledger_entry_action_tagging() {
        let entry = LedgerEntry::now(
            Actor::Admin,
            NegotiationAction::ProposeCost {
                amount: 1500.0,
                notes: Some("incl. travel".into()),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "propose_cost");
        assert_eq!(json["actor"], "admin");
        assert!((json["amount"].as_f64().unwrap() - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_amount_rejects_nan_and_negative() {
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(-1.0).is_err());
        assert!(validate_amount(0.0).is_ok());
    }
}
