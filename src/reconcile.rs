// ABOUTME: Payment reconciliation executing the settlement bundle at most once per booking
// ABOUTME: Three signal sources, one conditional write, one winner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! # Payment Reconciler
//!
//! Receives payment-confirmation signals from three independent channels and
//! guarantees the settlement bundle runs exactly once per booking:
//!
//! 1. **Gateway webhook** (`PAYMENT.CAPTURE.COMPLETED`): authoritative,
//!    delivered at least once.
//! 2. **Client self-report** of an out-of-band transfer: a weak signal that
//!    only records a witness flag and prompts operator verification.
//! 3. **Admin manual confirmation**: authoritative, equal in trust to the
//!    webhook.
//!
//! The single source of truth for "did we already process this" is the
//! store's conditional write of `payment_status` from `unpaid` to `paid`.
//! Only the caller that wins that write runs the bundle: status
//! `payment_confirmed` + archive (same write), one calendar event, one
//! transaction record, one success notification pair. Everything after the
//! write is best-effort; a failed sub-step is logged for out-of-band retry
//! and never re-runs the reconciler.

use crate::errors::{AppError, AppResult};
use crate::models::{Booking, CalendarEvent, PaymentMethod, Transaction};
use crate::notifications::{dispatch, NotificationKind, Notifier};
use crate::store::{BookingStore, SettleOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Webhook event type that authorizes settlement
pub const CAPTURE_COMPLETED: &str = "PAYMENT.CAPTURE.COMPLETED";

/// Gateway webhook payload (the subset the engine consumes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookEvent {
    pub event_type: String,
    pub resource: WebhookResource,
}

/// Webhook resource: the capture and its purchase units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResource {
    /// Gateway-side capture id
    pub id: String,
    #[serde(default)]
    pub purchase_units: Vec<WebhookPurchaseUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPurchaseUnit {
    #[serde(default)]
    pub amount: Option<WebhookAmount>,
    #[serde(default)]
    pub payments: Option<WebhookPayments>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAmount {
    /// Decimal amount as the gateway sends it, e.g. `"1200.00"`
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayments {
    #[serde(default)]
    pub captures: Vec<WebhookCapture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookCapture {
    /// The booking id the order was created with
    pub custom_id: Option<String>,
}

impl PaymentWebhookEvent {
    /// The booking id echoed back by the gateway, if present
    #[must_use]
    pub fn booking_id(&self) -> Option<&str> {
        self.resource
            .purchase_units
            .first()
            .and_then(|unit| unit.payments.as_ref())
            .and_then(|payments| payments.captures.first())
            .and_then(|capture| capture.custom_id.as_deref())
    }

    /// The captured amount, if present and parseable
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.resource
            .purchase_units
            .first()
            .and_then(|unit| unit.amount.as_ref())
            .and_then(|amount| amount.value.parse().ok())
    }
}

/// Outcome of a reconciliation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// This call won the guard and executed the settlement bundle
    Settled {
        /// A post-commit sub-step failed and needs out-of-band retry
        degraded: bool,
    },
    /// Payment was already settled; duplicate signal, successful no-op
    AlreadySettled,
    /// Webhook event type the engine does not act on
    Ignored,
}

/// Reconciles payment signals into at-most-once settlement
pub struct PaymentReconciler {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
}

impl PaymentReconciler {
    /// Create a reconciler over the given collaborators
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Authoritative signal: gateway capture webhook.
    ///
    /// Non-capture events are acknowledged and ignored so the gateway stops
    /// retrying them. Duplicate deliveries of the same capture settle once.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn confirm_from_webhook(
        &self,
        event: &PaymentWebhookEvent,
    ) -> AppResult<SettlementOutcome> {
        if event.event_type != CAPTURE_COMPLETED {
            info!(event_type = %event.event_type, "ignoring webhook event type");
            return Ok(SettlementOutcome::Ignored);
        }
        let booking_id = event
            .booking_id()
            .ok_or_else(|| AppError::invalid_input("webhook capture carries no booking id"))?
            .to_owned();

        self.settle(
            &booking_id,
            event.amount(),
            PaymentMethod::Gateway,
            event.resource.id.clone(),
            false,
        )
        .await
    }

    /// Authoritative signal: operator verified a bank transfer by hand.
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn confirm_manual(&self, id: &str) -> AppResult<SettlementOutcome> {
        let external_id = format!("manual-{}", Uuid::new_v4());
        self.settle(id, None, PaymentMethod::BankTransfer, external_id, true)
            .await
    }

    /// Weak signal: the client says a bank transfer was made.
    ///
    /// Never settles. Records the client witness flag, moves the booking to
    /// `payment_processing`, and asks the operator to verify.
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn record_client_claim(&self, id: &str) -> AppResult<Booking> {
        let booking = self.fetch(id).await?;

        let recorded = self.store.record_client_claim(id).await?;
        if !recorded {
            // Already settled; the claim changes nothing.
            return Ok(booking);
        }

        dispatch(
            &self.notifier,
            NotificationKind::PaymentClaimed,
            json!({
                "booking_id": booking.id,
                "client_name": booking.client_name,
                "client_email": booking.client_email,
                "amount": booking.proposed_cost,
            }),
        )
        .await;
        self.fetch(id).await
    }

    /// The settlement path shared by both authoritative channels.
    async fn settle(
        &self,
        id: &str,
        reported_amount: Option<f64>,
        method: PaymentMethod,
        external_transaction_id: String,
        confirmed_by_admin: bool,
    ) -> AppResult<SettlementOutcome> {
        // The guard: a single conditional write on payment_status. Everything
        // before it is read-only; everything after it runs only for the
        // winner.
        match self.store.conditional_settle(id, confirmed_by_admin).await? {
            SettleOutcome::NotFound => {
                return Err(AppError::not_found(format!("booking {id}")));
            }
            SettleOutcome::AlreadyPaid => {
                info!(booking_id = %id, "duplicate settlement signal, no-op");
                return Ok(SettlementOutcome::AlreadySettled);
            }
            SettleOutcome::Won => {}
        }

        let booking = self.fetch(id).await?;
        let amount = reported_amount
            .or(booking.proposed_cost)
            .unwrap_or_default();
        if reported_amount.is_none() && booking.proposed_cost.is_none() {
            warn!(booking_id = %id, "settling booking with no recorded amount");
        }

        let degraded = self
            .run_bundle(&booking, amount, method, external_transaction_id)
            .await;

        info!(
            booking_id = %id,
            amount,
            ?method,
            degraded,
            "payment settled"
        );
        Ok(SettlementOutcome::Settled { degraded })
    }

    /// Post-commit side effects. Failures are logged and reported as
    /// `degraded` but the payment stays settled; retrying the reconciler
    /// would hit the guard and no-op, so recovery happens out-of-band.
    async fn run_bundle(
        &self,
        booking: &Booking,
        amount: f64,
        method: PaymentMethod,
        external_transaction_id: String,
    ) -> bool {
        let mut degraded = false;

        let event = CalendarEvent::for_booking(booking);
        if let Err(err) = self.store.create_calendar_event(&event).await {
            error!(booking_id = %booking.id, %err, "calendar event creation failed after settlement");
            degraded = true;
        }

        let transaction =
            Transaction::for_settlement(booking, amount, method, external_transaction_id);
        if let Err(err) = self.store.create_transaction(&transaction).await {
            error!(booking_id = %booking.id, %err, "transaction record creation failed after settlement");
            degraded = true;
        }

        let payload = json!({
            "booking_id": booking.id,
            "client_name": booking.client_name,
            "client_email": booking.client_email,
            "service": booking.service,
            "amount": amount,
            "payment_method": method,
        });
        dispatch(
            &self.notifier,
            NotificationKind::PaymentReceivedClient,
            payload.clone(),
        )
        .await;
        dispatch(
            &self.notifier,
            NotificationKind::PaymentReceivedOperator,
            payload,
        )
        .await;

        degraded
    }

    async fn fetch(&self, id: &str) -> AppResult<Booking> {
        self.store
            .get_booking(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))
    }
}
