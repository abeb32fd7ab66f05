// ABOUTME: Payment link issuance against the external gateway, idempotent per booking
// ABOUTME: A live order short-circuits the gateway call; failures leave the booking untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! # Payment Link Issuer
//!
//! Turns an accepted booking's agreed cost into a payable gateway order and
//! hands the approval URL back for the client. Issuance is idempotent per
//! booking: the persisted link is the idempotency record, so a retry returns
//! the existing order instead of creating a duplicate at the gateway.
//!
//! Gateway failure never touches booking state; the booking stays `accepted`
//! with no link and the caller may re-invoke issuance.

use crate::errors::{AppError, AppResult};
use crate::gateway::PaymentGateway;
use crate::models::{Booking, BookingStatus, PaymentLink};
use crate::notifications::{dispatch, NotificationKind, Notifier};
use crate::store::BookingStore;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Issues gateway payment links for accepted bookings
pub struct PaymentLinkIssuer {
    store: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
}

impl PaymentLinkIssuer {
    /// Create an issuer over the given collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
        }
    }

    /// Issue (or return the existing) payment link for a booking.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when the booking is not awaiting payment or has no
    /// agreed cost; `PaymentGatewayError` (retryable) when the gateway call
    /// fails, in which case the booking is left unchanged.
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn issue(&self, id: &str) -> AppResult<PaymentLink> {
        let booking = self
            .store
            .get_booking(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;

        if booking.status != BookingStatus::Accepted {
            return Err(AppError::invalid_transition(format!(
                "payment link requires an accepted booking, found {:?}",
                booking.status
            ))
            .with_resource_id(id));
        }
        let Some(amount) = booking.proposed_cost else {
            return Err(
                AppError::invalid_transition("booking has no agreed cost").with_resource_id(id)
            );
        };

        // Idempotency: a live order already exists, hand it back as-is.
        if let Some(existing) = &booking.payment_link {
            info!(booking_id = %id, order_id = %existing.order_id, "reusing existing payment link");
            return Ok(existing.clone());
        }

        let description = format!("{} for {}", booking.service, booking.client_name);
        let order = self
            .gateway
            .create_order(amount, &description, &booking.id)
            .await?;

        let link = PaymentLink {
            order_id: order.order_id,
            approval_url: order.approval_url,
        };
        self.store.store_payment_link(id, &link).await?;
        info!(booking_id = %id, order_id = %link.order_id, "payment link issued");

        self.notify_cost_accepted(&booking, amount, &link).await;
        Ok(link)
    }

    async fn notify_cost_accepted(&self, booking: &Booking, amount: f64, link: &PaymentLink) {
        dispatch(
            &self.notifier,
            NotificationKind::CostAccepted,
            json!({
                "booking_id": booking.id,
                "client_name": booking.client_name,
                "client_email": booking.client_email,
                "service": booking.service,
                "amount": amount,
                "approval_url": link.approval_url,
            }),
        )
        .await;
    }
}
