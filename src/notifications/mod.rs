// ABOUTME: Notification collaborator contract and the kinds the engine dispatches
// ABOUTME: Delivery is out of scope; only the fact and payload of a notification is modeled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Notification dispatch.
//!
//! The engine only decides *that* a notification must go out and with what
//! payload; rendering and delivery (email, SMS) belong to the collaborator
//! behind [`Notifier`]. Dispatch is fire-and-forget: failures are logged and
//! never fail the caller's request or roll back a settlement.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// The notifications the engine can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Cost agreed; tells the client to follow the payment link
    CostAccepted,
    /// Client self-reported a bank transfer; asks the operator to verify
    PaymentClaimed,
    /// Payment settled; success message for the client
    PaymentReceivedClient,
    /// Payment settled; confirmation for the operator
    PaymentReceivedOperator,
}

/// Notification collaborator contract
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Request delivery of one notification
    async fn send(&self, kind: NotificationKind, payload: Value) -> Result<()>;
}

/// Send a notification without letting delivery failures reach the caller.
///
/// Per the partial-failure policy, notification errors are logged and
/// swallowed; a completed settlement is never rolled back because an email
/// could not be sent.
pub async fn dispatch(notifier: &Arc<dyn Notifier>, kind: NotificationKind, payload: Value) {
    match notifier.send(kind, payload).await {
        Ok(()) => debug!(?kind, "notification dispatched"),
        Err(error) => warn!(?kind, %error, "notification dispatch failed"),
    }
}

/// Notifier that records intent in the log stream only.
///
/// Default collaborator for deployments without a delivery backend wired up.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, kind: NotificationKind, payload: Value) -> Result<()> {
        tracing::info!(?kind, %payload, "notification");
        Ok(())
    }
}
