// ABOUTME: Payment gateway webhook receiver feeding the reconciler
// ABOUTME: Always acks with 200 on understood events so the gateway stops retrying
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Gateway webhook routes.

use crate::context::EngineResources;
use crate::errors::AppError;
use crate::reconcile::{PaymentWebhookEvent, SettlementOutcome};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// Webhook routes
pub struct WebhookRoutes;

/// Acknowledgement body returned to the gateway
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub already_settled: bool,
    pub ignored: bool,
}

impl WebhookRoutes {
    /// Create the webhook routes
    pub fn routes(resources: Arc<EngineResources>) -> Router {
        Router::new()
            .route("/api/webhooks/payment", post(Self::handle_payment_webhook))
            .with_state(resources)
    }

    /// Gateway capture webhook (at-least-once delivery; duplicates no-op)
    async fn handle_payment_webhook(
        State(resources): State<Arc<EngineResources>>,
        Json(event): Json<PaymentWebhookEvent>,
    ) -> Result<Response, AppError> {
        let outcome = resources.reconciler.confirm_from_webhook(&event).await?;
        let ack = match outcome {
            SettlementOutcome::Settled { .. } => WebhookAck {
                received: true,
                already_settled: false,
                ignored: false,
            },
            SettlementOutcome::AlreadySettled => WebhookAck {
                received: true,
                already_settled: true,
                ignored: false,
            },
            SettlementOutcome::Ignored => WebhookAck {
                received: true,
                already_settled: false,
                ignored: true,
            },
        };
        Ok(Json(ack).into_response())
    }
}
