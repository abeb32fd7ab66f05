// ABOUTME: Client-facing booking routes: submission, negotiation response, payment signals
// ABOUTME: Thin handlers delegating to the state machine, issuer, and reconciler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Client-facing booking routes.

use crate::context::EngineResources;
use crate::errors::AppError;
use crate::models::{Booking, BookingRequest, PaymentLink};
use crate::negotiation::ClientResponse;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Client booking routes
pub struct BookingRoutes;

/// Client's answer to a cost proposal
#[derive(Debug, Deserialize)]
pub struct ClientResponsePayload {
    pub action: ClientAction,
    #[serde(default)]
    pub counter_offer: Option<f64>,
}

/// The three client response actions
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAction {
    Accept,
    Counter,
    Cancel,
}

/// Transition result, with the payment link when acceptance triggered
/// issuance. Issuance failure does not undo the transition; the error is
/// reported alongside the accepted booking so the caller can re-issue.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub booking: Booking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<PaymentLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link_error: Option<String>,
}

impl BookingRoutes {
    /// Create the client booking routes
    pub fn routes(resources: Arc<EngineResources>) -> Router {
        Router::new()
            .route("/api/bookings", post(Self::handle_submit))
            .route("/api/bookings/:id", get(Self::handle_get))
            .route("/api/bookings/:id/respond", post(Self::handle_respond))
            .route(
                "/api/bookings/:id/payment-link",
                post(Self::handle_payment_link),
            )
            .route(
                "/api/bookings/:id/client-payment-report",
                post(Self::handle_client_payment_report),
            )
            .with_state(resources)
    }

    /// Submit a new booking request; it enters the worklist as `pending`
    async fn handle_submit(
        State(resources): State<Arc<EngineResources>>,
        Json(request): Json<BookingRequest>,
    ) -> Result<Response, AppError> {
        if request.client_name.trim().is_empty() {
            return Err(AppError::missing_field("client_name"));
        }
        if request.client_email.trim().is_empty() {
            return Err(AppError::missing_field("client_email"));
        }
        if request.service.trim().is_empty() {
            return Err(AppError::missing_field("service"));
        }

        let booking = Booking::new(request);
        resources.store.create_booking(&booking).await?;
        Ok((StatusCode::CREATED, Json(booking)).into_response())
    }

    /// Fetch a single booking
    async fn handle_get(
        State(resources): State<Arc<EngineResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let booking = resources
            .store
            .get_booking(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        Ok(Json(booking).into_response())
    }

    /// Client accepts, counters, or cancels the operator's proposal
    async fn handle_respond(
        State(resources): State<Arc<EngineResources>>,
        Path(id): Path<String>,
        Json(payload): Json<ClientResponsePayload>,
    ) -> Result<Response, AppError> {
        let response = match payload.action {
            ClientAction::Accept => ClientResponse::Accept,
            ClientAction::Counter => {
                let amount = payload
                    .counter_offer
                    .ok_or_else(|| AppError::missing_field("counter_offer"))?;
                ClientResponse::Counter(amount)
            }
            ClientAction::Cancel => ClientResponse::Cancel,
        };

        let outcome = resources.negotiation.client_respond(&id, response).await?;
        let body = issue_link_if_accepted(&resources, outcome.booking, outcome.newly_accepted).await;
        Ok(Json(body).into_response())
    }

    /// Re-issue (or fetch) the payment link for an accepted booking
    async fn handle_payment_link(
        State(resources): State<Arc<EngineResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let link = resources.issuer.issue(&id).await?;
        Ok(Json(link).into_response())
    }

    /// Client self-reports an out-of-band bank transfer (weak signal)
    async fn handle_client_payment_report(
        State(resources): State<Arc<EngineResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let booking = resources.reconciler.record_client_claim(&id).await?;
        Ok(Json(booking).into_response())
    }
}

/// After a transition into `accepted`, attempt payment link issuance. The
/// transition stands either way; issuer errors ride along in the response.
pub(super) async fn issue_link_if_accepted(
    resources: &Arc<EngineResources>,
    booking: Booking,
    newly_accepted: bool,
) -> TransitionResponse {
    if !newly_accepted {
        return TransitionResponse {
            booking,
            payment_link: None,
            payment_link_error: None,
        };
    }
    match resources.issuer.issue(&booking.id).await {
        Ok(link) => TransitionResponse {
            booking,
            payment_link: Some(link),
            payment_link_error: None,
        },
        Err(error) => {
            warn!(booking_id = %booking.id, %error, "payment link issuance failed after acceptance");
            TransitionResponse {
                booking,
                payment_link: None,
                payment_link_error: Some(error.to_string()),
            }
        }
    }
}
