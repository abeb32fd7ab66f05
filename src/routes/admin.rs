// ABOUTME: Operator routes: cost proposals, counter acceptance, overrides, manual confirmation
// ABOUTME: All handlers authenticate against the configured admin bearer token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Operator (admin) routes.

use super::bookings::{issue_link_if_accepted, TransitionResponse};
use super::require_admin;
use crate::context::EngineResources;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::reconcile::SettlementOutcome;
use crate::store::BookingFilter;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Operator routes
pub struct AdminRoutes;

/// Operator cost proposal payload
#[derive(Debug, Deserialize)]
pub struct ProposeCostPayload {
    #[serde(default)]
    pub proposed_cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Worklist query parameters
#[derive(Debug, Default, Deserialize)]
pub struct WorklistParams {
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

/// Result of a manual payment confirmation
#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub booking: Booking,
    /// True when this signal was a duplicate and settled nothing new
    pub already_settled: bool,
    /// True when a post-settlement sub-step failed and needs operator review
    pub degraded: bool,
}

impl AdminRoutes {
    /// Create the operator routes
    pub fn routes(resources: Arc<EngineResources>) -> Router {
        Router::new()
            .route("/api/bookings", get(Self::handle_worklist))
            .route(
                "/api/bookings/:id/propose-cost",
                post(Self::handle_propose_cost),
            )
            .route(
                "/api/bookings/:id/accept-counter",
                post(Self::handle_accept_counter),
            )
            .route(
                "/api/bookings/:id/mark-pending",
                post(Self::handle_mark_pending),
            )
            .route(
                "/api/bookings/:id/confirm-payment",
                post(Self::handle_confirm_payment),
            )
            .with_state(resources)
    }

    /// Active bookings worklist; settled bookings are excluded unless asked for
    async fn handle_worklist(
        State(resources): State<Arc<EngineResources>>,
        headers: HeaderMap,
        Query(params): Query<WorklistParams>,
    ) -> Result<Response, AppError> {
        require_admin(&headers, &resources)?;

        let filter = BookingFilter {
            include_archived: params.include_archived,
            status: params.status,
        };
        let bookings = resources.store.list_bookings(&filter).await?;
        Ok(Json(bookings).into_response())
    }

    /// Propose a cost for a pending booking
    async fn handle_propose_cost(
        State(resources): State<Arc<EngineResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(payload): Json<ProposeCostPayload>,
    ) -> Result<Response, AppError> {
        require_admin(&headers, &resources)?;

        let amount = payload
            .proposed_cost
            .ok_or_else(|| AppError::missing_field("proposed_cost"))?;
        let outcome = resources
            .negotiation
            .propose_cost(&id, amount, payload.notes)
            .await?;
        Ok(Json(outcome.booking).into_response())
    }

    /// Adopt the client's counter offer as the agreed cost
    async fn handle_accept_counter(
        State(resources): State<Arc<EngineResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        require_admin(&headers, &resources)?;

        let outcome = resources.negotiation.accept_counter(&id).await?;
        let body: TransitionResponse =
            issue_link_if_accepted(&resources, outcome.booking, outcome.newly_accepted).await;
        Ok(Json(body).into_response())
    }

    /// Administrative override back to `pending`
    async fn handle_mark_pending(
        State(resources): State<Arc<EngineResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        require_admin(&headers, &resources)?;

        let outcome = resources.negotiation.mark_pending(&id).await?;
        Ok(Json(outcome.booking).into_response())
    }

    /// Manually confirm a verified bank transfer (authoritative signal)
    async fn handle_confirm_payment(
        State(resources): State<Arc<EngineResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        require_admin(&headers, &resources)?;

        let outcome = resources.reconciler.confirm_manual(&id).await?;
        let booking = resources
            .store
            .get_booking(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;

        let (already_settled, degraded) = match outcome {
            SettlementOutcome::Settled { degraded } => (false, degraded),
            SettlementOutcome::AlreadySettled => (true, false),
            SettlementOutcome::Ignored => {
                return Err(AppError::internal(
                    "manual confirmation yielded no settlement outcome",
                ));
            }
        };
        Ok(Json(ConfirmPaymentResponse {
            booking,
            already_settled,
            degraded,
        })
        .into_response())
    }
}
