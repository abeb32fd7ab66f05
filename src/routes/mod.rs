// ABOUTME: HTTP route assembly and explicit auth-context extraction
// ABOUTME: Admin identity is a value derived per-request, never ambient state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! HTTP surface of the booking engine.
//!
//! Handlers are thin: they authenticate where required, decode the payload,
//! and delegate to the engine components. The operator's identity is an
//! explicit [`AuthContext`] value produced from the request, not a mutable
//! session flag.

use crate::context::EngineResources;
use crate::errors::AppError;
use crate::models::Actor;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod bookings;
pub mod webhooks;

/// Who is driving this request
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// The authenticated actor
    pub actor: Actor,
}

/// Authenticate an operator from the `Authorization: Bearer` header.
///
/// Cookie issuance and session management live outside the engine; admin
/// routes accept the configured bearer token only.
pub fn require_admin(
    headers: &HeaderMap,
    resources: &Arc<EngineResources>,
) -> Result<AuthContext, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(AppError::auth_required)?;

    if token != resources.config.admin_token {
        return Err(AppError::permission_denied("invalid admin token"));
    }
    Ok(AuthContext {
        actor: Actor::Admin,
    })
}

/// Assemble the full application router
pub fn router(resources: Arc<EngineResources>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(bookings::BookingRoutes::routes(Arc::clone(&resources)))
        .merge(admin::AdminRoutes::routes(Arc::clone(&resources)))
        .merge(webhooks::WebhookRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
