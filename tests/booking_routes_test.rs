// ABOUTME: HTTP-level tests for the booking engine routes
// ABOUTME: Submission, admin auth, negotiation flow, webhook acks, and worklist filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{create_accepted_booking, create_pending_booking, create_test_engine, ADMIN_TOKEN};
use encore_booking::routes;
use encore_booking::store::BookingStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn test_router() -> (Router, common::TestEngine) {
    let engine = create_test_engine();
    let router = routes::router(Arc::clone(&engine.resources));
    (router, engine)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _engine) = test_router();
    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_and_fetch_booking() {
    let (router, _engine) = test_router();

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/bookings",
            json!({
                "client_name": "Nora Vane",
                "client_email": "nora@example.com",
                "service": "Jazz quartet",
                "event_date": "2026-10-03T19:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().unwrap().to_owned();

    let response = router
        .oneshot(
            Request::get(format!("/api/bookings/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_rejects_blank_fields() {
    let (router, _engine) = test_router();
    let response = router
        .oneshot(post_json(
            "/api/bookings",
            json!({
                "client_name": " ",
                "client_email": "nora@example.com",
                "service": "Jazz quartet",
                "event_date": "2026-10-03T19:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_missing_booking_is_404() {
    let (router, _engine) = test_router();
    let response = router
        .oneshot(
            Request::get("/api/bookings/no-such-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_require_bearer_token() {
    let (router, engine) = test_router();
    let booking = create_pending_booking(&engine).await;
    let uri = format!("/api/bookings/{}/propose-cost", booking.id);

    // No token.
    let response = router
        .clone()
        .oneshot(post_json(&uri, json!({ "proposed_cost": 1500.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong token.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::from(json!({ "proposed_cost": 1500.0 }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Correct token.
    let response = router
        .oneshot(admin_post(&uri, json!({ "proposed_cost": 1500.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "counter_proposed");
}

#[tokio::test]
async fn test_accept_issues_payment_link_in_response() {
    let (router, engine) = test_router();
    let booking = create_pending_booking(&engine).await;
    engine
        .resources
        .negotiation
        .propose_cost(&booking.id, 1200.0, None)
        .await
        .unwrap();

    let response = router
        .oneshot(post_json(
            &format!("/api/bookings/{}/respond", booking.id),
            json!({ "action": "accept" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["booking"]["status"], "accepted");
    assert!(body["payment_link"]["approval_url"].is_string());
    assert_eq!(engine.gateway.order_count(), 1);
}

#[tokio::test]
async fn test_counter_requires_amount() {
    let (router, engine) = test_router();
    let booking = create_pending_booking(&engine).await;
    engine
        .resources
        .negotiation
        .propose_cost(&booking.id, 1200.0, None)
        .await
        .unwrap();

    let response = router
        .oneshot(post_json(
            &format!("/api/bookings/{}/respond", booking.id),
            json!({ "action": "counter" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_ack_and_duplicate_flag() {
    let (router, engine) = test_router();
    let booking = create_accepted_booking(&engine, 1200.0).await;
    let event = json!({
        "event_type": "PAYMENT.CAPTURE.COMPLETED",
        "resource": {
            "id": "cap-http-1",
            "purchase_units": [{
                "amount": { "value": "1200.00" },
                "payments": { "captures": [{ "custom_id": booking.id }] },
            }],
        },
    });

    let response = router
        .clone()
        .oneshot(post_json("/api/webhooks/payment", event.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["already_settled"], false);

    let response = router
        .oneshot(post_json("/api/webhooks/payment", event))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["already_settled"], true);

    assert_eq!(
        engine
            .store
            .transactions_for_booking(&booking.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_worklist_excludes_settled_bookings() {
    let (router, engine) = test_router();
    let active = create_pending_booking(&engine).await;
    let settled = create_accepted_booking(&engine, 400.0).await;
    engine
        .resources
        .reconciler
        .confirm_manual(&settled.id)
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/bookings")
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|booking| booking["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&active.id.as_str()));
    assert!(!ids.contains(&settled.id.as_str()));

    // Opt in to archived bookings.
    let response = router
        .oneshot(
            Request::get("/api/bookings?include_archived=true")
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_manual_confirm_route_reports_duplicate() {
    let (router, engine) = test_router();
    let booking = create_accepted_booking(&engine, 640.0).await;
    let uri = format!("/api/bookings/{}/confirm-payment", booking.id);

    let response = router
        .clone()
        .oneshot(admin_post(&uri, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["already_settled"], false);
    assert_eq!(body["booking"]["payment_status"], "paid");

    let response = router.oneshot(admin_post(&uri, json!({}))).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["already_settled"], true);
}
