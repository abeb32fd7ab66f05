// ABOUTME: Shared test setup: engine wiring over a stub gateway and recording notifier
// ABOUTME: Provides booking builders and quiet logging for integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared test utilities for `encore_booking` integration tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use encore_booking::config::ServerConfig;
use encore_booking::context::EngineResources;
use encore_booking::gateway::{CheckoutOrder, PayPalConfig, PaymentGateway};
use encore_booking::models::{Booking, BookingRequest};
use encore_booking::notifications::{NotificationKind, Notifier};
use encore_booking::store::{BookingStore, MemoryBookingStore};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

pub const ADMIN_TOKEN: &str = "test-admin-token";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Gateway double: records every order it creates, optionally fails
#[derive(Debug, Default)]
pub struct StubGateway {
    orders: Mutex<Vec<(f64, String, String)>>,
    counter: AtomicUsize,
    fail_next: AtomicBool,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_order` call fail
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// How many orders this gateway has created
    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// `(amount, description, external_ref)` of every created order
    pub fn orders(&self) -> Vec<(f64, String, String)> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(
        &self,
        amount: f64,
        description: &str,
        external_ref: &str,
    ) -> encore_booking::errors::AppResult<CheckoutOrder> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(encore_booking::errors::AppError::payment_gateway(
                "stub gateway failure",
            ));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.orders.lock().unwrap().push((
            amount,
            description.to_owned(),
            external_ref.to_owned(),
        ));
        Ok(CheckoutOrder {
            order_id: format!("order-{n}"),
            approval_url: format!("https://gateway.test/approve/order-{n}"),
        })
    }
}

/// Notifier double: records every dispatched notification, optionally fails
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationKind, Value)>>,
    fail_all: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `send` call fail
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(NotificationKind, Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(sent_kind, _)| *sent_kind == kind)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, kind: NotificationKind, payload: Value) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            bail!("notifier unavailable");
        }
        self.sent.lock().unwrap().push((kind, payload));
        Ok(())
    }
}

/// Fully wired engine over test doubles
pub struct TestEngine {
    pub resources: Arc<EngineResources>,
    pub store: Arc<MemoryBookingStore>,
    pub gateway: Arc<StubGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Standard engine setup for tests
pub fn create_test_engine() -> TestEngine {
    init_test_logging();

    let store = Arc::new(MemoryBookingStore::new());
    let gateway = Arc::new(StubGateway::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let config = ServerConfig {
        http_port: 0,
        admin_token: ADMIN_TOKEN.to_owned(),
        paypal: PayPalConfig::default(),
    };
    let resources = Arc::new(EngineResources::new(
        config,
        Arc::clone(&store) as Arc<dyn BookingStore>,
        Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    ));

    TestEngine {
        resources,
        store,
        gateway,
        notifier,
    }
}

/// A plausible booking request
pub fn sample_request() -> BookingRequest {
    BookingRequest {
        client_name: "Nora Vane".to_owned(),
        client_email: "nora@example.com".to_owned(),
        service: "Jazz quartet, evening set".to_owned(),
        event_date: Utc.with_ymd_and_hms(2026, 10, 3, 19, 0, 0).single().unwrap(),
        notes: Some("Outdoor terrace if weather allows".to_owned()),
    }
}

/// Create and persist a fresh `pending` booking
pub async fn create_pending_booking(engine: &TestEngine) -> Booking {
    let booking = Booking::new(sample_request());
    engine.store.create_booking(&booking).await.unwrap();
    booking
}

/// Drive a booking to `accepted` with an agreed cost of `amount`
pub async fn create_accepted_booking(engine: &TestEngine, amount: f64) -> Booking {
    let booking = create_pending_booking(engine).await;
    engine
        .resources
        .negotiation
        .propose_cost(&booking.id, amount, None)
        .await
        .unwrap();
    let outcome = engine
        .resources
        .negotiation
        .client_respond(
            &booking.id,
            encore_booking::negotiation::ClientResponse::Accept,
        )
        .await
        .unwrap();
    outcome.booking
}
