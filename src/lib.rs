// ABOUTME: Library entry point for the booking negotiation and payment settlement engine
// ABOUTME: Wires the state machine, link issuer, and reconciler over collaborator traits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

#![deny(unsafe_code)]

//! # Encore Booking
//!
//! Booking negotiation and payment settlement engine for service bookings.
//! A client submits a booking request, negotiates a price with an operator
//! through a bounded back-and-forth, and settles payment through one of
//! three independent channels: a payment-gateway webhook, a client
//! self-report of an out-of-band bank transfer, or manual operator
//! confirmation.
//!
//! ## Architecture
//!
//! - **Models**: the [`models::Booking`] aggregate with its append-only
//!   negotiation ledger, plus the settlement artifacts
//!   ([`models::Transaction`], [`models::CalendarEvent`])
//! - **Negotiation**: [`negotiation::NegotiationStateMachine`] validates and
//!   applies transitions as single conditional store writes
//! - **Payment links**: [`payment_link::PaymentLinkIssuer`] creates payable
//!   gateway orders, idempotently per booking
//! - **Reconciliation**: [`reconcile::PaymentReconciler`] guarantees the
//!   settlement bundle executes at most once per booking, no matter which
//!   channel reports first or how often it retries
//! - **Collaborators**: storage ([`store::BookingStore`]), gateway
//!   ([`gateway::PaymentGateway`]), and notifications
//!   ([`notifications::Notifier`]) are trait contracts; CMS content,
//!   delivery, and auth issuance live behind them, outside the engine

/// Environment-driven configuration
pub mod config;

/// Shared handler resources
pub mod context;

/// Unified error handling
pub mod errors;

/// Payment gateway collaborator
pub mod gateway;

/// Structured logging setup
pub mod logging;

/// Core domain models
pub mod models;

/// Negotiation state machine
pub mod negotiation;

/// Notification collaborator
pub mod notifications;

/// Payment link issuance
pub mod payment_link;

/// Payment reconciliation
pub mod reconcile;

/// HTTP routes
pub mod routes;

/// Storage collaborator
pub mod store;
