// ABOUTME: Shared engine resources bundled for handler state
// ABOUTME: One Arc of collaborators and engine components threaded through all routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Shared resources for request handlers.

use crate::config::ServerConfig;
use crate::gateway::PaymentGateway;
use crate::negotiation::NegotiationStateMachine;
use crate::notifications::Notifier;
use crate::payment_link::PaymentLinkIssuer;
use crate::reconcile::PaymentReconciler;
use crate::store::BookingStore;
use std::sync::Arc;

/// Everything a handler needs, constructed once at startup
pub struct EngineResources {
    /// Server configuration
    pub config: ServerConfig,
    /// Storage collaborator
    pub store: Arc<dyn BookingStore>,
    /// Negotiation state machine
    pub negotiation: NegotiationStateMachine,
    /// Payment link issuance
    pub issuer: PaymentLinkIssuer,
    /// Payment reconciliation
    pub reconciler: PaymentReconciler,
}

impl EngineResources {
    /// Wire the engine components over the given collaborators
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            negotiation: NegotiationStateMachine::new(Arc::clone(&store)),
            issuer: PaymentLinkIssuer::new(
                Arc::clone(&store),
                gateway,
                Arc::clone(&notifier),
            ),
            reconciler: PaymentReconciler::new(Arc::clone(&store), notifier),
            config,
            store,
        }
    }
}
