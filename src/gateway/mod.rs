// ABOUTME: Payment gateway collaborator contract for creating payable orders
// ABOUTME: The engine only needs order creation; capture arrives via webhook
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Payment gateway abstraction.
//!
//! The gateway turns an agreed cost into a payable order and echoes the
//! booking id back on its capture webhook via the order's external
//! reference. Everything after order creation (checkout UI, capture) happens
//! on the gateway's side.

use crate::errors::AppResult;
use async_trait::async_trait;

pub mod paypal;

pub use paypal::{PayPalConfig, PayPalGateway};

/// A payable order created at the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOrder {
    /// Gateway-side order id
    pub order_id: String,
    /// Redirect URL the client uses to approve and pay
    pub approval_url: String,
}

/// Payment gateway collaborator contract
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payable order.
    ///
    /// `amount` is a plain decimal currency amount; `external_ref` is the
    /// booking id, which the gateway echoes back as the capture's custom id
    /// so the webhook can be correlated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::PaymentGatewayError`] on
    /// authentication or order-creation failure; callers may retry.
    async fn create_order(
        &self,
        amount: f64,
        description: &str,
        external_ref: &str,
    ) -> AppResult<CheckoutOrder>;
}
