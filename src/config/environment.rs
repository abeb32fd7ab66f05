// ABOUTME: Environment-variable driven server configuration
// ABOUTME: HTTP port, admin token, and payment gateway credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Server configuration loaded from the environment.

use crate::errors::{AppError, AppResult};
use crate::gateway::PayPalConfig;
use std::env;
use std::time::Duration;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    pub http_port: u16,
    /// Bearer token operators present on admin routes
    pub admin_token: String,
    /// Payment gateway settings
    pub paypal: PayPalConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `ADMIN_TOKEN` is unset or a numeric
    /// variable fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| AppError::config(format!("HTTP_PORT is not a valid port: {value}")))?,
            Err(_) => 8080,
        };

        let admin_token = env::var("ADMIN_TOKEN")
            .map_err(|_| AppError::config("ADMIN_TOKEN must be set for admin routes"))?;

        let timeout_secs = match env::var("GATEWAY_TIMEOUT_SECS") {
            Ok(value) => value.parse().map_err(|_| {
                AppError::config(format!("GATEWAY_TIMEOUT_SECS is not a number: {value}"))
            })?,
            Err(_) => 30,
        };

        let paypal = PayPalConfig {
            base_url: env::var("PAYPAL_BASE_URL")
                .unwrap_or_else(|_| "https://api-m.sandbox.paypal.com".to_owned()),
            client_id: env::var("PAYPAL_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("PAYPAL_CLIENT_SECRET").unwrap_or_default(),
            currency: env::var("PAYPAL_CURRENCY").unwrap_or_else(|_| "EUR".to_owned()),
            return_url: env::var("PAYPAL_RETURN_URL").unwrap_or_default(),
            cancel_url: env::var("PAYPAL_CANCEL_URL").unwrap_or_default(),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            http_port,
            admin_token,
            paypal,
        })
    }
}
