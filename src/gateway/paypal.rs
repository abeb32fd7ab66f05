// ABOUTME: PayPal Orders API client implementing the PaymentGateway contract
// ABOUTME: Client-credentials auth plus order creation with the booking id as custom id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! PayPal REST gateway client.
//!
//! Uses the Orders v2 API: a client-credentials token request followed by
//! order creation with `intent=CAPTURE`. The booking id travels in the
//! purchase unit's `custom_id` and comes back on the capture webhook.

use super::{CheckoutOrder, PaymentGateway};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// PayPal gateway configuration
#[derive(Debug, Clone)]
pub struct PayPalConfig {
    /// REST API base URL (live or sandbox)
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// ISO 4217 currency code for orders
    pub currency: String,
    /// Where PayPal sends the payer after approval
    pub return_url: String,
    pub cancel_url: String,
    /// Caller-supplied timeout applied to each gateway call
    pub timeout: Duration,
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-m.sandbox.paypal.com".to_owned(),
            client_id: String::new(),
            client_secret: String::new(),
            currency: "EUR".to_owned(),
            return_url: String::new(),
            cancel_url: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// PayPal Orders API client
pub struct PayPalGateway {
    config: PayPalConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    intent: &'static str,
    purchase_units: Vec<PurchaseUnit<'a>>,
    application_context: ApplicationContext<'a>,
}

#[derive(Debug, Serialize)]
struct PurchaseUnit<'a> {
    amount: OrderAmount<'a>,
    custom_id: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct OrderAmount<'a> {
    currency_code: &'a str,
    value: String,
}

#[derive(Debug, Serialize)]
struct ApplicationContext<'a> {
    return_url: &'a str,
    cancel_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    #[serde(default)]
    links: Vec<OrderLink>,
}

#[derive(Debug, Deserialize)]
struct OrderLink {
    href: String,
    rel: String,
}

impl PayPalGateway {
    /// Build a gateway client from configuration
    #[must_use]
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Fetch a short-lived access token via client credentials
    async fn access_token(&self) -> AppResult<String> {
        let url = format!("{}/v1/oauth2/token", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| AppError::payment_gateway("token request failed").with_source(e))?;

        if !response.status().is_success() {
            return Err(AppError::payment_gateway(format!(
                "token request rejected with status {}",
                response.status()
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::payment_gateway("malformed token response").with_source(e))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    async fn create_order(
        &self,
        amount: f64,
        description: &str,
        external_ref: &str,
    ) -> AppResult<CheckoutOrder> {
        let token = self.access_token().await?;

        let request = CreateOrderRequest {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                amount: OrderAmount {
                    currency_code: &self.config.currency,
                    value: format!("{amount:.2}"),
                },
                custom_id: external_ref,
                description,
            }],
            application_context: ApplicationContext {
                return_url: &self.config.return_url,
                cancel_url: &self.config.cancel_url,
            },
        };

        let url = format!("{}/v2/checkout/orders", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| AppError::payment_gateway("order creation failed").with_source(e))?;

        if !response.status().is_success() {
            return Err(AppError::payment_gateway(format!(
                "order creation rejected with status {}",
                response.status()
            )));
        }
        let order: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| AppError::payment_gateway("malformed order response").with_source(e))?;

        let approval_url = order
            .links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.clone())
            .ok_or_else(|| AppError::payment_gateway("order response carried no approval link"))?;

        Ok(CheckoutOrder {
            order_id: order.id,
            approval_url,
        })
    }
}
