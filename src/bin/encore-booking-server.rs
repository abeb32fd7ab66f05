// ABOUTME: Server binary wiring configuration, logging, collaborators, and the HTTP router
// ABOUTME: Runs until SIGINT with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Booking engine server binary.

use anyhow::Result;
use clap::Parser;
use encore_booking::config::ServerConfig;
use encore_booking::context::EngineResources;
use encore_booking::gateway::{PayPalGateway, PaymentGateway};
use encore_booking::logging::LoggingConfig;
use encore_booking::notifications::{LogNotifier, Notifier};
use encore_booking::routes;
use encore_booking::store::{BookingStore, MemoryBookingStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "encore-booking-server")]
#[command(about = "Booking negotiation and payment settlement engine")]
struct Args {
    /// Override the HTTP port from the environment
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }

    let store: Arc<dyn BookingStore> = Arc::new(MemoryBookingStore::new());
    let gateway: Arc<dyn PaymentGateway> = Arc::new(PayPalGateway::new(config.paypal.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let resources = Arc::new(EngineResources::new(config.clone(), store, gateway, notifier));

    let app = routes::router(resources);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!(%addr, "booking engine listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
}
