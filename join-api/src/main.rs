/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Join service entry point.
//!
//! A standalone Axum service answering `POST /join` with freshly provisioned
//! meeting and attendee descriptors.

use std::sync::Arc;

use anyhow::Context;
use join_api::config::Config;
use join_api::provisioner::LocalProvisioner;
use join_api::routes;
use join_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; /join accepts unauthenticated callers");
    }

    let provisioner = Arc::new(LocalProvisioner::with_capacity(
        &config.media_base_url,
        config.meeting_capacity,
    ));
    let state = AppState::new(provisioner, &config);
    let app = routes::router().layer(routes::cors_layer()).with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("Join service listening on {}", config.listen_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
