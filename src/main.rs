// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity service: login, registration and account administration.

use audiobook_auth::{
    api::router, config::Settings, state::AppState, store::IdentityStore, telemetry,
};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            // The subscriber needs LOG_FORMAT, which lives in the settings.
            telemetry::init(Default::default());
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    telemetry::init(settings.log_format);

    let state = AppState::new(
        IdentityStore::new(),
        settings.codec.clone(),
        settings.lookup_timeout,
    );

    if let Some(seed) = &settings.seed_admin {
        if let Err(e) = state.seed_admin(&seed.username, &seed.password).await {
            tracing::error!(error = %e, "failed to create bootstrap admin");
            std::process::exit(1);
        }
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!(
        addr = %settings.bind_addr,
        token_ttl_secs = settings.codec.ttl().as_secs(),
        "identity service listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
