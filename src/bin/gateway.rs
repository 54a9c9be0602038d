// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Edge gateway: verifies tokens, applies path rules and relays upstream.

use std::sync::Arc;

use audiobook_auth::{
    config::{ConfigError, Settings, UPSTREAM_URL_ENV},
    gateway::{self, EdgeState, Forwarder},
    telemetry,
};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            telemetry::init(Default::default());
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    telemetry::init(settings.log_format);

    let Some(upstream) = settings.upstream_url.clone() else {
        tracing::error!(
            error = %ConfigError::Missing(UPSTREAM_URL_ENV),
            "invalid configuration"
        );
        std::process::exit(1);
    };

    if settings.rules.is_empty() {
        tracing::warn!("no authorization rules configured; every verified caller is forwarded");
    }

    let edge = EdgeState::new(
        Arc::new(settings.codec.clone()),
        settings.rules.clone(),
        settings.public_paths.clone(),
    );
    let forwarder = match Forwarder::new(upstream) {
        Ok(forwarder) => forwarder,
        Err(e) => {
            tracing::error!(error = %e, "cannot create upstream client");
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %settings.bind_addr,
        upstream = %forwarder.upstream(),
        rules = settings.rules.rules().len(),
        public_paths = ?settings.public_paths,
        "edge gateway listening"
    );

    let app = gateway::router(edge, forwarder);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .expect("Failed to bind listen address");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await
        .expect("HTTP server failed");
}
