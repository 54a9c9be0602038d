// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Edge Gateway
//!
//! Coarse, path-scoped checks in front of every backend service. The edge
//! verifies the bearer token, applies [`RuleSet`] and forwards with
//! `X-Username`/`X-Role` hints. Services still re-verify on their own.

pub mod filter;
pub mod forward;
pub mod path;
pub mod rules;

pub use filter::{request_auth, role_auth, EdgeState};
pub use forward::{Forwarder, MAX_FORWARD_BODY};
pub use path::canonical_path;
pub use rules::{AuthorizationRule, RuleParseError, RuleSet};

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Edge router: every path runs [`role_auth`] and is then relayed upstream.
///
/// `/health/live` is answered by the gateway itself.
pub fn router(edge: EdgeState, forwarder: Forwarder) -> Router {
    Router::new()
        .route("/health/live", get(crate::api::health::liveness))
        .fallback(forward::forward)
        .with_state(forwarder)
        .layer(from_fn_with_state(edge, role_auth))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenCodec, DEFAULT_TOKEN_TTL};
    use axum::{body::Body, http::{Request, StatusCode}};
    use std::sync::Arc;
    use tower::ServiceExt;
    use url::Url;

    fn app(public_paths: Vec<String>) -> Router {
        let codec = TokenCodec::new(b"gateway-router-test-key-32-bytes", DEFAULT_TOKEN_TTL).unwrap();
        let edge = EdgeState::new(Arc::new(codec), RuleSet::default(), public_paths);
        let forwarder = Forwarder::new(Url::parse("http://127.0.0.1:1").unwrap()).unwrap();
        router(edge, forwarder)
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn liveness_is_local_on_public_path() {
        let response = app(vec!["/health".into()])
            .oneshot(get("/health/live"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn everything_else_needs_a_token() {
        let response = app(vec![]).oneshot(get("/catalogue/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn dot_segments_cannot_climb_out_of_public_paths() {
        for path in ["/health/../admin/x", "/health/%2e%2e/admin/x"] {
            let response = app(vec!["/health".into()]).oneshot(get(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        }
    }
}
