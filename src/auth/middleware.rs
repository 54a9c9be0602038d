// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-service authentication middleware for Axum.
//!
//! Every backend service runs this filter itself instead of trusting the
//! identity headers the edge injected: anything that can reach the service
//! directly can also forge `X-Username`/`X-Role`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/admin/users", get(list_users))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         codec.clone(),
//!         service_auth,
//!     ));
//! ```
//!
//! Handlers then take [`Auth`](super::Auth) or [`AdminOnly`](super::AdminOnly).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{bearer_token, AuthError, SecurityContext, TokenCodec};

/// Service authentication middleware function.
///
/// On success the request carries a fresh [`SecurityContext`] in its
/// extensions; on failure the handler is never invoked and the caller gets 401.
pub async fn service_auth(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&codec, &request) {
        Ok(ctx) => {
            tracing::debug!(username = %ctx.username, role = %ctx.role, "request authenticated");
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                path = %request.uri().path(),
                reason = e.reason(),
                "request rejected by service filter"
            );
            e.into_response()
        }
    }
}

fn authenticate(codec: &TokenCodec, request: &Request) -> Result<SecurityContext, AuthError> {
    let token = bearer_token(request.headers())?;
    let claims = codec.verify_now(token)?;
    SecurityContext::from_claims(claims)
}
