// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and Axum extractors for the security context.
//!
//! Handlers behind the service filter read the caller with:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx is SecurityContext
//! }
//! ```
//!
//! Both extractors only read the [`SecurityContext`] the service filter put in
//! the request extensions. They never look at `X-Username`/`X-Role`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, SecurityContext};

/// Required scheme prefix (case-sensitive, one space).
pub const BEARER_PREFIX: &str = "Bearer ";

/// Identity hint header injected by the edge.
pub const X_USERNAME: &str = "x-username";

/// Role hint header injected by the edge.
pub const X_ROLE: &str = "x-role";

/// Pull the raw token out of `Authorization: Bearer <token>`.
///
/// Anything other than exactly one header starting with `Bearer ` is
/// [`AuthError::MissingAuth`]. The remainder is returned untrimmed.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::MissingAuth)?
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingAuth)
}

/// Extractor for the verified caller.
pub struct Auth(pub SecurityContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub SecurityContext);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(ctx) = Auth::from_request_parts(parts, state).await?;

        if !ctx.is_admin() {
            return Err(AuthError::InsufficientRole);
        }

        Ok(AdminOnly(ctx))
    }
}
