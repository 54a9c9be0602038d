// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every rejection a filter or the authenticator can produce is one variant of
//! [`AuthError`]. The client only ever sees a generic body per status class;
//! the precise reason is available server-side through [`AuthError::reason`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure kinds of token verification.
///
/// When several conditions hold at once the cheapest-to-detect one wins:
/// `Malformed` before `BadSignature` before `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Structure, encoding, header or claims could not be parsed
    #[error("token is malformed")]
    Malformed,
    /// HMAC does not match the header and payload
    #[error("token signature is invalid")]
    BadSignature,
    /// `now` is past the token's expiry
    #[error("token has expired")]
    Expired,
}

/// Authentication and authorization error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization: Bearer ` header present
    #[error("authorization header is missing or not a bearer credential")]
    MissingAuth,
    /// Token is malformed
    #[error("token is malformed")]
    Malformed,
    /// Token signature is invalid
    #[error("token signature is invalid")]
    BadSignature,
    /// Token has expired
    #[error("token has expired")]
    Expired,
    /// No identity with the presented username
    #[error("user not found")]
    UserNotFound,
    /// Presented secret does not match the stored hash
    #[error("bad credentials")]
    BadCredentials,
    /// Verified caller lacks the role required for this resource
    #[error("insufficient role for this operation")]
    InsufficientRole,
    /// Identity lookup failed or timed out
    #[error("identity lookup unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Unexpected internal failure
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Server-side reason code. Never sent to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingAuth => "missing_auth",
            AuthError::Malformed => "malformed",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::UserNotFound => "user_not_found",
            AuthError::BadCredentials => "bad_credentials",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::UpstreamUnavailable(_) => "upstream_unavailable",
            AuthError::Internal(_) => "internal",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuth
            | AuthError::Malformed
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::UserNotFound
            | AuthError::BadCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::UpstreamUnavailable(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Only infrastructure failures may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::UpstreamUnavailable(_))
    }
}

impl From<VerifyError> for AuthError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Malformed => AuthError::Malformed,
            VerifyError::BadSignature => AuthError::BadSignature,
            VerifyError::Expired => AuthError::Expired,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, error_code) = match status {
            StatusCode::UNAUTHORIZED => ("Authentication required", "unauthorized"),
            StatusCode::FORBIDDEN => ("Insufficient permissions for this operation", "forbidden"),
            _ => {
                tracing::error!(reason = self.reason(), error = %self, "authentication infrastructure failure");
                ("Internal server error", "internal_error")
            }
        };
        (status, Json(AuthErrorBody { error, error_code })).into_response()
    }
}
