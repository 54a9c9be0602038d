// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Signed session tokens and the service-side request filter.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to the identity service (`/auth/login`)
//! 2. [`Authenticator`] checks them against an [`IdentityLookup`] and issues an
//!    HMAC-SHA256 token through the shared [`TokenCodec`]
//! 3. Client sends `Authorization: Bearer <token>` on every request
//! 4. The edge gateway verifies it, applies path rules and injects
//!    `X-Username`/`X-Role` hints (see [`crate::gateway`])
//! 5. Each service re-verifies with [`service_auth`] and builds a
//!    [`SecurityContext`] that handlers read through [`Auth`] / [`AdminOnly`]
//!
//! ## Security
//!
//! - The signing key comes from configuration, never from source
//! - No clock-skew leeway on expiry
//! - Clients never learn which check failed

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use authenticator::{Authenticator, DEFAULT_LOOKUP_TIMEOUT};
pub use claims::{SecurityContext, TokenClaims, VerifiedClaims};
pub use error::{AuthError, VerifyError};
pub use extractor::{bearer_token, AdminOnly, Auth, BEARER_PREFIX, X_ROLE, X_USERNAME};
pub use identity::{Identity, IdentityLookup, LookupError};
pub use middleware::service_auth;
pub use roles::{Role, UnknownRole};
pub use token::{TokenCodec, TokenError, DEFAULT_TOKEN_TTL, MIN_KEY_BYTES};
