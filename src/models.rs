// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the identity service. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI.
//!
//! ## Model Categories
//!
//! - **Login**: credentials in, token plus user record out
//! - **Registration**: new listener accounts
//! - **Administration**: role changes and counts

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Identity, Role};

// =============================================================================
// Login
// =============================================================================

/// Username and plaintext secret presented at login.
///
/// Exists only for the duration of one login request. `password` is accepted
/// as an alias of `secret`.
#[derive(Clone, Deserialize, ToSchema)]
pub struct Credential {
    pub username: String,
    #[serde(alias = "password")]
    pub secret: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed bearer token
    pub token: String,
    /// The authenticated user's record (without password hash)
    pub user_data: Identity,
}

// =============================================================================
// Registration
// =============================================================================

/// Request body for creating a listener account.
#[derive(Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Administration
// =============================================================================

/// Request body for changing a user's role.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Number of registered users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCountResponse {
    pub count: usize,
}
