// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity records and the lookup seam used by the authenticator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Authoritative user record.
///
/// The password hash is never serialized into API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Numeric customer identifier
    pub customer_id: u32,
    /// Unique username
    pub username: String,
    /// Argon2 PHC hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account role
    pub role: Role,
}

/// The identity backend could not answer.
#[derive(Debug, thiserror::Error)]
#[error("identity lookup failed: {0}")]
pub struct LookupError(pub String);

/// Read access to identities by username.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Find the identity for `username`, `Ok(None)` if it does not exist.
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, LookupError>;
}
