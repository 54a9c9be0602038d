// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification and token issuance.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use super::{
    identity::IdentityLookup,
    password::{hash_password, verify_password, PasswordError},
    AuthError, TokenCodec,
};
use crate::models::{AuthResponse, Credential};

/// Default deadline for the identity lookup during login.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Checked in place of a stored hash when the username is unknown, so both
/// outcomes cost one Argon2 verification.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("decoy-credential-never-issued").ok());

/// Verifies credentials against an [`IdentityLookup`] and issues tokens.
///
/// No attempt counters or lockout are kept; every login is independent.
#[derive(Clone)]
pub struct Authenticator {
    lookup: Arc<dyn IdentityLookup>,
    codec: Arc<TokenCodec>,
    lookup_timeout: Duration,
}

impl Authenticator {
    pub fn new(lookup: Arc<dyn IdentityLookup>, codec: Arc<TokenCodec>) -> Self {
        Self {
            lookup,
            codec,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Set the identity lookup deadline.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Authenticate `credential` and return a fresh token with the identity.
    pub async fn login(&self, credential: Credential) -> Result<AuthResponse, AuthError> {
        let lookup = self.lookup.find_by_username(&credential.username);
        let identity = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Err(_) => {
                return Err(AuthError::UpstreamUnavailable(format!(
                    "identity lookup exceeded {:?}",
                    self.lookup_timeout
                )))
            }
            Ok(Err(e)) => return Err(AuthError::UpstreamUnavailable(e.to_string())),
            Ok(Ok(None)) => {
                verify_decoy(credential.secret).await;
                return Err(AuthError::UserNotFound);
            }
            Ok(Ok(Some(identity))) => identity,
        };

        // Argon2 verification is CPU-bound and runs on the blocking pool.
        let secret = credential.secret;
        let hash = identity.password_hash.clone();
        let verdict = tokio::task::spawn_blocking(move || verify_password(&secret, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("password check aborted: {e}")))?;

        match verdict {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(AuthError::BadCredentials),
            Err(e) => {
                return Err(AuthError::Internal(format!(
                    "stored credential for customer {} unusable: {e}",
                    identity.customer_id
                )))
            }
        }

        let token = self
            .codec
            .issue_now(&identity.username, identity.role.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(username = %identity.username, role = %identity.role, "login succeeded");

        Ok(AuthResponse {
            token,
            user_data: identity,
        })
    }
}

async fn verify_decoy(secret: String) {
    let checked = tokio::task::spawn_blocking(move || match DECOY_HASH.as_deref() {
        Some(hash) => verify_password(&secret, hash).is_err(),
        None => false,
    })
    .await;
    if !matches!(checked, Ok(true)) {
        tracing::warn!("decoy password check did not run");
    }
}
