// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::{
    auth::{password::hash_password, Authenticator, Identity, Role, TokenCodec},
    error::ApiError,
    store::IdentityStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<IdentityStore>>,
    pub codec: Arc<TokenCodec>,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(store: IdentityStore, codec: TokenCodec, lookup_timeout: Duration) -> Self {
        let store = Arc::new(RwLock::new(store));
        let codec = Arc::new(codec);
        let authenticator = Authenticator::new(store.clone(), codec.clone())
            .with_lookup_timeout(lookup_timeout);
        Self {
            store,
            codec,
            authenticator,
        }
    }

    /// Hash `password` off the async runtime and store a new identity.
    pub async fn create_identity(
        &self,
        username: String,
        password: String,
        role: Role,
    ) -> Result<Identity, ApiError> {
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ApiError::internal(format!("password hashing aborted: {e}")))?
            .map_err(|e| ApiError::internal(e.to_string()))?;

        self.store.write().await.insert(username, hash, role)
    }

    /// Create the bootstrap administrator unless the username is taken.
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<(), ApiError> {
        if self.store.read().await.by_username(username).is_some() {
            tracing::info!(username, "bootstrap admin already present");
            return Ok(());
        }
        let identity = self
            .create_identity(username.to_string(), password.to_string(), Role::Admin)
            .await?;
        tracing::info!(
            username = %identity.username,
            customer_id = identity.customer_id,
            "bootstrap admin created"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let codec = TokenCodec::new(b"identity-service-test-key-32byte", crate::auth::DEFAULT_TOKEN_TTL)
        .expect("test key is long enough");
    AppState::new(IdentityStore::new(), codec, crate::auth::DEFAULT_LOOKUP_TIMEOUT)
}
