// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory identity store.
//!
//! Backs the identity service when no external user database is wired in.
//! Usernames are unique; customer ids are assigned sequentially from 1 and
//! never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::{Identity, IdentityLookup, LookupError, Role};
use crate::error::ApiError;

#[derive(Default)]
pub struct IdentityStore {
    identities: BTreeMap<u32, Identity>,
    next_customer_id: u32,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self {
            identities: BTreeMap::new(),
            next_customer_id: 1,
        }
    }

    /// Insert a new identity with an already hashed password.
    pub fn insert(
        &mut self,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Result<Identity, ApiError> {
        let username = username.into();
        if self.by_username(&username).is_some() {
            return Err(ApiError::conflict(format!(
                "User with username {username} already exists"
            )));
        }

        let customer_id = self.next_customer_id.max(1);
        self.next_customer_id = customer_id + 1;

        let identity = Identity {
            customer_id,
            username,
            password_hash: password_hash.into(),
            role,
        };
        self.identities.insert(customer_id, identity.clone());
        Ok(identity)
    }

    pub fn by_username(&self, username: &str) -> Option<&Identity> {
        self.identities.values().find(|i| i.username == username)
    }

    pub fn by_customer_id(&self, customer_id: u32) -> Result<Identity, ApiError> {
        self.identities
            .get(&customer_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("User with ID {customer_id} does not exist")))
    }

    /// All identities ordered by customer id.
    pub fn list(&self) -> Vec<Identity> {
        self.identities.values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.identities.len()
    }

    pub fn delete(&mut self, customer_id: u32) -> Result<(), ApiError> {
        self.identities
            .remove(&customer_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(format!("User with ID {customer_id} does not exist")))
    }

    pub fn update_role(&mut self, customer_id: u32, role: Role) -> Result<Identity, ApiError> {
        let identity = self
            .identities
            .get_mut(&customer_id)
            .ok_or_else(|| ApiError::not_found(format!("User not found with ID: {customer_id}")))?;
        identity.role = role;
        Ok(identity.clone())
    }
}

#[async_trait]
impl IdentityLookup for RwLock<IdentityStore> {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, LookupError> {
        Ok(self.read().await.by_username(username).cloned())
    }
}
