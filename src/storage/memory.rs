//! In-memory storage implementation for development and testing
//!
//! Keeps every identity in memory behind a single lock, so the id map and
//! the email index never disagree.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::IdentityStore;
use crate::auth::user::{Identity, IdentityPatch, NewIdentity};
use crate::error::{Result, RoleGateError};

#[derive(Default)]
struct Tables {
    identities: BTreeMap<i64, Identity>,
    by_email: HashMap<String, i64>,
    next_id: i64,
}

/// In-memory identity storage
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.identities.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.identities.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>> {
        Ok(self.tables.read().await.identities.get(&id).cloned())
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity> {
        let mut tables = self.tables.write().await;

        if tables.by_email.contains_key(&identity.email) {
            return Err(RoleGateError::DuplicateEmail);
        }

        tables.next_id += 1;
        let stored = Identity {
            id: tables.next_id,
            email: identity.email,
            hashed_password: identity.hashed_password,
            role: identity.role,
        };

        tables.by_email.insert(stored.email.clone(), stored.id);
        tables.identities.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, patch: IdentityPatch) -> Result<Identity> {
        let mut tables = self.tables.write().await;

        let previous_email = match tables.identities.get(&id) {
            Some(existing) => existing.email.clone(),
            None => return Err(RoleGateError::IdentityNotFound),
        };

        if let Some(email) = &patch.email {
            if *email != previous_email {
                if tables.by_email.contains_key(email) {
                    return Err(RoleGateError::DuplicateEmail);
                }
                tables.by_email.remove(&previous_email);
                tables.by_email.insert(email.clone(), id);
            }
        }

        let stored = tables
            .identities
            .get_mut(&id)
            .ok_or(RoleGateError::IdentityNotFound)?;
        if let Some(email) = patch.email {
            stored.email = email;
        }
        if let Some(hashed_password) = patch.hashed_password {
            stored.hashed_password = hashed_password;
        }
        if let Some(role) = patch.role {
            stored.role = role;
        }

        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;

        match tables.identities.remove(&id) {
            Some(removed) => {
                tables.by_email.remove(&removed.email);
                Ok(())
            }
            None => Err(RoleGateError::IdentityNotFound),
        }
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        Ok(self.tables.read().await.identities.values().cloned().collect())
    }
}
