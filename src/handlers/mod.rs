//! Request handlers for the account and user-management endpoints
//!
//! Handlers are plain async functions over [`AppState`]; the warp wiring
//! lives in [`crate::routes`].

pub mod auth;
pub mod users;

use std::sync::Arc;

use crate::auth::{AccessGuard, TokenManager};
use crate::config::ServerConfig;
use crate::storage::IdentityStore;

/// Shared, read-only handles every request works with
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenManager>,
    pub store: Arc<dyn IdentityStore>,
    pub guard: AccessGuard,
}

impl AppState {
    pub fn new(tokens: Arc<TokenManager>, store: Arc<dyn IdentityStore>) -> Self {
        let guard = AccessGuard::new(tokens.clone(), store.clone());
        Self {
            tokens,
            store,
            guard,
        }
    }

    pub fn from_config(config: &ServerConfig, store: Arc<dyn IdentityStore>) -> Self {
        Self::new(Arc::new(TokenManager::from_config(config)), store)
    }
}
