//! Access guard
//!
//! The single chokepoint for protected operations: token extraction,
//! validation, identity resolution, then a role policy check by the handler.

use std::sync::Arc;

use crate::auth::policy::{self, Action};
use crate::auth::token::{extract_bearer_token, Claims, TokenManager};
use crate::auth::user::Identity;
use crate::error::{Result, RoleGateError};
use crate::storage::IdentityStore;

/// A request whose token checked out and whose identity still exists
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Identity as currently stored, authoritative for every decision
    pub identity: Identity,
    /// Claims as issued, informational only
    pub claims: Claims,
}

impl AuthContext {
    /// Apply the role policy for `action` to the stored identity
    pub fn authorize(&self, action: Action) -> Result<()> {
        policy::authorize(&self.identity, action)
    }
}

/// Resolves an `Authorization` header into an [`AuthContext`]
#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenManager>,
    store: Arc<dyn IdentityStore>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenManager>, store: Arc<dyn IdentityStore>) -> Self {
        Self { tokens, store }
    }

    /// Authenticate a request from its raw `Authorization` header
    pub async fn resolve(&self, auth_header: Option<&str>) -> Result<AuthContext> {
        let header = auth_header
            .ok_or_else(|| RoleGateError::Unauthenticated("Not authenticated".to_string()))?;

        let token = extract_bearer_token(header).ok_or_else(|| {
            log::debug!("Authorization header is not a usable bearer token");
            RoleGateError::Unauthenticated("Invalid authentication credentials".to_string())
        })?;

        let claims = self.tokens.validate(token).map_err(|e| {
            if let RoleGateError::InvalidToken(reason) = &e {
                log::warn!("Session token rejected: {}", reason);
            }
            RoleGateError::Unauthenticated(e.to_string())
        })?;

        let subject_id = claims.id.ok_or_else(|| {
            log::warn!("Session token carries no subject id");
            RoleGateError::Unauthenticated("Token invalid - missing user id".to_string())
        })?;

        let identity = self.store.find_by_id(subject_id).await?.ok_or_else(|| {
            log::info!("Token subject {} no longer exists", subject_id);
            RoleGateError::IdentityNotFound
        })?;

        if claims.role != Some(identity.role) {
            log::debug!(
                "Token role {:?} for identity {} differs from stored role {}",
                claims.role,
                identity.id,
                identity.role
            );
        }

        Ok(AuthContext { identity, claims })
    }

    /// Authenticate, then apply the role policy for `action`
    pub async fn require(&self, auth_header: Option<&str>, action: Action) -> Result<AuthContext> {
        let context = self.resolve(auth_header).await?;
        context.authorize(action)?;
        Ok(context)
    }
}
