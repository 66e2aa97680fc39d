//! Abstract storage interface for identity persistence
//!
//! The auth engine performs no storage logic itself. Backends provide their
//! own isolation and must keep emails unique.

use async_trait::async_trait;

use crate::auth::user::{Identity, IdentityPatch, NewIdentity};
use crate::error::Result;

/// Identity storage interface
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Get identity by email
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Get identity by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>>;

    /// Create a new identity, failing with `DuplicateEmail` if the email is taken
    async fn insert(&self, identity: NewIdentity) -> Result<Identity>;

    /// Apply the set fields of `patch` atomically and return the stored result
    async fn update(&self, id: i64, patch: IdentityPatch) -> Result<Identity>;

    /// Delete an identity
    async fn delete(&self, id: i64) -> Result<()>;

    /// List all identities ordered by id
    async fn list(&self) -> Result<Vec<Identity>>;
}
