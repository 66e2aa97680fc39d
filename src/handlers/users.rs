//! User-management handlers
//!
//! Each handler receives an already-authenticated [`AuthContext`] and applies
//! the matching role policy before touching the store.

use serde::Deserialize;

use crate::auth::password::hash_password_blocking;
use crate::auth::policy::Action;
use crate::auth::user::validate_email;
use crate::auth::{AuthContext, Identity, IdentityPatch, IdentityView, Role};
use crate::error::{Result, RoleGateError};
use crate::handlers::auth::{check_new_account, create_account};
use crate::handlers::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIdentityRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Partial update, absent or empty fields are left alone
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIdentityRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

async fn load(state: &AppState, id: i64) -> Result<Identity> {
    state
        .store
        .find_by_id(id)
        .await?
        .ok_or(RoleGateError::IdentityNotFound)
}

pub async fn create_identity(
    state: &AppState,
    context: &AuthContext,
    request: CreateIdentityRequest,
) -> Result<IdentityView> {
    context.authorize(Action::CreateIdentity)?;

    let role = check_new_account(&request.email, &request.password, &request.role)?;
    let identity = create_account(state, request.email, request.password, role).await?;

    log::info!(
        "Identity {} created identity {} as {}",
        context.identity.id,
        identity.id,
        identity.role
    );
    Ok(identity.view())
}

pub async fn list_identities(state: &AppState, context: &AuthContext) -> Result<Vec<IdentityView>> {
    context.authorize(Action::ListIdentities)?;

    Ok(state.store.list().await?.iter().map(Identity::view).collect())
}

pub async fn get_identity(
    state: &AppState,
    context: &AuthContext,
    id: i64,
) -> Result<IdentityView> {
    let target = load(state, id).await?;
    context.authorize(Action::ReadIdentity(id))?;

    Ok(target.view())
}

pub async fn update_identity(
    state: &AppState,
    context: &AuthContext,
    id: i64,
    request: UpdateIdentityRequest,
) -> Result<IdentityView> {
    load(state, id).await?;
    context.authorize(Action::UpdateIdentity(id))?;

    let role = match request.role.as_deref().filter(|r| !r.is_empty()) {
        Some(role) => Some(role.parse::<Role>()?),
        None => None,
    };

    let email = request.email.filter(|e| !e.is_empty());
    if let Some(email) = &email {
        if !validate_email(email) {
            return Err(RoleGateError::ValidationError(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
    }

    let hashed_password = match request.password.filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };

    // Uniqueness and the write itself happen under the store's lock
    let updated = state
        .store
        .update(
            id,
            IdentityPatch {
                email,
                hashed_password,
                role,
            },
        )
        .await?;

    log::info!("Identity {} updated identity {}", context.identity.id, id);
    Ok(updated.view())
}

pub async fn delete_identity(state: &AppState, context: &AuthContext, id: i64) -> Result<()> {
    context.authorize(Action::DeleteIdentity(id))?;

    state.store.delete(id).await?;

    log::info!("Identity {} deleted identity {}", context.identity.id, id);
    Ok(())
}
