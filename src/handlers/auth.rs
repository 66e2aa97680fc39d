//! Registration, login and current-identity handlers

use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::policy::Action;
use crate::auth::user::validate_email;
use crate::auth::{AuthContext, Identity, IdentityView, NewIdentity, Role, SessionClaims};
use crate::constants::TOKEN_TYPE;
use crate::error::{Result, RoleGateError};
use crate::handlers::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub message: String,
    pub id: i64,
    pub role: Role,
}

/// Validated fields shared by registration and user creation
pub(crate) fn check_new_account(email: &str, password: &str, role: &str) -> Result<Role> {
    if !validate_email(email) {
        return Err(RoleGateError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    if password.is_empty() {
        return Err(RoleGateError::ValidationError(
            "Password must not be empty".to_string(),
        ));
    }
    role.parse()
}

/// Hash and store a new identity
pub(crate) async fn create_account(
    state: &AppState,
    email: String,
    password: String,
    role: Role,
) -> Result<Identity> {
    if state.store.find_by_email(&email).await?.is_some() {
        return Err(RoleGateError::DuplicateEmail);
    }

    let hashed_password = hash_password_blocking(password).await?;
    state
        .store
        .insert(NewIdentity {
            email,
            hashed_password,
            role,
        })
        .await
}

/// Open registration
pub async fn register(state: &AppState, request: RegisterRequest) -> Result<RegisterResponse> {
    let role = check_new_account(&request.email, &request.password, &request.role)?;
    let identity = create_account(state, request.email, request.password, role).await?;

    log::info!("Registered identity {} as {}", identity.id, identity.role);
    Ok(RegisterResponse {
        message: "User registered".to_string(),
        user_id: identity.id,
    })
}

/// Exchange credentials for a session token
pub async fn login(state: &AppState, request: LoginRequest) -> Result<TokenResponse> {
    let identity = state.store.find_by_email(&request.email).await?;
    let stored_digest = identity.as_ref().map(|i| i.hashed_password.clone());
    let verified = verify_password_blocking(request.password, stored_digest).await?;

    let identity = match identity {
        Some(identity) if verified => identity,
        _ => {
            log::warn!("Failed login attempt");
            return Err(RoleGateError::InvalidCredentials);
        }
    };

    let access_token = state.tokens.issue(&SessionClaims {
        subject_id: identity.id,
        email: identity.email.clone(),
        role: identity.role,
    })?;

    log::info!("Issued session token for identity {}", identity.id);
    Ok(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    })
}

/// The authenticated identity
pub fn me(context: &AuthContext) -> IdentityView {
    context.identity.view()
}

pub fn profile(context: &AuthContext) -> ProfileResponse {
    ProfileResponse {
        message: format!("Hello {}", context.identity.email),
        id: context.identity.id,
        role: context.identity.role,
    }
}

pub fn admin_area(context: &AuthContext) -> Result<MessageResponse> {
    context.authorize(Action::AdminArea)?;
    Ok(MessageResponse {
        message: format!("Admin Access Granted: {}", context.identity.email),
    })
}
