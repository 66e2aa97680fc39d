use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::roles::Role;
use crate::config::ServerConfig;
use crate::constants::MAX_TOKEN_LENGTH;
use crate::error::{Result, RoleGateError, TokenRejection};

/// Identity facts captured into a session token at issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub subject_id: i64,
    pub email: String,
    pub role: Role,
}

/// JWT Claims structure
///
/// Identity fields are optional on the wire so that a signed token lacking a
/// subject can be told apart from a forged one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role snapshot at issuance, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a session, expiring `ttl` from now
    pub fn new(session: &SessionClaims, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            id: Some(session.subject_id),
            email: Some(session.email.clone()),
            role: Some(session.role),
            iat: now,
            exp: now.saturating_add(ttl),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }

    /// The session these claims were issued for, if every field is present
    pub fn session(&self) -> Option<SessionClaims> {
        Some(SessionClaims {
            subject_id: self.id?,
            email: self.email.clone()?,
            role: self.role?,
        })
    }
}

/// Issues and validates session tokens
///
/// Holds only immutable key material, so one instance is shared by all
/// requests without locking.
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenManager {
    /// Creates a new token manager with a secret
    pub fn new(secret: &str, algorithm: Algorithm, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expired means expired, no grace window
        validation.leeway = 0;

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_algorithm, config.token_ttl)
    }

    /// Issues a token with the configured lifetime
    pub fn issue(&self, session: &SessionClaims) -> Result<String> {
        self.issue_with_ttl(session, self.default_ttl)
    }

    /// Issues a token expiring `ttl` from now
    pub fn issue_with_ttl(&self, session: &SessionClaims, ttl: Duration) -> Result<String> {
        self.sign(&Claims::new(session, ttl))
    }

    /// Signs fully-specified claims as they are
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| RoleGateError::SystemError(format!("Failed to generate token: {}", e)))
    }

    /// Validates and decodes a token
    pub fn validate(&self, token: &str) -> Result<Claims> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(RoleGateError::InvalidToken(TokenRejection::Malformed));
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenRejection::BadSignature
                }
                _ => TokenRejection::Malformed,
            };
            log::debug!("Token rejected ({}): {}", reason, e);
            RoleGateError::InvalidToken(reason)
        })?;

        if data.claims.is_expired() {
            return Err(RoleGateError::InvalidToken(TokenRejection::Expired));
        }

        Ok(data.claims)
    }
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty()
        || token.len() > MAX_TOKEN_LENGTH
        || token.chars().any(|c| c.is_control() || c.is_whitespace())
    {
        return None;
    }

    Some(token)
}
