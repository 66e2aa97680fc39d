use std::error::Error;
use std::fmt;

use warp::http::StatusCode;

/// Internal reason a session token was refused.
///
/// Only used for logging. Callers always see the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    BadSignature,
    Malformed,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::BadSignature => write!(f, "bad signature"),
            Self::Malformed => write!(f, "malformed"),
        }
    }
}

#[derive(Debug)]
pub enum RoleGateError {
    // Account errors
    DuplicateEmail,
    InvalidCredentials,

    // Auth errors
    InvalidToken(TokenRejection),
    Unauthenticated(String),
    IdentityNotFound,
    Forbidden(String),

    // Validation errors
    ValidationError(String),

    // Storage errors
    StorageError(String),

    // Configuration errors
    ConfigError(String),

    // System errors
    SystemError(String),
}

impl RoleGateError {
    /// HTTP status the transport answers with for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateEmail | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidToken(_) | Self::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::IdentityNotFound => StatusCode::NOT_FOUND,
            Self::StorageError(_) | Self::ConfigError(_) | Self::SystemError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for RoleGateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEmail => write!(f, "Email already registered"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::InvalidToken(_) => write!(f, "Invalid or expired token"),
            Self::Unauthenticated(msg) => write!(f, "{}", msg),
            Self::IdentityNotFound => write!(f, "User not found"),
            Self::Forbidden(msg) => write!(f, "{}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
        }
    }
}

impl Error for RoleGateError {}

impl warp::reject::Reject for RoleGateError {}

// Blocking hash work runs on the tokio blocking pool
impl From<tokio::task::JoinError> for RoleGateError {
    fn from(err: tokio::task::JoinError) -> Self {
        RoleGateError::SystemError(format!("Blocking task failed: {}", err))
    }
}

// Generic result type for rolegate
pub type Result<T> = std::result::Result<T, RoleGateError>;
