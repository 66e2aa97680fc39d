//! Server configuration module
//! Handles the environment-provided settings consumed by the auth engine

use jsonwebtoken::Algorithm;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_HOST, DEFAULT_JWT_ALGORITHM, DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS, MIN_SECRET_LENGTH,
};
use crate::error::{Result, RoleGateError};

/// Server configuration parameters
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Secret for session token signing/validation
    pub jwt_secret: String,
    /// HMAC algorithm used to sign session tokens
    pub jwt_algorithm: Algorithm,
    /// Default lifetime of an issued session token
    pub token_ttl: Duration,
    /// Development mode (weak secrets only produce a warning)
    pub development_mode: bool,
}

// The signing secret never reaches logs
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("token_ttl", &self.token_ttl)
            .field("development_mode", &self.development_mode)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: "test-jwt-secret-only-for-unit-tests-never-use-in-production".to_string(),
            jwt_algorithm: Algorithm::HS256,
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            development_mode: true,
        }
    }

    /// Validate that a secret meets security requirements
    fn validate_secret(secret: &str) -> Result<()> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(RoleGateError::ConfigError(format!(
                "SECRET_KEY must be at least {} characters long",
                MIN_SECRET_LENGTH
            )));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "supersecretkey",
            "your-secret-key",
            "change-this",
            "changeme",
            "test-secret",
            "default",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if secret.to_lowercase().contains(pattern) {
                return Err(RoleGateError::ConfigError(format!(
                    "SECRET_KEY contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RoleGateError::ConfigError(
                "SECRET_KEY should contain mixed characters (letters, numbers, symbols)".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse a signing algorithm name, only symmetric MACs are accepted
    pub fn parse_algorithm(name: &str) -> Result<Algorithm> {
        let algorithm = Algorithm::from_str(name.trim()).map_err(|_| {
            RoleGateError::ConfigError(format!("Unknown signing algorithm '{}'", name))
        })?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => Err(RoleGateError::ConfigError(format!(
                "Signing algorithm {:?} is not supported, use HS256, HS384 or HS512",
                other
            ))),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let either = |primary: &str, fallback: &str| lookup(primary).or_else(|| lookup(fallback));

        let host = lookup("ROLEGATE_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = match lookup("ROLEGATE_PORT") {
            Some(p) => p.parse().map_err(|_| {
                RoleGateError::ConfigError(format!("ROLEGATE_PORT is not a valid port: {}", p))
            })?,
            None => DEFAULT_PORT,
        };

        let development_mode = lookup("ROLEGATE_DEVELOPMENT_MODE")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false); // SECURITY: Default to false (production mode)

        let jwt_secret = either("ROLEGATE_SECRET_KEY", "SECRET_KEY").ok_or_else(|| {
            RoleGateError::ConfigError(
                "SECRET_KEY environment variable is required for security. \
                 Generate one with: openssl rand -base64 32"
                    .to_string(),
            )
        })?;

        if let Err(e) = Self::validate_secret(&jwt_secret) {
            if development_mode && !jwt_secret.is_empty() {
                log::warn!("Development mode: accepting weak signing secret ({})", e);
            } else {
                return Err(e);
            }
        }

        let jwt_algorithm = Self::parse_algorithm(
            &either("ROLEGATE_ALGORITHM", "ALGORITHM")
                .unwrap_or(DEFAULT_JWT_ALGORITHM.to_string()),
        )?;

        let ttl_secs = match either(
            "ROLEGATE_ACCESS_TOKEN_EXPIRE_SECONDS",
            "ACCESS_TOKEN_EXPIRE_SECONDS",
        ) {
            Some(t) => t.parse::<u64>().map_err(|_| {
                RoleGateError::ConfigError(format!(
                    "ACCESS_TOKEN_EXPIRE_SECONDS must be a positive integer, got '{}'",
                    t
                ))
            })?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        if ttl_secs == 0 {
            return Err(RoleGateError::ConfigError(
                "ACCESS_TOKEN_EXPIRE_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            jwt_secret,
            jwt_algorithm,
            token_ttl: Duration::from_secs(ttl_secs),
            development_mode,
        })
    }
}
