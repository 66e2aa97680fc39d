//! Rolegate - role-based authentication and user management
//!
//! This library provides credential hashing, signed session tokens, a fixed
//! role policy and an access guard that gates every protected operation,
//! plus the warp routes that expose them.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use error::{Result, RoleGateError};
