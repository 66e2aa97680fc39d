//! Authentication and authorization module

pub mod guard;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;
pub mod user;

// Re-export main components
pub use guard::{AccessGuard, AuthContext};
pub use policy::Action;
pub use roles::Role;
pub use token::{Claims, SessionClaims, TokenManager};
pub use user::{Identity, IdentityPatch, IdentityView, NewIdentity};
