use serde::{Deserialize, Serialize};

use crate::auth::roles::Role;

/// A stored identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique identifier assigned by the store
    pub id: i64,
    /// Email address, unique across identities
    pub email: String,
    /// PHC-formatted password digest
    pub hashed_password: String,
    pub role: Role,
}

impl Identity {
    /// Public view, without the credential digest
    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }

    /// Whether this identity owns the resource with the given id
    pub fn is_self(&self, target_id: i64) -> bool {
        self.id == target_id
    }
}

/// Identity fields before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
}

/// Field-level change to a stored identity, `None` fields are left as stored
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub role: Option<Role>,
}

/// What clients are allowed to see of an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityView {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_hides_digest() {
        let identity = Identity {
            id: 7,
            email: "a@x.com".to_string(),
            hashed_password: "$argon2id$...".to_string(),
            role: Role::Engineer,
        };
        let json = serde_json::to_value(identity.view()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "Engineer");
        assert!(json.get("hashed_password").is_none());
        assert!(identity.is_self(7));
        assert!(!identity.is_self(8));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com"));
        assert!(validate_email("first.last@sub.example.org"));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("@x.com"));
        assert!(!validate_email("a@localhost"));
        assert!(!validate_email("a@@x.com"));
        assert!(!validate_email("a b@x.com"));
        assert!(!validate_email("a@x.com."));
    }
}
