use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RoleGateError;

/// Roles an identity can hold
///
/// The set is closed and carries no ordering: a role is only permitted
/// where an action explicitly lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    CEO,
    CTO,
    ProjectLead,
    Engineer,
    Developer,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 5] = [
        Role::CEO,
        Role::CTO,
        Role::ProjectLead,
        Role::Engineer,
        Role::Developer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::CEO => "CEO",
            Role::CTO => "CTO",
            Role::ProjectLead => "ProjectLead",
            Role::Engineer => "Engineer",
            Role::Developer => "Developer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleGateError::ValidationError(format!("Invalid role '{}'", s)))
    }
}
