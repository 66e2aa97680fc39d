//! Role policy
//!
//! Every protected action declares an explicit set of roles. Roles are not
//! ranked, so a role only passes where it is listed. Self-access and
//! outright exclusions are separate named predicates rather than extra
//! members of a set.

use crate::auth::roles::Role;
use crate::auth::user::Identity;
use crate::error::{Result, RoleGateError};

pub const LIST_IDENTITIES: &[Role] = &[Role::CEO, Role::CTO, Role::ProjectLead];
pub const READ_ANY_IDENTITY: &[Role] = &[Role::CEO, Role::CTO, Role::ProjectLead, Role::Developer];
pub const UPDATE_ANY_IDENTITY: &[Role] = &[Role::CEO, Role::CTO, Role::Developer];
pub const UPDATE_EXCLUDED: &[Role] = &[Role::ProjectLead];
pub const CREATE_EXCLUDED: &[Role] = &[Role::CTO];
pub const DELETE_IDENTITY: &[Role] = &[Role::CEO];
pub const ADMIN_AREA: &[Role] = &[Role::CEO, Role::CTO];

/// Protected operations, with their target where one exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListIdentities,
    ReadIdentity(i64),
    CreateIdentity,
    UpdateIdentity(i64),
    DeleteIdentity(i64),
    AdminArea,
}

/// Plain membership. An empty set or a missing role denies.
pub fn is_allowed(role: Option<Role>, allowed: &[Role]) -> bool {
    role.is_some_and(|role| allowed.contains(&role))
}

/// Permitted when acting on oneself, or when the role is listed
pub fn is_self_or_allowed(actor: &Identity, target_id: i64, allowed: &[Role]) -> bool {
    actor.is_self(target_id) || is_allowed(Some(actor.role), allowed)
}

/// Explicit negative exception for an action
pub fn is_excluded(role: Role, denied: &[Role]) -> bool {
    denied.contains(&role)
}

pub fn can_list_identities(actor: &Identity) -> bool {
    is_allowed(Some(actor.role), LIST_IDENTITIES)
}

pub fn can_read_identity(actor: &Identity, target_id: i64) -> bool {
    is_self_or_allowed(actor, target_id, READ_ANY_IDENTITY)
}

pub fn can_create_identity(actor: &Identity) -> bool {
    !is_excluded(actor.role, CREATE_EXCLUDED)
}

pub fn can_update_identity(actor: &Identity, target_id: i64) -> bool {
    !is_excluded(actor.role, UPDATE_EXCLUDED)
        && is_self_or_allowed(actor, target_id, UPDATE_ANY_IDENTITY)
}

pub fn can_delete_identity(actor: &Identity) -> bool {
    is_allowed(Some(actor.role), DELETE_IDENTITY)
}

pub fn can_enter_admin_area(actor: &Identity) -> bool {
    is_allowed(Some(actor.role), ADMIN_AREA)
}

fn required_roles(allowed: &[Role]) -> String {
    allowed
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decide whether `actor` may perform `action`
///
/// `actor` must carry the role currently held in the store.
pub fn authorize(actor: &Identity, action: Action) -> Result<()> {
    let denial = match action {
        Action::ListIdentities if !can_list_identities(actor) => Some(format!(
            "Access denied. Required roles: [{}]",
            required_roles(LIST_IDENTITIES)
        )),
        Action::ReadIdentity(target) if !can_read_identity(actor, target) => Some(format!(
            "{} can only view their own profile",
            actor.role
        )),
        Action::CreateIdentity if !can_create_identity(actor) => {
            Some(format!("{} cannot create users", actor.role))
        }
        Action::UpdateIdentity(_) if is_excluded(actor.role, UPDATE_EXCLUDED) => {
            Some(format!("{} cannot update users", actor.role))
        }
        Action::UpdateIdentity(target) if !can_update_identity(actor, target) => Some(format!(
            "{} can only update their own profile",
            actor.role
        )),
        Action::DeleteIdentity(_) if !can_delete_identity(actor) => Some(format!(
            "Access denied. Required roles: [{}]",
            required_roles(DELETE_IDENTITY)
        )),
        Action::AdminArea if !can_enter_admin_area(actor) => Some(format!(
            "Access denied. Required roles: [{}]",
            required_roles(ADMIN_AREA)
        )),
        _ => None,
    };

    match denial {
        Some(reason) => {
            log::warn!(
                "Permission denied: identity {} ({}) attempted {:?}",
                actor.id,
                actor.role,
                action
            );
            Err(RoleGateError::Forbidden(reason))
        }
        None => Ok(()),
    }
}
