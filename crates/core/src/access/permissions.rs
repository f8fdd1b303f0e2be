//! Permission checks for the signed-in session

use entigate_domain::roles::SYSTEM_FULL_ACCESS;
use entigate_domain::{MenuNode, RoleSet};
use serde_json::Value;

use super::filter;

/// Role-based permission checks for one session
///
/// Built once from the identity profile; the role set does not change for
/// the lifetime of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    roles: RoleSet,
}

impl Permissions {
    /// Permissions for an already extracted role set.
    pub fn new(roles: RoleSet) -> Self {
        Self { roles }
    }

    /// Permissions from the role claim of an identity profile.
    pub fn from_profile(profile: &Value, claim: &str) -> Self {
        Self::new(RoleSet::from_claims(profile, claim))
    }

    /// Roles held by the session.
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Whether `role` is held.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Whether at least one of `roles` is held.
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        self.roles.contains_any(roles)
    }

    /// Whether every one of `roles` is held.
    pub fn has_all_roles<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        self.roles.contains_all(roles)
    }

    /// Holder of the built-in full access role.
    pub fn is_full_access(&self) -> bool {
        self.has_role(SYSTEM_FULL_ACCESS)
    }

    /// Whether `node` itself passes the menu filter for this session.
    pub fn can_access(&self, node: &MenuNode) -> bool {
        filter::can_access(node, &self.roles, self.is_full_access())
    }

    /// `nodes` pruned to what this session may see.
    pub fn filter_menu(&self, nodes: &[MenuNode]) -> Vec<MenuNode> {
        filter::filter_menu(nodes, &self.roles, self.is_full_access())
    }

    /// Route guard: any one of `required` grants entry. Routes without
    /// required roles are open.
    pub fn can_enter<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.is_empty() || self.has_any_role(required)
    }
}
