//! Resource roles granted by the identity provider

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grants every menu entry.
pub const SYSTEM_FULL_ACCESS: &str = "system-full-access";
/// Baseline UI access.
pub const UI_MINIMAL: &str = "ui-minimal";
/// Administrator.
pub const ADMIN: &str = "admin";
/// Manager.
pub const MANAGER: &str = "manager";
/// Regular user.
pub const USER: &str = "user";
/// User management.
pub const USERS_ADMIN: &str = "users-admin";
/// Product management.
pub const PRODUCTS_ADMIN: &str = "products-admin";
/// Order management.
pub const ORDERS_ADMIN: &str = "orders-admin";
/// Read-only reports.
pub const REPORTS_VIEWER: &str = "reports-viewer";

/// Every role id the client recognizes; anything else in a claim is ignored.
pub const KNOWN_ROLES: [&str; 9] = [
    SYSTEM_FULL_ACCESS,
    UI_MINIMAL,
    ADMIN,
    MANAGER,
    USER,
    USERS_ADMIN,
    PRODUCTS_ADMIN,
    ORDERS_ADMIN,
    REPORTS_VIEWER,
];

/// Set of role ids held by the current session
///
/// Built once when the session starts and not mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// Empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract known roles from `claim` of an identity profile.
    ///
    /// A missing claim, a claim that is not an array, and non-string or unknown
    /// elements all contribute nothing.
    pub fn from_claims(profile: &Value, claim: &str) -> Self {
        let Some(Value::Array(values)) = profile.get(claim) else {
            return Self::default();
        };
        values
            .iter()
            .filter_map(Value::as_str)
            .filter(|role| KNOWN_ROLES.contains(role))
            .collect()
    }

    /// Whether `role` is held.
    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    /// At least one of `roles` is held.
    pub fn contains_any<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.contains(role.as_ref()))
    }

    /// Every one of `roles` is held (vacuously true for an empty slice).
    pub fn contains_all<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().all(|role| self.contains(role.as_ref()))
    }

    /// Whether no role is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of roles held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Roles in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_claims_keeps_only_known_string_roles() {
        let profile = json!({
            "sub": "abc",
            "jmix-roles": ["admin", "superuser", 7, "reports-viewer", "admin"]
        });
        let roles = RoleSet::from_claims(&profile, "jmix-roles");

        assert_eq!(roles.iter().collect::<Vec<_>>(), vec!["admin", "reports-viewer"]);
    }

    #[test]
    fn from_claims_tolerates_missing_or_malformed_claim() {
        assert!(RoleSet::from_claims(&json!({}), "jmix-roles").is_empty());
        assert!(RoleSet::from_claims(&json!({"jmix-roles": "admin"}), "jmix-roles").is_empty());
        assert!(RoleSet::from_claims(&json!(null), "jmix-roles").is_empty());
    }

    #[test]
    fn any_and_all_queries() {
        let roles: RoleSet = [MANAGER, USER].into_iter().collect();
        assert!(roles.contains_any(&[ADMIN, MANAGER]));
        assert!(!roles.contains_any(&[ADMIN]));
        assert!(roles.contains_all(&[MANAGER, USER]));
        assert!(!roles.contains_all(&[MANAGER, ADMIN]));
        assert!(roles.contains_all::<&str>(&[]));
    }
}
