//! Pure pruning of the navigation tree against a role set

use entigate_domain::{MenuNode, RoleSet};

/// Whether `node` itself may be shown, ignoring its children.
///
/// Hidden nodes are never shown. Full access shows everything else; otherwise
/// a node needs no roles or at least one of its roles.
pub fn can_access(node: &MenuNode, roles: &RoleSet, full_access: bool) -> bool {
    if node.is_hidden() {
        return false;
    }
    if full_access {
        return true;
    }
    let required = node.required_roles();
    required.is_empty() || roles.contains_any(required)
}

/// Prune `nodes` for `roles`, preserving sibling order.
///
/// Children are filtered recursively; a node whose child list ends up empty
/// is dropped as an empty group. Nodes without a child list are leaves and
/// are kept as they are.
pub fn filter_menu(nodes: &[MenuNode], roles: &RoleSet, full_access: bool) -> Vec<MenuNode> {
    nodes
        .iter()
        .filter(|node| can_access(node, roles, full_access))
        .filter_map(|node| {
            let items = match &node.items {
                Some(children) => {
                    let kept = filter_menu(children, roles, full_access);
                    if kept.is_empty() {
                        return None;
                    }
                    Some(kept)
                }
                None => None,
            };
            Some(MenuNode { items, ..node.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use entigate_domain::default_menu;
    use entigate_domain::roles::{ADMIN, MANAGER, REPORTS_VIEWER, USER, USERS_ADMIN};

    use super::*;

    fn roles(ids: &[&str]) -> RoleSet {
        ids.iter().copied().collect()
    }

    fn labels(nodes: &[MenuNode]) -> Vec<&str> {
        nodes.iter().map(|node| node.label.as_str()).collect()
    }

    #[test]
    fn group_without_matching_role_is_removed_with_children() {
        let menu = vec![
            MenuNode::group("A-only", vec![MenuNode::link("a", "i", "/a")]).with_roles(&["A"]),
            MenuNode::link("public", "i", "/"),
        ];

        let filtered = filter_menu(&menu, &roles(&["B"]), false);
        assert_eq!(labels(&filtered), vec!["public"]);
    }

    #[test]
    fn full_access_keeps_everything_but_hidden_nodes() {
        let menu = vec![
            MenuNode::link("hidden", "i", "/h").with_visible(false),
            MenuNode::link("restricted", "i", "/r").with_roles(&["nobody"]),
        ];

        let filtered = filter_menu(&menu, &RoleSet::new(), true);
        assert_eq!(labels(&filtered), vec!["restricted"]);
    }

    #[test]
    fn groups_emptied_by_filtering_are_dropped() {
        let menu = vec![MenuNode::group(
            "Group",
            vec![MenuNode::link("x", "i", "/x").with_roles(&[ADMIN])],
        )];
        assert!(filter_menu(&menu, &roles(&[USER]), false).is_empty());

        let empty_group = vec![MenuNode::group("Empty", vec![])];
        assert!(filter_menu(&empty_group, &roles(&[USER]), true).is_empty());
    }

    #[test]
    fn empty_role_list_means_public() {
        let node = MenuNode { roles: Some(vec![]), ..MenuNode::link("x", "i", "/x") };
        assert!(can_access(&node, &RoleSet::new(), false));
    }

    #[test]
    fn reports_viewer_sees_dashboard_and_reports() {
        let filtered = filter_menu(&default_menu(), &roles(&[REPORTS_VIEWER]), false);

        assert_eq!(labels(&filtered), vec!["Menu chính", "Quản lý"]);
        assert_eq!(labels(filtered[0].items.as_deref().unwrap_or_default()), vec!["Dashboard"]);
        assert_eq!(labels(filtered[1].items.as_deref().unwrap_or_default()), vec!["Báo cáo"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let roles = roles(&[MANAGER, USERS_ADMIN]);
        let once = filter_menu(&default_menu(), &roles, false);
        let twice = filter_menu(&once, &roles, false);
        assert_eq!(once, twice);
    }
}
