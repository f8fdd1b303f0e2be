//! Navigation menu tree and the route table it can be generated from

use serde::{Deserialize, Serialize};

use super::roles::{
    ADMIN, MANAGER, ORDERS_ADMIN, PRODUCTS_ADMIN, REPORTS_VIEWER, SYSTEM_FULL_ACCESS, USERS_ADMIN,
};

/// One entry of the navigation tree
///
/// `roles` lists alternatives: holding any one of them grants access. Absent
/// and empty role lists both mean the node is public.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Text shown in the menu.
    pub label: String,
    /// Icon class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// In-app route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// External link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Link target for `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Badge text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Roles of which any one grants access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    /// Children; `Some` marks a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<MenuNode>>,
    /// `Some(false)` hides the node regardless of roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl MenuNode {
    /// Leaf entry navigating to `to`.
    pub fn link(label: impl Into<String>, icon: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: Some(icon.into()),
            to: Some(to.into()),
            ..Self::default()
        }
    }

    /// Grouping entry with children.
    pub fn group(label: impl Into<String>, items: Vec<MenuNode>) -> Self {
        Self { label: label.into(), items: Some(items), ..Self::default() }
    }

    /// Restrict the node to `roles`.
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|role| (*role).to_string()).collect());
        self
    }

    /// Set explicit visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Roles required to see this node; empty when unrestricted.
    pub fn required_roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }

    /// Explicitly hidden.
    pub fn is_hidden(&self) -> bool {
        self.visible == Some(false)
    }
}

/// Application route, optionally surfaced in the menu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Route path.
    pub path: String,
    /// Menu label; routes without one stay out of the menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Icon class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Roles of which any one grants entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl RouteConfig {
    fn menu(path: &str, label: &str, icon: &str, roles: &[&str]) -> Self {
        Self {
            path: path.to_string(),
            label: Some(label.to_string()),
            icon: Some(icon.to_string()),
            roles: (!roles.is_empty()).then(|| roles.iter().map(|role| (*role).to_string()).collect()),
        }
    }
}

/// Routes registered by the application shell.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig { path: "/auth/callback".to_string(), ..RouteConfig::default() },
        RouteConfig::menu("/", "Dashboard", "pi pi-home", &[]),
        RouteConfig::menu("/users", "Người dùng", "pi pi-users", &[SYSTEM_FULL_ACCESS, ADMIN]),
        RouteConfig::menu(
            "/profile",
            "Thông tin cá nhân",
            "pi pi-user",
            &[SYSTEM_FULL_ACCESS, ADMIN],
        ),
    ]
}

/// Flat menu of every labelled route, in route order.
pub fn menu_from_routes(routes: &[RouteConfig]) -> Vec<MenuNode> {
    routes
        .iter()
        .filter_map(|route| {
            let label = route.label.as_ref()?;
            Some(MenuNode {
                label: label.clone(),
                icon: route.icon.clone(),
                to: Some(route.path.clone()),
                roles: route.roles.clone(),
                visible: Some(true),
                ..MenuNode::default()
            })
        })
        .collect()
}

/// The navigation tree shown in the sidebar before permission filtering.
pub fn default_menu() -> Vec<MenuNode> {
    vec![
        MenuNode::group(
            "Menu chính",
            vec![
                MenuNode::link("Dashboard", "pi pi-home", "/"),
                MenuNode::link("Người dùng", "pi pi-users", "/users").with_roles(&[
                    USERS_ADMIN,
                    ADMIN,
                    SYSTEM_FULL_ACCESS,
                ]),
            ],
        ),
        MenuNode::group(
            "Quản lý",
            vec![
                MenuNode::link("Sản phẩm", "pi pi-box", "/products").with_roles(&[
                    PRODUCTS_ADMIN,
                    MANAGER,
                    ADMIN,
                    SYSTEM_FULL_ACCESS,
                ]),
                MenuNode::link("Đơn hàng", "pi pi-shopping-cart", "/orders").with_roles(&[
                    ORDERS_ADMIN,
                    MANAGER,
                    ADMIN,
                    SYSTEM_FULL_ACCESS,
                ]),
                MenuNode::link("Báo cáo", "pi pi-chart-bar", "/reports").with_roles(&[
                    REPORTS_VIEWER,
                    MANAGER,
                    ADMIN,
                    SYSTEM_FULL_ACCESS,
                ]),
            ],
        )
        .with_roles(&[
            PRODUCTS_ADMIN,
            ORDERS_ADMIN,
            REPORTS_VIEWER,
            MANAGER,
            ADMIN,
            SYSTEM_FULL_ACCESS,
        ]),
        MenuNode::group(
            "Hệ thống",
            vec![MenuNode::link("Cài đặt", "pi pi-cog", "/settings")
                .with_roles(&[ADMIN, SYSTEM_FULL_ACCESS])],
        )
        .with_roles(&[ADMIN, SYSTEM_FULL_ACCESS]),
    ]
}
