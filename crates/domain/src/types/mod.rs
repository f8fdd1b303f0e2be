//! Domain types and models

pub mod entity;
pub mod menu;
pub mod roles;
pub mod search;
pub mod status;
pub mod user;

pub use entity::{Entity, EntityPatch};
pub use menu::{default_menu, default_routes, menu_from_routes, MenuNode, RouteConfig};
pub use roles::RoleSet;
pub use search::{Condition, ConditionValue, Filter, Operator, SearchParams};
pub use status::{NotificationKind, QueryStatus};
pub use user::{CreateUserDto, UpdateUserDto, User};
