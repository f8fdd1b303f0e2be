//! Role-based visibility of navigation entries and routes

mod filter;
mod permissions;

pub use filter::{can_access, filter_menu};
pub use permissions::Permissions;
