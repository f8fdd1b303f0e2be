//! Entity collections exposed to the UI

pub mod ports;
mod service;

pub use service::EntityService;
