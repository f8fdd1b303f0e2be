//! Bearer token access for outgoing requests

mod gate;
pub mod ports;

pub use gate::TokenGate;
