//! HTTP plumbing: the reqwest client and the authenticated transport

pub mod client;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use transport::{
    RequestAttempt, RequestDescriptor, Transport, TransportResponse, TransportState,
};
