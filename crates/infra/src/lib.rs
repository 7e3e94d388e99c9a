//! # Agora REST Infrastructure
//!
//! The I/O side of the regional REST transport.
//!
//! This crate contains:
//! - The DNS race that picks a resolvable domain suffix
//! - The domain pool (suffix selection + regional prefix rotation)
//! - Request credentials
//! - The HTTP driver with region failover, and its sender seam
//! - The response envelope and typed decoding
//! - Service path scoping and configuration loading
//!
//! ## Architecture
//! - Depends on `agora-rest-domain` for types and errors
//! - Depends on `agora-rest-common` for context, logging and retry
//! - Contains all network I/O

pub mod config;
pub mod credentials;
pub mod dns;
pub mod domain_pool;
pub mod errors;
pub mod http;
pub mod service;

// Re-export commonly used items
pub use credentials::{BasicAuthCredential, Credential};
pub use dns::{DnsResolver, HostResolver, SystemHostResolver};
pub use domain_pool::DomainPool;
pub use http::*;
pub use service::ServiceClient;
