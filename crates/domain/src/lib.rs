//! # Agora REST Domain
//!
//! Domain types shared by the REST transport crates.
//!
//! This crate contains:
//! - Region areas and their endpoint tables
//! - The transport error taxonomy and Result definition
//! - Client configuration structures
//! - Transport constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod region;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use region::RegionArea;
