//! Configuration loading
//!
//! This module provides utilities for loading client configuration from
//! environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load_from_env, load_from_file, load_from_vars, parse_config, ConfigFormat};
