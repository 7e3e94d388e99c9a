//! Resilience patterns for the transport
//!
//! Currently a single pattern: the retry kernel that drives one logical call
//! through successive regional endpoints. Policies are plain closures bound
//! by the caller to its own context and domain pool.

pub mod retry;

// Re-export retry types
pub use retry::{delay_after_first, RetryError, RetryPolicy, RetryResult, RetryVeto};
