//! Shared runtime utilities for the Agora REST transport crates.
//!
//! # Modules
//!
//! - [`context`]: cancellation + deadline scope carried by every call
//! - [`logging`]: the levelled [`Logger`] interface and its stock sinks
//! - [`resilience`]: the retry kernel with injectable policies

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod context;
pub mod logging;
pub mod resilience;

// Re-export commonly used types and traits for convenience
pub use context::Context;
pub use logging::{default_logger, DiscardLogger, Level, Logger, TracingLogger, WriterLogger};
pub use resilience::{RetryError, RetryPolicy, RetryResult, RetryVeto};
