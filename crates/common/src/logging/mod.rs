//! Levelled, context-aware diagnostic sink consumed by the transport
//!
//! The transport never talks to a logging backend directly; it calls the
//! [`Logger`] it was given at construction. Formatted variants take
//! [`fmt::Arguments`] so nothing is rendered when the level filter drops
//! the record.
//!
//! Stock implementations:
//! - [`DiscardLogger`]: drops everything.
//! - [`WriterLogger`]: level-filtered line writer with a fixed prefix;
//!   [`WriterLogger::stdout`] is the process default.
//! - [`TracingLogger`]: forwards records to `tracing` for structured output.

mod sinks;
mod tracing_bridge;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use agora_rest_domain::RestError;

pub use sinks::{DiscardLogger, WriterLogger};
pub use tracing_bridge::TracingLogger;

use crate::context::Context;

/// Severity of a log record, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warn,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "err" => Ok(Self::Error),
            other => Err(RestError::Config(format!("unknown log level: {other}"))),
        }
    }
}

/// Lock-free level cell so `set_level` works through `Arc<dyn Logger>`.
#[derive(Debug)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub const fn new(level: Level) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    pub fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

/// Diagnostic sink used by every transport component.
///
/// Implementors provide the level accessors and [`Logger::write_record`];
/// the eight convenience methods filter by level before anything is
/// formatted.
pub trait Logger: Send + Sync {
    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    /// Emit a record that has already passed the level filter.
    fn write_record(&self, ctx: &Context, level: Level, module: &str, args: fmt::Arguments<'_>);

    fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    fn log(&self, ctx: &Context, level: Level, module: &str, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.write_record(ctx, level, module, args);
        }
    }

    fn debug(&self, ctx: &Context, module: &str, message: &str) {
        self.log(ctx, Level::Debug, module, format_args!("{message}"));
    }

    fn info(&self, ctx: &Context, module: &str, message: &str) {
        self.log(ctx, Level::Info, module, format_args!("{message}"));
    }

    fn warn(&self, ctx: &Context, module: &str, message: &str) {
        self.log(ctx, Level::Warn, module, format_args!("{message}"));
    }

    fn error(&self, ctx: &Context, module: &str, message: &str) {
        self.log(ctx, Level::Error, module, format_args!("{message}"));
    }

    fn debugf(&self, ctx: &Context, module: &str, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Debug, module, args);
    }

    fn infof(&self, ctx: &Context, module: &str, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Info, module, args);
    }

    fn warnf(&self, ctx: &Context, module: &str, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Warn, module, args);
    }

    fn errorf(&self, ctx: &Context, module: &str, args: fmt::Arguments<'_>) {
        self.log(ctx, Level::Error, module, args);
    }
}

static DEFAULT_LOGGER: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Process-wide default: stdout writer at `Info`, created on first use.
pub fn default_logger() -> Arc<dyn Logger> {
    DEFAULT_LOGGER.get_or_init(|| Arc::new(WriterLogger::stdout(Level::Info))).clone()
}
