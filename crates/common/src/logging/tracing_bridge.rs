use std::fmt;

use tracing::{debug, error, info, warn};

use super::{AtomicLevel, Level, Logger};
use crate::context::Context;

/// Forwards transport records to `tracing` as structured events.
///
/// The level cell only pre-filters; the installed subscriber still applies
/// its own filter.
#[derive(Debug)]
pub struct TracingLogger {
    level: AtomicLevel,
}

impl TracingLogger {
    pub const fn new(level: Level) -> Self {
        Self { level: AtomicLevel::new(level) }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

impl Logger for TracingLogger {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn write_record(&self, ctx: &Context, level: Level, module: &str, args: fmt::Arguments<'_>) {
        let request_id = ctx.request_id().unwrap_or_default();
        match level {
            Level::Debug => debug!(module, request_id, "{}", args),
            Level::Info => info!(module, request_id, "{}", args),
            Level::Warn => warn!(module, request_id, "{}", args),
            Level::Error => error!(module, request_id, "{}", args),
        }
    }
}
