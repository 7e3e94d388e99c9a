use std::fmt;
use std::io::{self, Write};

use agora_rest_domain::constants::LOG_PREFIX;
use parking_lot::Mutex;

use super::{AtomicLevel, Level, Logger};
use crate::context::Context;

/// Logger that drops every record.
#[derive(Debug)]
pub struct DiscardLogger {
    level: AtomicLevel,
}

impl DiscardLogger {
    pub const fn new() -> Self {
        Self { level: AtomicLevel::new(Level::Error) }
    }
}

impl Default for DiscardLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for DiscardLogger {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn write_record(&self, _: &Context, _: Level, _: &str, _: fmt::Arguments<'_>) {}
}

/// Level-filtered line writer with a fixed prefix.
///
/// Each record is written as
/// `<prefix><LEVEL> [<module>] [request_id=<id>] <message>`; the request id
/// segment appears only when the context carries one. Write failures are
/// ignored.
pub struct WriterLogger<W> {
    level: AtomicLevel,
    prefix: String,
    writer: Mutex<W>,
}

impl WriterLogger<io::Stdout> {
    /// Logger printing to standard output with the default prefix.
    pub fn stdout(level: Level) -> Self {
        Self::new(io::stdout(), level)
    }
}

impl<W: Write + Send> WriterLogger<W> {
    pub fn new(writer: W, level: Level) -> Self {
        Self {
            level: AtomicLevel::new(level),
            prefix: LOG_PREFIX.to_string(),
            writer: Mutex::new(writer),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W> fmt::Debug for WriterLogger<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterLogger")
            .field("level", &self.level.get())
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl<W: Write + Send> Logger for WriterLogger<W> {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn write_record(&self, ctx: &Context, level: Level, module: &str, args: fmt::Arguments<'_>) {
        let mut writer = self.writer.lock();
        let _ = match ctx.request_id() {
            Some(request_id) => writeln!(
                writer,
                "{}{} [{}] [request_id={}] {}",
                self.prefix, level, module, request_id, args
            ),
            None => writeln!(writer, "{}{} [{}] {}", self.prefix, level, module, args),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(logger: WriterLogger<Vec<u8>>) -> String {
        String::from_utf8(logger.into_inner()).unwrap()
    }

    #[test]
    fn writes_prefixed_lines_above_level() {
        let logger = WriterLogger::new(Vec::new(), Level::Info);
        let ctx = Context::background();

        logger.debug(&ctx, "pool", "hidden");
        logger.info(&ctx, "pool", "selected agora.io");
        logger.warnf(&ctx, "dns", format_args!("lookup {} failed", "api-us-west-1.agora.io"));

        let text = output(logger);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[AgoraRESTClient] INFO [pool] selected agora.io",
                "[AgoraRESTClient] WARN [dns] lookup api-us-west-1.agora.io failed",
            ]
        );
    }

    #[test]
    fn includes_request_id_from_context() {
        let logger = WriterLogger::new(Vec::new(), Level::Debug).with_prefix("> ");
        let ctx = Context::background().with_request_id("abc");
        logger.error(&ctx, "http", "boom");
        assert_eq!(output(logger), "> ERROR [http] [request_id=abc] boom\n");
    }

    #[test]
    fn set_level_changes_filter() {
        let logger = WriterLogger::new(Vec::new(), Level::Error);
        let ctx = Context::background();
        logger.info(&ctx, "m", "dropped");
        logger.set_level(Level::Info);
        logger.info(&ctx, "m", "kept");
        assert_eq!(output(logger), "[AgoraRESTClient] INFO [m] kept\n");
    }

    #[test]
    fn discard_logger_is_never_enabled() {
        let logger = DiscardLogger::new();
        logger.set_level(Level::Debug);
        assert_eq!(logger.level(), Level::Debug);
        assert!(!logger.enabled(Level::Error));
    }
}
