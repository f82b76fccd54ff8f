//! Plain-text logger for layout diagnostics.
//!
//! The layout engine reports through the `log` crate: row state changes
//! and split decisions at `debug`, forced placements and width problems at
//! `warn`. [`LayoutLogger`] turns those records into one line each and
//! writes them to any [`Write`] sink.
//!
//! Optional tracing integration is available via `LayoutTracingLayer` when
//! the `tracing` feature is enabled.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::{OffsetDateTime, format_description::OwnedFormatItem};

use crate::sync::lock_recover;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Logger for the `log` crate that writes one line per record.
///
/// All internal state is protected by mutexes with poison recovery, so
/// the logger can be shared between threads laying out documents
/// concurrently. Lines from different threads never interleave.
pub struct LayoutLogger {
    sink: Sink,
    level: LevelFilter,
    show_time: bool,
    omit_repeated_times: bool,
    show_level: bool,
    show_target: bool,
    show_path: bool,
    target_prefix: Option<String>,
    time_format: OwnedFormatItem,
    last_time: Mutex<Option<String>>,
}

impl LayoutLogger {
    /// Create a logger writing to `writer`.
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        let time_format = time::format_description::parse_owned::<2>("[%F %T]")
            .or_else(|_| time::format_description::parse_owned::<2>("[hour]:[minute]:[second]"))
            .unwrap_or_else(|_| OwnedFormatItem::Literal(Vec::<u8>::new().into_boxed_slice()));
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            level: LevelFilter::Info,
            show_time: true,
            omit_repeated_times: true,
            show_level: true,
            show_target: true,
            show_path: false,
            target_prefix: None,
            time_format,
            last_time: Mutex::new(None),
        }
    }

    /// Create a logger writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    /// Blank out a timestamp equal to the previous line's.
    #[must_use]
    pub fn omit_repeated_times(mut self, omit: bool) -> Self {
        self.omit_repeated_times = omit;
        self
    }

    #[must_use]
    pub fn show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    /// Prefix messages with the record's target (module path).
    #[must_use]
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Append `file:line` to messages.
    #[must_use]
    pub fn show_path(mut self, show: bool) -> Self {
        self.show_path = show;
        self
    }

    /// Only log records whose target starts with `prefix`, such as
    /// `"pagegrid"`.
    #[must_use]
    pub fn target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = Some(prefix.into());
        self
    }

    /// Override the time format. Invalid formats are ignored.
    #[must_use]
    pub fn time_format(mut self, format: &str) -> Self {
        if let Ok(parsed) = time::format_description::parse_owned::<2>(format) {
            self.time_format = parsed;
        }
        self
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails when another logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_max_level(self.level);
        log::set_boxed_logger(Box::new(self))
    }

    fn format_time(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.time_format)
            .unwrap_or_else(|_| now.to_string())
    }

    fn format_record(&self, record: &Record<'_>) -> String {
        let mut line = String::new();

        if self.show_time {
            let time_str = self.format_time();
            if self.omit_repeated_times {
                let mut last = lock_recover(&self.last_time);
                if last.as_ref() == Some(&time_str) {
                    line.push_str(&" ".repeat(time_str.len()));
                } else {
                    line.push_str(&time_str);
                    *last = Some(time_str);
                }
            } else {
                line.push_str(&time_str);
            }
            line.push(' ');
        }

        if self.show_level {
            line.push_str(&format!("{:<6}", record.level()));
        }

        if self.show_target && !record.target().is_empty() {
            line.push_str(record.target());
            line.push_str(": ");
        }

        line.push_str(&record.args().to_string());

        if self.show_path
            && let Some(path) = record.file()
        {
            line.push(' ');
            line.push_str(path);
            if let Some(line_no) = record.line() {
                line.push_str(&format!(":{line_no}"));
            }
        }

        line
    }

    fn accepts_target(&self, target: &str) -> bool {
        self.target_prefix
            .as_deref()
            .is_none_or(|prefix| target.starts_with(prefix))
    }

    fn write_line(&self, line: &str) {
        let mut sink = lock_recover(&self.sink);
        // Logging must never abort a layout run.
        let _ = writeln!(sink, "{line}");
    }
}

impl Log for LayoutLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level && self.accepts_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_record(record);
        self.write_line(&line);
    }

    fn flush(&self) {
        let _ = lock_recover(&self.sink).flush();
    }
}

/// An in-memory [`Write`] sink that can be read back, for capturing
/// layout logs.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock_recover(&self.0)).into_owned()
    }

    /// Written lines at `level`, recognised by the level column.
    #[must_use]
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        let tag = level.to_string();
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().any(|word| word == tag))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock_recover(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "tracing")]
mod tracing_integration {
    use super::LayoutLogger;
    use log::Level;
    use std::fmt::Debug;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level as TracingLevel, Subscriber};
    use tracing_subscriber::{Layer, layer::Context};

    /// Tracing layer that formats events the way [`LayoutLogger`] does.
    pub struct LayoutTracingLayer {
        logger: LayoutLogger,
    }

    impl LayoutTracingLayer {
        /// Create a layer writing to standard error.
        #[must_use]
        pub fn new() -> Self {
            Self {
                logger: LayoutLogger::stderr(),
            }
        }

        /// Use an existing logger configuration.
        #[must_use]
        pub fn with_logger(logger: LayoutLogger) -> Self {
            Self { logger }
        }

        /// Install as the global tracing subscriber.
        ///
        /// # Errors
        ///
        /// Fails when a global subscriber is already set.
        pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
            use tracing_subscriber::prelude::*;

            let subscriber = tracing_subscriber::registry().with(self);
            tracing::subscriber::set_global_default(subscriber)
        }
    }

    impl Default for LayoutTracingLayer {
        fn default() -> Self {
            Self::new()
        }
    }

    #[derive(Default)]
    struct EventVisitor {
        message: Option<String>,
        fields: Vec<(String, String)>,
    }

    impl Visit for EventVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            let rendered = format!("{value:?}");
            let rendered = strip_quotes(&rendered).to_string();
            if field.name() == "message" {
                self.message = Some(rendered);
            } else {
                self.fields.push((field.name().to_string(), rendered));
            }
        }
    }

    impl<S> Layer<S> for LayoutTracingLayer
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            let level = map_tracing_level(*metadata.level());
            if level > self.logger.level || !self.logger.accepts_target(metadata.target()) {
                return;
            }

            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);
            let mut message = visitor.message.unwrap_or_default();
            if !visitor.fields.is_empty() {
                let extra = visitor
                    .fields
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                if message.is_empty() {
                    message = extra;
                } else {
                    message.push(' ');
                    message.push_str(&extra);
                }
            }

            let message_ref = message.as_str();
            let args = format_args!("{message_ref}");
            let record = log::Record::builder()
                .args(args)
                .level(level)
                .target(metadata.target())
                .file(metadata.file())
                .line(metadata.line())
                .module_path(metadata.module_path())
                .build();
            let line = self.logger.format_record(&record);
            self.logger.write_line(&line);
        }
    }

    fn map_tracing_level(level: TracingLevel) -> Level {
        match level {
            TracingLevel::TRACE => Level::Trace,
            TracingLevel::DEBUG => Level::Debug,
            TracingLevel::INFO => Level::Info,
            TracingLevel::WARN => Level::Warn,
            TracingLevel::ERROR => Level::Error,
        }
    }

    fn strip_quotes(value: &str) -> &str {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }

}

#[cfg(feature = "tracing")]
pub use tracing_integration::LayoutTracingLayer;
