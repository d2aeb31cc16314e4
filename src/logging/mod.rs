//! Logging setup
//!
//! Logs go to stderr because stdout carries the MCP stdio transport. Every
//! formatted line passes through the API key redactor and the heuristic scrub
//! before it is written.

use std::io::{self, Write};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogLevel;
use crate::redact::SecretRedactor;

/// Logging configuration, built once at startup
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base verbosity
    pub level: LogLevel,
    /// Force debug output regardless of the configured level
    pub verbose: bool,
    /// Redactor carrying the API key, if one is configured
    pub redactor: SecretRedactor,
}

impl LoggingConfig {
    /// Effective filter directive (`RUST_LOG` wins when set)
    pub fn filter_directive(&self) -> String {
        if let Ok(directive) = std::env::var("RUST_LOG") {
            return directive;
        }
        if self.verbose {
            LogLevel::Debug.as_str().to_string()
        } else {
            self.level.as_str().to_string()
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let writer = ScrubbingMakeWriter::new(config.redactor.clone());

    let result = tracing_subscriber::registry()
        .with(EnvFilter::new(config.filter_directive()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init();

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// `MakeWriter` producing stderr writers that sanitize each event
#[derive(Debug, Clone)]
pub struct ScrubbingMakeWriter {
    redactor: SecretRedactor,
}

impl ScrubbingMakeWriter {
    pub fn new(redactor: SecretRedactor) -> Self {
        Self { redactor }
    }
}

impl<'a> MakeWriter<'a> for ScrubbingMakeWriter {
    type Writer = ScrubbingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        ScrubbingWriter::new(io::stderr(), self.redactor.clone())
    }
}

/// Buffers one formatted event and writes it sanitized on flush or drop
pub struct ScrubbingWriter<W: Write> {
    inner: W,
    redactor: SecretRedactor,
    buf: Vec<u8>,
}

impl<W: Write> ScrubbingWriter<W> {
    pub fn new(inner: W, redactor: SecretRedactor) -> Self {
        Self {
            inner,
            redactor,
            buf: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let raw = String::from_utf8_lossy(&self.buf);
        let clean = self.redactor.sanitize(&raw);
        self.buf.clear();
        self.inner.write_all(clean.as_bytes())?;
        self.inner.flush()
    }
}

impl<W: Write> Write for ScrubbingWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl<W: Write> Drop for ScrubbingWriter<W> {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}
