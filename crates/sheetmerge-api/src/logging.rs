//! Logging configuration for SheetMerge
//!
//! Uses the `tracing` framework. Every engine operation runs inside a span
//! carrying its request id; this module wires those spans and events to
//! stdout and/or a daily-rotated file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line format (default)
    Pretty,
    /// Compact single-line format
    Compact,
    /// One JSON object per event
    Json,
}

/// Errors raised while installing the global subscriber
#[derive(Debug, Error)]
pub enum LogInitError {
    /// The level string is not a valid filter directive
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// The rejected directive
        directive: String,
        /// Parser message
        reason: String,
    },
    /// A global subscriber is already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter (`RUST_LOG` takes precedence)
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Create config with info level and stdout output
    pub fn info() -> Self {
        Self::default()
    }

    /// Create config with debug level
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Create config with warn level
    pub fn warn() -> Self {
        Self::default().with_level("warn")
    }

    /// Set log output to file with rotation
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stdout and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, LogInitError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| LogInitError::InvalidFilter {
                directive: self.level.clone(),
                reason: e.to_string(),
            })
    }

    /// Initialize global logging with this configuration
    ///
    /// Returns a guard that must be kept alive while logging to a file.
    /// Dropping it flushes and stops the background writer.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sheetmerge::logging::{LogConfig, LogFormat};
    ///
    /// let _guard = LogConfig::info().with_format(LogFormat::Json).init()?;
    /// # Ok::<(), sheetmerge::logging::LogInitError>(())
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>, LogInitError> {
        let env_filter = self.env_filter()?;

        let (writer, guard, ansi) = match &self.output {
            LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), None, true),
            LogOutput::File(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(path));
                (BoxMakeWriter::new(non_blocking), Some(guard), false)
            }
            LogOutput::Both(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(path));
                (
                    BoxMakeWriter::new(std::io::stdout.and(non_blocking)),
                    Some(guard),
                    false,
                )
            }
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
        let installed = match self.format {
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
            LogFormat::Json => registry.with(layer.json()).try_init(),
        };
        installed.map_err(|e| LogInitError::AlreadyInitialized(e.to_string()))?;

        Ok(guard)
    }
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    tracing_appender::rolling::daily(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("sheetmerge.log"),
    )
}
