//! Logging bootstrap.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once to
//! install a stderr console layer, an optional rolling file sink and a bridge
//! for records emitted through the `log` crate. Repeated calls hand back the
//! handle from the first one.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

const ENV_FILTER_VARS: [&str; 2] = ["SEQFS_LOG", "RUST_LOG"];

static LOG_HANDLE: OnceLock<LogHandle> = OnceLock::new();

pub use tracing_subscriber::filter::LevelFilter as LogLevel;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogRolling {
    Hourly,
    Daily,
    Never,
}

impl LogRolling {
    fn to_rotation(self) -> tracing_appender::rolling::Rotation {
        match self {
            LogRolling::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            LogRolling::Daily => tracing_appender::rolling::Rotation::DAILY,
            LogRolling::Never => tracing_appender::rolling::Rotation::NEVER,
        }
    }
}

/// File sink settings. Without one, only the console layer is installed.
#[derive(Debug, Clone)]
pub struct FileSink {
    pub directory: PathBuf,
    /// Generated files are named `<prefix>.<date>.log`.
    pub prefix: String,
    pub level: LevelFilter,
    pub rolling: LogRolling,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: "seqfs".to_owned(),
            level: LevelFilter::DEBUG,
            rolling: LogRolling::Daily,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file: Option<FileSink>,
    /// Forward `log` crate records (globset logs this way) into `tracing`.
    pub capture_log: bool,
    /// Filter directive such as `seqfs_core=debug`. Falls back to
    /// `SEQFS_LOG`, then `RUST_LOG`.
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { console_level: LevelFilter::WARN, file: None, capture_log: true, env_filter: None }
    }
}

impl LogConfig {
    pub fn with_console_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    pub fn with_file(mut self, sink: FileSink) -> Self {
        self.file = Some(sink);
        self
    }
}

#[derive(Debug)]
pub struct LogHandle {
    _guard: Option<WorkerGuard>,
    directory: Option<PathBuf>,
}

impl LogHandle {
    /// Directory of the file sink, if one was installed.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

/// Install the global subscriber. The first call wins; later calls ignore
/// their configuration and return the original handle.
pub fn init(config: LogConfig) -> Result<&'static LogHandle> {
    if let Some(handle) = LOG_HANDLE.get() {
        return Ok(handle);
    }

    let handle = setup(config)?;
    let _ = LOG_HANDLE.set(handle);
    LOG_HANDLE.get().context("log handle missing after initialisation")
}

fn setup(config: LogConfig) -> Result<LogHandle> {
    let max_level = config
        .file
        .as_ref()
        .map_or(config.console_level, |sink| sink.level.max(config.console_level));
    if config.capture_log {
        install_log_tracer(max_level);
    }

    let directive = config
        .env_filter
        .or_else(|| ENV_FILTER_VARS.iter().find_map(|var| std::env::var(var).ok()))
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| max_level.to_string().to_lowercase());
    let env_filter = EnvFilter::try_new(directive).context("parsing env filter directive")?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(config.console_level);

    let (file_layer, guard, directory) = match config.file {
        Some(sink) => {
            fs::create_dir_all(&sink.directory)
                .with_context(|| format!("creating log directory at {}", sink.directory.display()))?;
            let rolling = tracing_appender::rolling::Builder::new()
                .rotation(sink.rolling.to_rotation())
                .filename_prefix(&sink.prefix)
                .filename_suffix("log")
                .build(&sink.directory)
                .context("creating rolling log appender")?;
            let (writer, guard) = tracing_appender::non_blocking(rolling);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .with_filter(sink.level);
            (Some(layer), Some(guard), Some(sink.directory))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    Ok(LogHandle { _guard: guard, directory })
}

fn install_log_tracer(level: LevelFilter) {
    let log_level = match level {
        LevelFilter::OFF => log::LevelFilter::Off,
        LevelFilter::ERROR => log::LevelFilter::Error,
        LevelFilter::WARN => log::LevelFilter::Warn,
        LevelFilter::INFO => log::LevelFilter::Info,
        LevelFilter::DEBUG => log::LevelFilter::Debug,
        LevelFilter::TRACE => log::LevelFilter::Trace,
    };
    // Another logger may already own the `log` facade; keep it.
    let _ = tracing_log::LogTracer::builder().with_max_level(log_level).init();
}
