//! Subscriber installation for the runner
//!
//! Console output goes to stderr so `--dump -` can own stdout. The level comes
//! from, in order: `-v`/`-q` on the command line, `RUST_LOG`, the settings.

use anyhow::{Context, Result};
use prism_core::logging::LogConfig;
use std::fs::File;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer thread alive; flushes on drop
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Command-line verbosity adjustment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    /// Number of `-v` flags
    pub verbose: u8,
    /// `-q` given
    pub quiet: bool,
}

impl Verbosity {
    /// Level forced by the flags, if any
    pub fn level(&self) -> Option<LevelFilter> {
        match (self.quiet, self.verbose) {
            (true, _) => Some(LevelFilter::ERROR),
            (false, 0) => None,
            (false, 1) => Some(LevelFilter::DEBUG),
            (false, _) => Some(LevelFilter::TRACE),
        }
    }
}

fn build_filter(config: &LogConfig, verbosity: Verbosity) -> EnvFilter {
    match verbosity.level() {
        Some(level) => EnvFilter::default().add_directive(level.into()),
        None => EnvFilter::builder()
            .with_default_directive(config.parse_level().into())
            .from_env_lossy(),
    }
}

fn open_log_file(config: &LogConfig) -> Result<File> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;
    match config.cleanup_old_logs() {
        Ok(0) => {}
        Ok(n) => eprintln!("Removed {} old log files", n),
        Err(e) => eprintln!("Warning: Failed to cleanup old log files: {}", e),
    }
    let path = config.current_log_path();
    eprintln!("Logging to file: {:?}", path);
    File::create(&path).with_context(|| format!("Failed to create log file: {:?}", path))
}

/// Install the global subscriber
pub fn init(config: &LogConfig, verbosity: Verbosity) -> Result<Option<LogGuard>> {
    let console = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .with_filter(build_filter(config, verbosity))
    });

    let mut guard = None;
    let file = if config.file_output {
        let (writer, worker) = tracing_appender::non_blocking(open_log_file(config)?);
        guard = Some(LogGuard { _guard: worker });
        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(build_filter(config, verbosity)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    tracing::debug!(
        "Logging ready (config level {}, override {:?})",
        config.level,
        verbosity.level()
    );
    Ok(guard)
}
