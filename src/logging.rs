//! Logging setup
//!
//! Console output follows the verbosity flags. The optional file sink writes
//! JSON lines at debug level through a daily rolling appender, so per-attempt
//! timings are always kept on disk.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "restock-watch";

/// Number of rotated log files kept on disk
const MAX_LOG_FILES: usize = 5;

/// Logging options gathered from the command line
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Count of `-v` flags
    pub verbose: u8,

    /// Only show errors on the console
    pub quiet: bool,

    /// Emit JSON on the console instead of human-readable lines
    pub json: bool,

    /// Directory for the rolling JSON log file; `None` disables it
    pub log_dir: Option<PathBuf>,
}

/// Console filter for the given verbosity
pub fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("restock_watch=info,warn"),
            1 => EnvFilter::new("restock_watch=debug,info"),
            2 => EnvFilter::new("restock_watch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

/// Sets up the tracing subscriber
///
/// The returned guard flushes the file sink on drop and must be held until
/// the process exits.
pub fn setup_logging(options: &LogOptions) -> anyhow::Result<Option<WorkerGuard>> {
    let console = if options.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_filter(console_filter(options.verbose, options.quiet))
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_filter(console_filter(options.verbose, options.quiet))
            .boxed()
    };

    let (file, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .max_log_files(MAX_LOG_FILES)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("restock_watch=debug,info"))
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()?;

    Ok(guard)
}
