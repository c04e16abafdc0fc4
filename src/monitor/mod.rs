//! Monitor module for the availability check
//!
//! This module contains the core check logic, including:
//! - HTTP fetching with pacing, retry and backoff
//! - HTML parsing into an `ItemInfo`
//! - The availability decision
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod item;
mod pacing;
mod parser;

pub use coordinator::{available_message, error_message, Monitor, RunOutcome, RunStage};
pub use fetcher::{browser_headers, build_http_client, FetchError, Fetcher};
pub use item::{is_available, ItemInfo};
pub use pacing::{backoff_delay, sample_delay, Sleeper, TokioSleeper};
pub use parser::{Extractor, ParseError};

use crate::config::Config;

/// Runs a complete availability check
///
/// This is the main entry point for a check. It will:
/// 1. Build the fetcher, extractor and notifier from the config
/// 2. Fetch and parse the product page
/// 3. Notify when the item is purchasable, or when the check fails
///
/// # Returns
///
/// The outcome of the run; its `exit_code()` is the process exit status.
/// `Err` is only returned when the monitor itself cannot be built.
pub async fn run_check(config: &Config) -> crate::Result<RunOutcome> {
    let mut monitor = Monitor::from_config(config)?;
    Ok(monitor.run().await)
}
