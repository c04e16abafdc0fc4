//! Check coordinator - orchestrates a single availability check
//!
//! A run moves through `Start → Fetching → Extracting → Classifying →
//! (Notifying | Idle) → Terminated`. Fetch and parse errors take the error
//! path: a best-effort error notification followed by a failed outcome.

use crate::config::Config;
use crate::monitor::fetcher::Fetcher;
use crate::monitor::item::{is_available, ItemInfo};
use crate::monitor::parser::Extractor;
use crate::notify::{Notifier, TelegramNotifier};
use crate::WatchError;
use chrono::Local;
use std::fmt;

/// Shown in messages for fields the page did not provide
const UNKNOWN_FIELD: &str = "(unknown)";

/// Stage of a check, logged as it is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    Fetching,
    Extracting,
    Classifying,
    Notifying,
    Idle,
    Terminated,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Start => "start",
            RunStage::Fetching => "fetching",
            RunStage::Extracting => "extracting",
            RunStage::Classifying => "classifying",
            RunStage::Notifying => "notifying",
            RunStage::Idle => "idle",
            RunStage::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// How a check ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The item is purchasable; `notified` tells whether delivery succeeded
    Available { item: ItemInfo, notified: bool },

    /// The page still shows the "contact agent" status
    ContactAgentOnly { item: ItemInfo },

    /// Fetching or parsing failed; `notified` tells whether the error report
    /// reached the notifier
    Failed { error: String, notified: bool },
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Failed { .. } => 1,
            RunOutcome::Available { .. } | RunOutcome::ContactAgentOnly { .. } => 0,
        }
    }
}

/// Runs one availability check against the configured product page
pub struct Monitor {
    target_url: String,
    fetcher: Fetcher,
    extractor: Extractor,
    notifier: Box<dyn Notifier>,
}

impl Monitor {
    /// Creates a monitor from explicitly constructed parts
    pub fn new(
        target_url: impl Into<String>,
        fetcher: Fetcher,
        extractor: Extractor,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            fetcher,
            extractor,
            notifier,
        }
    }

    /// Wires the production fetcher, extractor and Telegram notifier
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Monitor)` - Ready to run
    /// * `Err(WatchError)` - An HTTP client or selector could not be built
    pub fn from_config(config: &Config) -> Result<Self, WatchError> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        let extractor = Extractor::new(&config.selectors, config.target.watching_text.clone())?;
        let notifier = TelegramNotifier::new(&config.telegram)?;

        Ok(Self::new(
            config.target.url.clone(),
            fetcher,
            extractor,
            Box::new(notifier),
        ))
    }

    /// The watched product page
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Fetches the page and extracts its fields
    pub async fn check(&mut self) -> Result<ItemInfo, WatchError> {
        enter(RunStage::Fetching);
        let body = self.fetcher.fetch(&self.target_url).await?;

        enter(RunStage::Extracting);
        let item = self.extractor.extract(&body)?;

        tracing::info!(
            title = item.title.as_deref(),
            price = item.price.as_deref(),
            availability = item.availability.as_deref(),
            is_contact_agent_only = item.is_contact_agent_only,
            "Extracted product fields"
        );

        Ok(item)
    }

    /// Runs a full check and sends the resulting notification, if any
    ///
    /// Notification failures are logged and never change the outcome.
    pub async fn run(&mut self) -> RunOutcome {
        enter(RunStage::Start);
        tracing::info!(url = self.target_url.as_str(), "Starting availability check");

        let outcome = match self.check().await {
            Ok(item) => {
                enter(RunStage::Classifying);
                if is_available(&item) {
                    enter(RunStage::Notifying);
                    tracing::info!("Item is available, sending notification");
                    let message = available_message(&item, &self.target_url);
                    let notified = self.deliver(&message).await;
                    RunOutcome::Available { item, notified }
                } else {
                    enter(RunStage::Idle);
                    tracing::info!("Item is still contact-agent only");
                    RunOutcome::ContactAgentOnly { item }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Availability check failed");
                let message = error_message(&e);
                let notified = self.deliver(&message).await;
                RunOutcome::Failed {
                    error: e.to_string(),
                    notified,
                }
            }
        };

        enter(RunStage::Terminated);
        tracing::info!(exit_code = outcome.exit_code(), "Check finished");
        outcome
    }

    /// Sends a message, logging and swallowing any delivery error
    async fn deliver(&self, message: &str) -> bool {
        match self.notifier.notify(message).await {
            Ok(()) => {
                tracing::debug!(notifier = self.notifier.name(), "Notification delivered");
                true
            }
            Err(e) => {
                tracing::error!(notifier = self.notifier.name(), error = %e, "Notification failed");
                false
            }
        }
    }
}

fn enter(stage: RunStage) {
    tracing::debug!(%stage, "Entering stage");
}

/// Message sent when the item becomes purchasable
pub fn available_message(item: &ItemInfo, url: &str) -> String {
    format!(
        "Title: {}\nPrice: {}\nStatus: available for purchase\nURL: {}\nChecked at: {}",
        item.title.as_deref().unwrap_or(UNKNOWN_FIELD),
        item.price.as_deref().unwrap_or(UNKNOWN_FIELD),
        url,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Message sent when a check fails
pub fn error_message(error: &WatchError) -> String {
    format!("Scraping error: {}", error)
}
