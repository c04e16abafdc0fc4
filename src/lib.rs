//! Restock-Watch: a one-shot product availability checker
//!
//! This crate fetches a single product page, extracts its title, price and
//! availability status, and sends a Telegram message once the item is no
//! longer "contact agent only".

pub mod config;
pub mod logging;
pub mod monitor;
pub mod notify;

use thiserror::Error;

/// Main error type for Restock-Watch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] monitor::FetchError),

    #[error(transparent)]
    Parse(#[from] monitor::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Restock-Watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use monitor::{is_available, ItemInfo, Monitor, RunOutcome};
pub use notify::{Notifier, TelegramNotifier};
