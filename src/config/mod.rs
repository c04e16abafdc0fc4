//! Configuration module for Restock-Watch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use restock_watch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Watching: {}", config.target.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_user_agents, Config, FetchConfig, SelectorConfig, TargetConfig, TelegramConfig,
};

// Re-export parser functions
pub use parser::{config_hash, load_config, load_config_with_hash, parse_config};
