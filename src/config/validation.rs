use crate::config::types::{Config, FetchConfig, SelectorConfig, TargetConfig, TelegramConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_fetch_config(&config.fetch)?;
    validate_selector_config(&config.selectors)?;
    validate_telegram_config(&config.telegram)?;
    Ok(())
}

/// Validates the watched page settings
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.url, "target url")?;

    if config.watching_text.trim().is_empty() {
        return Err(ConfigError::Validation(
            "watching-text cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing, retry and user agent settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if !config.min_delay.is_finite() || config.min_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min-delay must be a non-negative number of seconds, got {}",
            config.min_delay
        )));
    }

    if !config.max_delay.is_finite() || config.max_delay < config.min_delay {
        return Err(ConfigError::Validation(format!(
            "max-delay must be >= min-delay ({}), got {}",
            config.min_delay, config.max_delay
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if !config.backoff_factor.is_finite() || config.backoff_factor <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-factor must be > 0, got {}",
            config.backoff_factor
        )));
    }

    if !config.timeout.is_finite() || config.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout must be > 0 seconds, got {}",
            config.timeout
        )));
    }

    for (field, secs) in [
        ("min-delay", config.min_delay),
        ("max-delay", config.max_delay),
        ("timeout", config.timeout),
    ] {
        if Duration::try_from_secs_f64(secs).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is too large to represent as a duration, got {}",
                field, secs
            )));
        }
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents must list at least one entry".to_string(),
        ));
    }

    for agent in &config.user_agents {
        if agent.trim().is_empty() || HeaderValue::from_str(agent).is_err() {
            return Err(ConfigError::Validation(format!(
                "user agent '{}' is not a valid header value",
                agent
            )));
        }
    }

    for proxy in &config.proxies {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    Ok(())
}

/// Validates that every selector compiles
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (field, selector) in [
        ("name", &config.name),
        ("price", &config.price),
        ("availability", &config.availability),
    ] {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector(format!(
                "{} selector '{}' does not parse",
                field, selector
            )));
        }
    }

    Ok(())
}

/// Validates notifier credentials
fn validate_telegram_config(config: &TelegramConfig) -> Result<(), ConfigError> {
    if config.bot_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "telegram bot-token cannot be empty".to_string(),
        ));
    }

    if config.chat_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "telegram chat-id cannot be empty".to_string(),
        ));
    }

    validate_http_url(&config.api_base, "telegram api-base")?;

    Ok(())
}

/// Parses a URL and requires an HTTP(S) scheme
fn validate_http_url(raw: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, raw
        )));
    }

    Ok(())
}
