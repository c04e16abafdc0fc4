use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Restock-Watch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    pub fetch: FetchConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub telegram: TelegramConfig,
}

/// The product page being watched
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Product page URL
    pub url: String,

    /// Availability text meaning the item can only be ordered through an agent
    #[serde(rename = "watching-text")]
    pub watching_text: String,
}

/// Request pacing, retry and client identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Lower bound of the pre-request delay (seconds)
    #[serde(rename = "min-delay")]
    pub min_delay: f64,

    /// Upper bound of the pre-request delay (seconds)
    #[serde(rename = "max-delay")]
    pub max_delay: f64,

    /// Total number of attempts, including the first one
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff between attempts (seconds)
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Per-attempt timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Pool of User-Agent strings, one is picked per fetch
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Proxy URLs; accepted and validated, not used for requests
    #[serde(default)]
    pub proxies: Vec<String>,
}

impl FetchConfig {
    /// Per-attempt timeout as a `Duration`, saturating at `Duration::MAX`
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::MAX)
    }
}

/// CSS selectors locating the three product fields
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_name_selector")]
    pub name: String,

    #[serde(default = "default_price_selector")]
    pub price: String,

    #[serde(default = "default_availability_selector")]
    pub availability: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            name: default_name_selector(),
            price: default_price_selector(),
            availability: default_availability_selector(),
        }
    }
}

/// Telegram bot credentials
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(rename = "bot-token")]
    pub bot_token: String,

    #[serde(rename = "chat-id")]
    pub chat_id: String,

    /// Bot API base URL
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_timeout() -> f64 {
    3.0
}

/// Desktop browser identities used when the config does not list any
pub fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.1 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_name_selector() -> String {
    r#"h1[data-product-component="name"]"#.to_string()
}

fn default_price_selector() -> String {
    r#"div[data-product-component="price"] span.value"#.to_string()
}

fn default_availability_selector() -> String {
    r#"a[data-product-component="availability-status"], button[data-product-component="availability-status"]"#
        .to_string()
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}
