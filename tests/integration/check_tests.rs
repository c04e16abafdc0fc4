//! Integration tests for the availability check
//!
//! These tests use wiremock to serve both the product page and the Telegram
//! Bot API, and a recording sleeper so pacing and backoff are observable
//! without waiting.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use restock_watch::config::{
    default_user_agents, load_config, FetchConfig, SelectorConfig, TelegramConfig,
};
use restock_watch::monitor::{run_check, Extractor, FetchError, Fetcher, Monitor, RunOutcome, Sleeper};
use restock_watch::TelegramNotifier;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SENTINEL: &str = "상담원 연결";
const BOT_TOKEN: &str = "123:abc";
const CHAT_ID: &str = "42";

/// Records requested sleeps instead of suspending
#[derive(Debug, Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

fn fetch_config(max_retries: u32, timeout: f64) -> FetchConfig {
    FetchConfig {
        min_delay: 0.0,
        max_delay: 0.0,
        max_retries,
        backoff_factor: 2.0,
        timeout,
        user_agents: default_user_agents(),
        proxies: vec![],
    }
}

fn fetcher(config: FetchConfig, sleeper: Arc<RecordingSleeper>) -> Fetcher {
    Fetcher::new(config)
        .expect("Failed to build fetcher")
        .with_rng(StdRng::seed_from_u64(42))
        .with_sleeper(sleeper)
}

fn telegram_notifier(api_base: &str) -> Box<TelegramNotifier> {
    let config = TelegramConfig {
        bot_token: BOT_TOKEN.to_string(),
        chat_id: CHAT_ID.to_string(),
        api_base: api_base.to_string(),
    };
    Box::new(TelegramNotifier::new(&config).expect("Failed to build notifier"))
}

fn monitor(page_url: &str, telegram_base: &str, config: FetchConfig) -> (Monitor, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let extractor = Extractor::new(&SelectorConfig::default(), SENTINEL).expect("Failed to build extractor");
    let monitor = Monitor::new(
        page_url,
        fetcher(config, sleeper.clone()),
        extractor,
        telegram_notifier(telegram_base),
    );
    (monitor, sleeper)
}

fn product_page(title: &str, price: &str, status: &str) -> String {
    format!(
        r#"<html><head><title>Cartier</title></head><body>
        <h1 data-product-component="name">{}</h1>
        <div data-product-component="price"><span class="value">{}</span></div>
        <a href="/contact" data-product-component="availability-status">{}</a>
        </body></html>"#,
        title, price, status
    )
}

async fn mount_page(server: &MockServer, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_telegram(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(status).set_body_string(r#"{"ok":true}"#))
        .mount(server)
        .await;
}

/// Texts of every message the mock Telegram API received
async fn sent_messages(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .map(|request| {
            let body: serde_json::Value =
                serde_json::from_slice(&request.body).expect("Telegram body is JSON");
            assert_eq!(body["chat_id"], CHAT_ID);
            body["text"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

/// A local address with nothing listening on it
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/product", addr)
}

#[tokio::test]
async fn test_contact_agent_only_sends_nothing() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_page(&page_server, 200, product_page("Santos de Cartier", "12,000,000", SENTINEL)).await;
    mount_telegram(&telegram_server, 200).await;

    let url = format!("{}/product", page_server.uri());
    let (mut monitor, _) = monitor(&url, &telegram_server.uri(), fetch_config(3, 3.0));

    let outcome = monitor.run().await;

    assert!(matches!(outcome, RunOutcome::ContactAgentOnly { ref item } if item.is_contact_agent_only));
    assert_eq!(outcome.exit_code(), 0);
    assert!(sent_messages(&telegram_server).await.is_empty());
}

#[tokio::test]
async fn test_available_item_notifies_once() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_page(&page_server, 200, product_page("Santos de Cartier", "12,000,000", "구매 가능")).await;
    mount_telegram(&telegram_server, 200).await;

    let url = format!("{}/product", page_server.uri());
    let (mut monitor, _) = monitor(&url, &telegram_server.uri(), fetch_config(3, 3.0));

    let outcome = monitor.run().await;

    match &outcome {
        RunOutcome::Available { item, notified } => {
            assert!(*notified);
            assert_eq!(item.title.as_deref(), Some("Santos de Cartier"));
            assert_eq!(item.price.as_deref(), Some("12,000,000"));
        }
        other => panic!("Expected available outcome, got {:?}", other),
    }
    assert_eq!(outcome.exit_code(), 0);

    let messages = sent_messages(&telegram_server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Santos de Cartier"));
    assert!(messages[0].contains("12,000,000"));
    assert!(messages[0].contains(&url));
}

#[tokio::test]
async fn test_missing_availability_anchor_counts_as_available() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_page(
        &page_server,
        200,
        r#"<html><body><h1 data-product-component="name">Santos de Cartier</h1></body></html>"#
            .to_string(),
    )
    .await;
    mount_telegram(&telegram_server, 200).await;

    let url = format!("{}/product", page_server.uri());
    let (mut monitor, _) = monitor(&url, &telegram_server.uri(), fetch_config(3, 3.0));

    let outcome = monitor.run().await;

    assert!(matches!(outcome, RunOutcome::Available { notified: true, .. }));
    let messages = sent_messages(&telegram_server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Price: (unknown)"));
}

#[tokio::test]
async fn test_timeouts_exhaust_retries_and_report_error() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&page_server)
        .await;
    mount_telegram(&telegram_server, 200).await;

    let url = format!("{}/product", page_server.uri());
    let (mut monitor, sleeper) = monitor(&url, &telegram_server.uri(), fetch_config(3, 0.2));

    let outcome = monitor.run().await;

    assert!(matches!(outcome, RunOutcome::Failed { notified: true, .. }));
    assert_eq!(outcome.exit_code(), 1);

    // Pre-request pacing, then 2^0 and 2^1 seconds of backoff
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(2)]
    );

    let messages = sent_messages(&telegram_server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Scraping error:"));
}

#[tokio::test]
async fn test_fetcher_transport_failure_attempt_count() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut config = fetch_config(4, 1.0);
    config.backoff_factor = 3.0;
    let mut fetcher = fetcher(config, sleeper.clone());

    let result = fetcher.fetch(&closed_port_url()).await;

    match result {
        Err(FetchError::Transport { attempts, .. }) => assert_eq!(attempts, 4),
        other => panic!("Expected transport error, got {:?}", other),
    }
    assert_eq!(
        sleeper.recorded(),
        vec![
            Duration::ZERO,
            Duration::from_secs(1),
            Duration::from_secs(3),
            Duration::from_secs(9),
        ]
    );
}

#[tokio::test]
async fn test_single_attempt_has_no_backoff() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut fetcher = fetcher(fetch_config(1, 1.0), sleeper.clone());

    let result = fetcher.fetch(&closed_port_url()).await;

    assert!(matches!(result, Err(FetchError::Transport { attempts: 1, .. })));
    assert_eq!(sleeper.recorded(), vec![Duration::ZERO]);
}

#[tokio::test]
async fn test_error_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let mut fetcher = fetcher(fetch_config(5, 3.0), sleeper.clone());

    let result = fetcher.fetch(&format!("{}/product", server.uri())).await;

    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("Expected status error, got {:?}", other),
    }
    assert_eq!(sleeper.recorded(), vec![Duration::ZERO]);
}

#[tokio::test]
async fn test_request_carries_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let mut fetcher = fetcher(fetch_config(1, 3.0), sleeper);

    let body = fetcher
        .fetch(&format!("{}/product", server.uri()))
        .await
        .expect("Fetch should succeed");
    assert_eq!(body, "<html></html>");
}

#[tokio::test]
async fn test_notification_failure_keeps_success_exit() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_page(&page_server, 200, product_page("Santos de Cartier", "12,000,000", "구매 가능")).await;
    mount_telegram(&telegram_server, 500).await;

    let url = format!("{}/product", page_server.uri());
    let (mut monitor, _) = monitor(&url, &telegram_server.uri(), fetch_config(3, 3.0));

    let outcome = monitor.run().await;

    assert!(matches!(outcome, RunOutcome::Available { notified: false, .. }));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(sent_messages(&telegram_server).await.len(), 1);
}

#[tokio::test]
async fn test_error_path_survives_unreachable_notifier() {
    let page_server = MockServer::start().await;
    mount_page(&page_server, 404, String::new()).await;

    let url = format!("{}/product", page_server.uri());
    let telegram_base = closed_port_url().trim_end_matches("/product").to_string();
    let (mut monitor, _) = monitor(&url, &telegram_base, fetch_config(3, 1.0));

    let outcome = monitor.run().await;

    match &outcome {
        RunOutcome::Failed { error, notified } => {
            assert!(error.contains("404"));
            assert!(!*notified);
        }
        other => panic!("Expected failure, got {:?}", other),
    }
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_empty_body_is_a_failure() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_page(&page_server, 200, "   ".to_string()).await;
    mount_telegram(&telegram_server, 200).await;

    let url = format!("{}/product", page_server.uri());
    let (mut monitor, _) = monitor(&url, &telegram_server.uri(), fetch_config(3, 3.0));

    let outcome = monitor.run().await;

    assert!(matches!(outcome, RunOutcome::Failed { notified: true, .. }));
    assert_eq!(outcome.exit_code(), 1);
    let messages = sent_messages(&telegram_server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("empty"));
}

#[tokio::test]
async fn test_run_check_from_config_file() {
    let page_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_page(&page_server, 200, product_page("Santos de Cartier", "12,000,000", SENTINEL)).await;
    mount_telegram(&telegram_server, 200).await;

    let config_content = format!(
        r#"
[target]
url = "{page}/product"
watching-text = "{sentinel}"

[fetch]
min-delay = 0.0
max-delay = 0.0
timeout = 3.0

[telegram]
bot-token = "{token}"
chat-id = "{chat}"
api-base = "{telegram}"
"#,
        page = page_server.uri(),
        sentinel = SENTINEL,
        token = BOT_TOKEN,
        chat = CHAT_ID,
        telegram = telegram_server.uri(),
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).expect("Config should load");
    let outcome = run_check(&config).await.expect("Checker should build");

    assert!(matches!(outcome, RunOutcome::ContactAgentOnly { .. }));
    assert_eq!(outcome.exit_code(), 0);
    assert!(sent_messages(&telegram_server).await.is_empty());
}
