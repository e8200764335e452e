use anyhow::Result;
use appt_watch::adapters::clock::FixedClock;
use appt_watch::app;
use appt_watch::config::{toml_config::TomlConfig, ConfigOverrides};
use appt_watch::core::poller::{Poller, PollerConfig};
use appt_watch::core::{Notifier, WatchSet};
use appt_watch::{Checker, WatchConfig, WatchError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    async fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, text: &str) {
        self.sent.lock().await.push((chat_id, text.to_string()));
    }
}

fn available_feed(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([{
                "storeNumber": "R123",
                "appointmentsAvailable": true,
                "firstAvailableAppointment": 1700000000,
                "errorCode": ""
            }]));
    });
}

fn poller(server: &MockServer, notifier: Arc<RecordingNotifier>, interval: Duration) -> Poller {
    let checker = Checker::new(
        server.base_url(),
        Arc::new(WatchSet::new(vec!["R123".to_string()])),
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 7, 5, 0, 0).unwrap())),
        Duration::from_secs(5),
    )
    .unwrap();

    Poller::new(
        checker,
        notifier,
        PollerConfig {
            chat_id: 4242,
            interval,
            store_address: "https://example.com/store".to_string(),
        },
    )
}

#[tokio::test]
async fn test_tick_sends_formatted_notification() {
    let server = MockServer::start();
    available_feed(&server);
    let notifier = Arc::new(RecordingNotifier::default());

    let sent = poller(&server, notifier.clone(), Duration::from_secs(60))
        .tick()
        .await;

    assert!(sent);
    let messages = notifier.messages().await;
    assert_eq!(messages.len(), 1);

    let (chat_id, text) = &messages[0];
    assert_eq!(*chat_id, 4242);
    assert!(text.starts_with("Appointment available!\ntime: "));
    assert!(text.ends_with("\naddr: https://example.com/store\n"));
}

#[tokio::test]
async fn test_tick_without_availability_stays_quiet() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let sent = poller(&server, notifier.clone(), Duration::from_secs(60))
        .run_once()
        .await;

    assert!(!sent);
    assert!(notifier.messages().await.is_empty());
}

#[tokio::test]
async fn test_repeated_ticks_notify_every_time() {
    let server = MockServer::start();
    available_feed(&server);
    let notifier = Arc::new(RecordingNotifier::default());
    let poller = poller(&server, notifier.clone(), Duration::from_secs(60));

    for _ in 0..3 {
        assert!(poller.tick().await);
    }

    assert_eq!(notifier.messages().await.len(), 3);
}

#[tokio::test]
async fn test_run_checks_on_every_interval() {
    let server = MockServer::start();
    available_feed(&server);
    let notifier = Arc::new(RecordingNotifier::default());
    let poller = poller(&server, notifier.clone(), Duration::from_millis(100));

    let outcome = tokio::time::timeout(Duration::from_millis(550), poller.run()).await;

    assert!(outcome.is_err(), "run() only returns by being cancelled");
    let count = notifier.messages().await.len();
    assert!(count >= 2, "expected several notifications, got {}", count);
}

#[tokio::test]
async fn test_slow_check_never_overlaps_next_tick() {
    let server = MockServer::start();
    let slow_feed = server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .delay(Duration::from_millis(250))
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let poller = poller(&server, notifier.clone(), Duration::from_millis(100));

    let outcome = tokio::time::timeout(Duration::from_secs(1), poller.run()).await;

    assert!(outcome.is_err());
    // Back to back 250ms requests after a 100ms start fit at most four times in a second.
    let hits = slow_feed.hits();
    assert!((2..=4).contains(&hits), "unexpected request count {}", hits);
    assert!(notifier.messages().await.is_empty());
}

#[tokio::test]
async fn test_startup_wiring_from_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let stores_path = temp_dir.path().join("stores.conf");
    tokio::fs::write(&stores_path, "# Munich\nR123\n\n").await?;

    let server = MockServer::start();
    available_feed(&server);

    let config = WatchConfig::resolve(
        TomlConfig::default(),
        ConfigOverrides {
            bot_token: Some("123:abc".to_string()),
            chat_id: Some(77),
            base_url: Some(server.base_url()),
            stores_file: Some(stores_path.to_string_lossy().into_owned()),
            ..Default::default()
        },
    )?;

    let watch = app::load_watch_set(&config)?;
    assert_eq!(watch.as_slice(), &["R123".to_string()]);

    let notifier = Arc::new(RecordingNotifier::default());
    let poller = app::build_poller(
        &config,
        watch,
        Arc::new(FixedClock::new(Utc::now())),
        notifier.clone(),
    )?;

    assert!(poller.tick().await);
    assert_eq!(notifier.messages().await[0].0, 77);
    Ok(())
}

#[tokio::test]
async fn test_empty_or_missing_watch_list_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let stores_path = temp_dir.path().join("stores.conf");
    tokio::fs::write(&stores_path, "# nothing yet\n\n").await?;

    let mut overrides = ConfigOverrides {
        bot_token: Some("123:abc".to_string()),
        chat_id: Some(77),
        stores_file: Some(stores_path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let config = WatchConfig::resolve(TomlConfig::default(), overrides.clone())?;
    assert!(matches!(
        app::load_watch_set(&config),
        Err(WatchError::ConfigError { .. })
    ));

    overrides.stores_file = Some(
        temp_dir
            .path()
            .join("missing.conf")
            .to_string_lossy()
            .into_owned(),
    );
    let config = WatchConfig::resolve(TomlConfig::default(), overrides)?;
    assert!(matches!(
        app::load_watch_set(&config),
        Err(WatchError::IoError(_))
    ));
    Ok(())
}

#[test]
fn test_watch_set_loads_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stores.conf");
    std::fs::write(&path, "R123\n#R456\nR789\n").unwrap();

    let watch = WatchSet::from_file(&path).unwrap();
    assert_eq!(watch.iter().collect::<Vec<_>>(), vec!["R123", "R789"]);
}
