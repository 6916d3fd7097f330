//! End-to-end sync runs: portal → delta → sink → store

use crate::fake_portal::{day, month, sample_history, test_config, week, FakePortal};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Mutex;
use tempfile::TempDir;
use usage_drill::storage::{JsonStore, UsageStore};
use usage_drill::sync::{DeliveryError, DeliveryRecord, DeliverySink, HomeAssistantSink};
use usage_drill::{DrillError, SyncRun};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Sink that records what it accepted and rejects the listed days
#[derive(Default)]
struct RecordingSink {
    reject: HashSet<String>,
    accepted: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn rejecting(days: &[&str]) -> Self {
        Self {
            reject: days.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    fn accepted(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, record: &DeliveryRecord) -> Result<(), DeliveryError> {
        if self.reject.contains(&record.day_key) {
            return Err(DeliveryError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.accepted.lock().unwrap().push(record.day_key.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_first_run_delivers_everything() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/states/sensor.energy_usage"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(201))
        .expect(6)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sink_url = format!("{}/api/states/sensor.energy_usage", server.uri());
    let config = test_config(dir.path(), &sink_url, "");
    let sink = HomeAssistantSink::from_config(&config.sink, &config.timeouts).unwrap();
    let mut store = JsonStore::from_config(&config.storage);
    let mut portal = FakePortal::new(sample_history());

    let summary = SyncRun::new(&config)
        .run_with(&mut portal, &sink, &mut store)
        .await
        .unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.starting_watermark, None);
    assert_eq!(summary.delta, 6);
    assert_eq!(summary.delivery.delivered, 6);
    assert_eq!(store.load_watermark().unwrap(), Some(date("2024-03-11")));
    assert_eq!(store.load_snapshot().unwrap().day_count(), 6);

    assert_eq!(portal.typed, vec!["customer", "hunter2"]);
    assert!(portal.closed);
}

#[tokio::test]
async fn test_second_run_sends_nothing_new() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);

    let first = RecordingSink::default();
    SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &first, &mut store)
        .await
        .unwrap();
    assert_eq!(first.accepted().len(), 6);

    let second = RecordingSink::default();
    let summary = SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &second, &mut store)
        .await
        .unwrap();

    assert!(second.accepted().is_empty());
    assert_eq!(summary.delta, 0);
    assert_eq!(store.load_watermark().unwrap(), Some(date("2024-03-11")));
}

#[tokio::test]
async fn test_only_days_after_watermark_are_sent() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);
    store.save_watermark(date("2024-03-04")).unwrap();

    let sink = RecordingSink::default();
    SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &sink, &mut store)
        .await
        .unwrap();

    assert_eq!(sink.accepted(), vec!["2024-03-10", "2024-03-11"]);
}

#[tokio::test]
async fn test_failed_delivery_is_retried_next_run() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);
    store.save_watermark(date("2024-03-10")).unwrap();

    let failing = RecordingSink::rejecting(&["2024-03-11"]);
    let summary = SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &failing, &mut store)
        .await
        .unwrap();

    assert!(!summary.is_clean());
    assert_eq!(summary.delivery.failed, vec!["2024-03-11".to_string()]);
    assert_eq!(store.load_watermark().unwrap(), Some(date("2024-03-10")));
    // The snapshot is written regardless
    assert!(store.load_snapshot().unwrap().contains_day("2024-03-11"));

    let healthy = RecordingSink::default();
    SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &healthy, &mut store)
        .await
        .unwrap();

    assert_eq!(healthy.accepted(), vec!["2024-03-11"]);
    assert_eq!(store.load_watermark().unwrap(), Some(date("2024-03-11")));
}

#[tokio::test]
async fn test_contiguous_policy_holds_watermark_at_gap() {
    let dir = TempDir::new().unwrap();
    let config = test_config(
        dir.path(),
        "http://localhost:8123/api/states/sensor.energy",
        "[sync]\nwatermark-policy = \"contiguous-prefix\"\n",
    );
    let mut store = JsonStore::from_config(&config.storage);

    let failing = RecordingSink::rejecting(&["2024-03-04"]);
    SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &failing, &mut store)
        .await
        .unwrap();

    assert_eq!(store.load_watermark().unwrap(), Some(date("2024-03-03")));

    let healthy = RecordingSink::default();
    SyncRun::new(&config)
        .run_with(&mut FakePortal::new(sample_history()), &healthy, &mut store)
        .await
        .unwrap();

    // Everything after the gap is offered again
    assert_eq!(
        healthy.accepted(),
        vec!["2024-03-04", "2024-03-10", "2024-03-11"]
    );
    assert_eq!(store.load_watermark().unwrap(), Some(date("2024-03-11")));
}

#[tokio::test]
async fn test_chronological_order_sorts_across_weeks() {
    let dir = TempDir::new().unwrap();
    let config = test_config(
        dir.path(),
        "http://localhost:8123/api/states/sensor.energy",
        "[sync]\norder = \"chronological\"\n",
    );
    let mut store = JsonStore::from_config(&config.storage);

    // The portal lists the newest week first
    let history = vec![month(
        "2024-03-01",
        "2024-03-31",
        vec![
            week("2024-03-10", "2024-03-16", vec![day("2024-03-10", "1.0")]),
            week("2024-03-03", "2024-03-09", vec![day("2024-03-04", "1.0")]),
        ],
    )];

    let sink = RecordingSink::default();
    SyncRun::new(&config)
        .run_with(&mut FakePortal::new(history), &sink, &mut store)
        .await
        .unwrap();

    assert_eq!(sink.accepted(), vec!["2024-03-04", "2024-03-10"]);
}

#[tokio::test]
async fn test_login_failure_is_fatal_and_closes_session() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);
    let mut portal = FakePortal::new(sample_history());
    portal.login_form_missing = true;

    let sink = RecordingSink::default();
    let result = SyncRun::new(&config)
        .run_with(&mut portal, &sink, &mut store)
        .await;

    assert!(matches!(result, Err(DrillError::Login(_))));
    assert!(portal.closed);
    assert!(sink.accepted().is_empty());
    assert!(!store.data_path().exists());
}

#[tokio::test]
async fn test_missing_usage_history_is_fatal_and_closes_session() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);
    let mut portal = FakePortal::new(sample_history());
    portal.usage_history_missing = true;

    let sink = RecordingSink::default();
    let result = SyncRun::new(&config)
        .run_with(&mut portal, &sink, &mut store)
        .await;

    assert!(matches!(result, Err(DrillError::Navigation(_))));
    assert!(portal.closed);
    assert!(sink.accepted().is_empty());
    assert!(!store.data_path().exists());
    assert_eq!(store.load_watermark().unwrap(), None);
}

#[tokio::test]
async fn test_corrupt_state_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);
    std::fs::write(store.state_path(), "{ broken").unwrap();
    let mut portal = FakePortal::new(sample_history());

    let result = SyncRun::new(&config)
        .run_with(&mut portal, &RecordingSink::default(), &mut store)
        .await;

    assert!(matches!(result, Err(DrillError::Storage(_))));
    assert!(portal.closed);
    assert!(portal.clicks.is_empty());
}

#[tokio::test]
async fn test_broken_week_does_not_block_delivery_of_others() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "http://localhost:8123/api/states/sensor.energy", "");
    let mut store = JsonStore::from_config(&config.storage);
    let mut portal = FakePortal::new(sample_history());
    portal.break_bar("2024-03-03");

    let sink = RecordingSink::default();
    let summary = SyncRun::new(&config)
        .run_with(&mut portal, &sink, &mut store)
        .await
        .unwrap();

    assert_eq!(
        sink.accepted(),
        vec!["2024-02-26", "2024-02-27", "2024-03-10", "2024-03-11"]
    );
    assert_eq!(summary.traversal.abandoned.len(), 1);
}
