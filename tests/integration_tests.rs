use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::Rgb;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use runscope2slack::pipeline;
use runscope2slack::render::{CELL_HEIGHT, CELL_WIDTH, GREEN, RED};
use runscope2slack::{
    load_config_with, AggregatedResult, UptimeReport, Config, MetricSample, MetricsSource, MockEnvironment,
    MockParameterStore, PublishError, Publisher, Test, Window,
};

struct FakeRunscope {
    tests: Vec<Test>,
    ratios: HashMap<(String, Window), Vec<Option<f64>>>,
}

impl FakeRunscope {
    /// The scenario from the uptime dashboard: A is missing month data, B is healthy,
    /// and a skip-listed test that must never be queried.
    fn scenario() -> Self {
        let tests = vec![
            Test { name: "A".to_string(), id: "1".to_string() },
            Test { name: "B".to_string(), id: "2".to_string() },
            Test { name: "Core WF default domain".to_string(), id: "3".to_string() },
        ];
        let mut ratios = HashMap::new();
        ratios.insert(("1".to_string(), Window::Day), vec![Some(1.0), Some(1.0)]);
        ratios.insert(("1".to_string(), Window::Week), vec![Some(0.99), None]);
        ratios.insert(("1".to_string(), Window::Month), vec![None, Some(0.0)]);
        ratios.insert(("2".to_string(), Window::Day), vec![Some(0.99), Some(1.0)]);
        ratios.insert(("2".to_string(), Window::Week), vec![Some(1.0)]);
        ratios.insert(("2".to_string(), Window::Month), vec![Some(1.0)]);
        Self { tests, ratios }
    }
}

#[async_trait]
impl MetricsSource for FakeRunscope {
    async fn list_tests(&self, bucket: &str) -> Result<Vec<Test>> {
        assert_eq!(bucket, "bucket-abc");
        Ok(self.tests.clone())
    }

    async fn get_metrics(&self, _bucket: &str, test_id: &str, window: Window) -> Result<Vec<MetricSample>> {
        let ratios = self
            .ratios
            .get(&(test_id.to_string(), window))
            .ok_or_else(|| anyhow!("unexpected metrics request for test {}", test_id))?;
        Ok(ratios.iter().map(|r| MetricSample { success_ratio: *r }).collect())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    uploads: Mutex<Vec<(String, PathBuf, String)>>,
    reject_after: Option<usize>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn upload_file(&self, channel: &str, path: &Path, title: &str) -> Result<()> {
        let mut uploads = self.uploads.lock().unwrap();
        if self.reject_after.is_some_and(|n| uploads.len() >= n) {
            return Err(PublishError::NotAcknowledged {
                file: path.display().to_string(),
                error: Some("not_authed".to_string()),
            }
            .into());
        }
        uploads.push((channel.to_string(), path.to_path_buf(), title.to_string()));
        Ok(())
    }
}

async fn test_config(output_dir: &Path) -> Config {
    let env = MockEnvironment::new()
        .with_var("RUNSCOPE_APIKEY", "key-123")
        .with_var("RUNSCOPE_BUCKET", "bucket-abc")
        .with_var("OUTPUT_DIR", output_dir.display().to_string());
    let store = MockParameterStore::new()
        .with_parameter("/applications/runscope2slack/SLACK_TOKEN", "xoxb-ssm")
        .with_parameter("/applications/runscope2slack/SLACK_CHANNEL", "uptime");
    load_config_with(&env, &store).await.unwrap()
}

fn cell_fill(path: &Path, column: u32, row: u32) -> Rgb<u8> {
    let img = image::open(path).unwrap().to_rgb8();
    *img.get_pixel(column * CELL_WIDTH + CELL_WIDTH - 5, row * CELL_HEIGHT + CELL_HEIGHT - 5)
}

#[tokio::test]
async fn test_end_to_end_publishes_three_windows() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path()).await;
    let publisher = RecordingPublisher::default();

    let report = pipeline::run(&cfg, &FakeRunscope::scenario(), &publisher).await.unwrap();

    assert_eq!(
        report.results,
        vec![
            AggregatedResult { label: "A".to_string(), day: 100.0, week: 99.0, month: 0.0 },
            AggregatedResult { label: "B".to_string(), day: 99.5, week: 100.0, month: 100.0 },
        ]
    );

    let uploads = publisher.uploads.lock().unwrap();
    let titles: Vec<&str> = uploads.iter().map(|(_, _, t)| t.as_str()).collect();
    assert_eq!(
        titles,
        vec!["GBDX trailing day uptime", "GBDX trailing week uptime", "GBDX trailing month uptime"]
    );
    assert!(uploads.iter().all(|(channel, _, _)| channel == "uptime"));
    assert_eq!(uploads[0].1, dir.path().join("day.png"));

    // A is exactly on the threshold for week, which is still green
    assert_eq!(cell_fill(&dir.path().join("day.png"), 0, 0), GREEN);
    assert_eq!(cell_fill(&dir.path().join("week.png"), 0, 0), GREEN);
    assert_eq!(cell_fill(&dir.path().join("month.png"), 0, 0), RED);
    assert_eq!(cell_fill(&dir.path().join("month.png"), 1, 0), GREEN);

    let month = image::open(dir.path().join("month.png")).unwrap().to_rgb8();
    assert_eq!(month.dimensions(), (840, 50));
}

#[tokio::test]
async fn test_rejected_upload_stops_remaining_windows() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path()).await;
    let publisher = RecordingPublisher { reject_after: Some(1), ..Default::default() };

    let err = pipeline::run(&cfg, &FakeRunscope::scenario(), &publisher).await.unwrap_err();

    assert!(err.downcast_ref::<PublishError>().is_some());
    // the day upload went through before week was rejected
    assert_eq!(publisher.uploads.lock().unwrap().len(), 1);
    assert!(dir.path().join("week.png").exists());
    assert!(!dir.path().join("month.png").exists());
}

#[tokio::test]
async fn test_metrics_failure_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path()).await;
    let mut source = FakeRunscope::scenario();
    source.ratios.remove(&("2".to_string(), Window::Month));
    let publisher = RecordingPublisher::default();

    assert!(pipeline::run(&cfg, &source, &publisher).await.is_err());
    assert!(publisher.uploads.lock().unwrap().is_empty());
    assert!(!dir.path().join("day.png").exists());
}

#[tokio::test]
async fn test_only_skipped_tests_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path()).await;
    let source = FakeRunscope {
        tests: vec![Test { name: "Core WF t2medium domain".to_string(), id: "9".to_string() }],
        ratios: HashMap::new(),
    };
    let publisher = RecordingPublisher::default();

    let report = pipeline::run(&cfg, &source, &publisher).await.unwrap();
    assert!(report.is_empty());
    assert!(publisher.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_single_window_with_issues() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path()).await;
    let report = UptimeReport::new(
        "Acme",
        vec![
            AggregatedResult { label: "Search".to_string(), day: 97.5, week: 99.9, month: 99.9 },
            AggregatedResult { label: "Ingest".to_string(), day: 0.0, week: 100.0, month: 100.0 },
        ],
    );
    let publisher = RecordingPublisher::default();

    pipeline::publish_window(&cfg, &report, Window::Day, &publisher).await.unwrap();

    let summary = report.summary(Window::Day);
    assert!(summary.has_issues());
    assert_eq!(summary.healthy(), 0);

    let uploads = publisher.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].2, "Acme trailing day uptime");
    // Ingest sorts first and has no data, so it is red
    assert_eq!(cell_fill(&dir.path().join("day.png"), 0, 0), RED);
    assert_eq!(cell_fill(&dir.path().join("day.png"), 1, 0), RED);
}

#[tokio::test]
async fn test_unavailable_store_fails_config() {
    let env = MockEnvironment::new();
    let store = MockParameterStore::new().unavailable("ThrottlingException");
    assert!(load_config_with(&env, &store).await.is_err());
}
