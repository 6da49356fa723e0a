mod common;

use std::sync::{Arc, Mutex};

use common::{FailingReader, FakeDropSurface, GatedProducer, RecordingRender};
use table_drop::config::DropZoneConfig;
use table_drop::ingestion::{
    CompositeObserver, DecodeStrategy, IngestOptions, IngestionContext, IngestionObserver,
    IngestionSeverity, IngestionStats, Orchestrator, TracingObserver,
};
use table_drop::interaction::DropZoneController;
use table_drop::producer::{PolarsTableProducer, TableHandle};
use table_drop::types::UploadCandidate;
use table_drop::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, IngestionStats)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
    strategies: Mutex<Vec<Option<DecodeStrategy>>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes
            .lock()
            .unwrap()
            .push((ctx.file_name.clone(), stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
        self.strategies.lock().unwrap().push(ctx.strategy);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

async fn ingest_one(candidate: UploadCandidate, options: IngestOptions) {
    common::init_tracing();
    let mut controller = DropZoneController::attach(FakeDropSurface::new(), DropZoneConfig::default());
    let mut orchestrator =
        Orchestrator::new(GatedProducer::new(), RecordingRender::<String>::new(), options);
    orchestrator.ingest(vec![candidate], &mut controller).await;
}

#[tokio::test]
async fn observer_receives_failure_and_alert_on_critical_read_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    // Unreadable stream -> Read error -> Critical
    ingest_one(UploadCandidate::from_reader("locked.csv", None, FailingReader), opts).await;

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
    assert_eq!(obs.strategies.lock().unwrap().clone(), vec![None]);
}

#[tokio::test]
async fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    // Malformed JSON -> Error severity (not Critical) -> should not alert
    ingest_one(UploadCandidate::from_bytes("data.json", b"not json".to_vec()), opts).await;

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    assert_eq!(
        obs.strategies.lock().unwrap().clone(),
        vec![Some(DecodeStrategy::Json)]
    );
}

#[tokio::test]
async fn lower_alert_threshold_alerts_on_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Error,
        ..Default::default()
    };

    ingest_one(UploadCandidate::from_bytes("reject.arrow", b"reject".to_vec()), opts).await;

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[tokio::test]
async fn observer_receives_byte_count_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    ingest_one(UploadCandidate::from_bytes("data.csv", b"a,b\n1,2".to_vec()), opts).await;

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![("data.csv".to_string(), IngestionStats { bytes: 7 })]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn composite_observer_fans_out_to_every_observer() {
    let first = Arc::new(RecordingObserver::default());
    let second = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> =
        vec![first.clone(), second.clone(), Arc::new(TracingObserver)];
    let composite = CompositeObserver::new(observers);
    let opts = IngestOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    ingest_one(UploadCandidate::from_bytes("data.json", b"[".to_vec()), opts).await;

    assert_eq!(first.failures.lock().unwrap().len(), 1);
    assert_eq!(second.failures.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn truncated_arrow_file_is_an_error_not_an_alert() {
    common::init_tracing();
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };
    let mut controller = DropZoneController::attach(FakeDropSurface::new(), DropZoneConfig::default());
    let mut orchestrator = Orchestrator::new(
        PolarsTableProducer::new(),
        RecordingRender::<TableHandle>::new(),
        opts,
    );

    let report = orchestrator
        .ingest(
            vec![
                UploadCandidate::from_bytes("empty.arrow", Vec::new()),
                UploadCandidate::from_bytes("cut.feather", b"ARROW1\0\0".to_vec()),
            ],
            &mut controller,
        )
        .await;

    assert_eq!(report.failures().count(), 2);
    assert_eq!(
        obs.failures.lock().unwrap().clone(),
        vec![IngestionSeverity::Error, IngestionSeverity::Error]
    );
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[derive(Default)]
struct FailureCounter {
    failures: Mutex<usize>,
}

impl IngestionObserver for FailureCounter {
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {
        *self.failures.lock().unwrap() += 1;
    }
}

#[tokio::test]
async fn alerting_failure_is_reported_once_to_on_failure() {
    let obs = Arc::new(FailureCounter::default());
    let opts = IngestOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    ingest_one(UploadCandidate::from_reader("locked.csv", None, FailingReader), opts).await;

    assert_eq!(*obs.failures.lock().unwrap(), 1);
}
