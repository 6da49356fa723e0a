//! Per-file outcome hooks.
//!
//! Every candidate reports exactly once: [`IngestionObserver::on_success`] when its table was
//! built, or [`IngestionObserver::on_failure`] when its pipeline stopped, followed by
//! [`IngestionObserver::on_alert`] if the failure reached [`crate::ingestion::IngestOptions`]'s
//! alert threshold. Whether the table ends up displayed is not an observer concern; see
//! [`crate::ingestion::IngestReport`].

use std::fmt;
use std::sync::Arc;

use crate::error::{IngestionError, ProducerError};

use super::classify::DecodeStrategy;

/// Ordered severities; `alert_at_or_above` compares against these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    Info,
    Warning,
    /// The file itself was unusable: bad JSON, a corrupt container, an unsupported shape.
    Error,
    /// The file never reached the decoder, or the table worker died.
    Critical,
}

/// Which candidate an event is about.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// File name as supplied by the host.
    pub file_name: String,
    /// Submission order within the session (0-based).
    pub seq: u64,
    /// `None` when the candidate failed before it was classified.
    pub strategy: Option<DecodeStrategy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Bytes read from the candidate.
    pub bytes: usize,
}

/// Receives one event per candidate. Called on the task driving ingestion, so keep it cheap.
pub trait IngestionObserver: Send + Sync {
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called after [`Self::on_failure`] for failures at or above the alert threshold.
    fn on_alert(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}
}

/// Forwards every event to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits ingestion events as `tracing` records under the `table_drop::ingest` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            target: "table_drop::ingest",
            file = %ctx.file_name,
            seq = ctx.seq,
            strategy = ?ctx.strategy,
            bytes = stats.bytes,
            "table produced"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            target: "table_drop::ingest",
            file = %ctx.file_name,
            seq = ctx.seq,
            strategy = ?ctx.strategy,
            ?severity,
            error = %error,
            "ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            target: "table_drop::ingest",
            file = %ctx.file_name,
            seq = ctx.seq,
            ?severity,
            error = %error,
            "ingestion alert"
        );
    }
}

/// Severity of a failed candidate.
///
/// Only failures outside the file's content are critical: the host could not deliver the bytes, or
/// the table worker died. Anything the producer rejects (including truncated containers that polars
/// reports as I/O errors while parsing from memory) is the file's fault and maps to `Error`.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Read { .. } => IngestionSeverity::Critical,
        IngestionError::TableConstruction {
            source: ProducerError::Worker(_),
            ..
        } => IngestionSeverity::Critical,
        IngestionError::MalformedJson { .. } | IngestionError::TableConstruction { .. } => {
            IngestionSeverity::Error
        }
    }
}
