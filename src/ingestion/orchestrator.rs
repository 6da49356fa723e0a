//! Ingestion orchestrator.
//!
//! Each accepted file runs its own pipeline: read → classify → decode → produce. Pipelines run
//! concurrently on the caller's task and settle in completion order; the only shared resource
//! is the rendering surface, and [`AttachPolicy`] decides which result ends up on it.

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::Instrument;

use crate::error::{DecodeError, IngestionError, IngestionResult};
use crate::interaction::{DropSurface, DropZoneController, RenderSurface};
use crate::producer::TableProducer;
use crate::types::UploadCandidate;

use super::classify::{classify, DecodeStrategy};
use super::decode::decode;
use super::observability::{
    severity_for_error, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
};

/// Which result is shown when several files finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPolicy {
    /// Every successful table is loaded as it completes; the last one to finish stays visible.
    #[default]
    LastCompleted,
    /// A table is loaded only if its file was submitted after the one currently shown, so the
    /// most recently dropped file wins regardless of finishing order.
    NewestSubmission,
}

/// Options controlling ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestOptions {
    pub attach_policy: AttachPolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("attach_policy", &self.attach_policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            attach_policy: AttachPolicy::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// How one candidate's pipeline ended.
#[derive(Debug)]
pub enum CandidateOutcome {
    /// Its table was loaded into the rendering surface.
    Attached,
    /// Its table was built but the attach policy kept an existing one.
    Discarded,
    Failed(IngestionError),
}

#[derive(Debug)]
pub struct CandidateReport {
    pub seq: u64,
    pub file_name: String,
    pub strategy: Option<DecodeStrategy>,
    pub outcome: CandidateOutcome,
}

/// Per-candidate outcomes, in completion order.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub candidates: Vec<CandidateReport>,
}

impl IngestReport {
    pub fn attached(&self) -> impl Iterator<Item = &CandidateReport> {
        self.candidates
            .iter()
            .filter(|c| matches!(c.outcome, CandidateOutcome::Attached))
    }

    pub fn failures(&self) -> impl Iterator<Item = &IngestionError> {
        self.candidates.iter().filter_map(|c| match &c.outcome {
            CandidateOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }
}

/// Result of a pipeline that has not been attached yet.
pub(crate) struct Settled<H> {
    ctx: IngestionContext,
    result: Result<H, IngestionError>,
}

/// Steps 1–4 of a candidate's pipeline. Shared immutably by all in-flight candidates.
pub(crate) struct Pipeline<P> {
    producer: P,
    options: IngestOptions,
}

impl<P: TableProducer> Pipeline<P> {
    pub(crate) async fn run(&self, seq: u64, candidate: UploadCandidate) -> Settled<P::Handle> {
        let span = tracing::info_span!("ingest", file = %candidate.name(), seq);
        async move {
            let mut ctx = IngestionContext {
                file_name: candidate.name().to_owned(),
                seq,
                strategy: None,
            };
            let result = self.produce(&mut ctx, candidate).await;
            self.report(&ctx, &result);
            Settled {
                ctx,
                result: result.map(|(handle, _)| handle),
            }
        }
        .instrument(span)
        .await
    }

    async fn produce(
        &self,
        ctx: &mut IngestionContext,
        candidate: UploadCandidate,
    ) -> IngestionResult<(P::Handle, usize)> {
        let bytes = candidate.read().await.map_err(|source| IngestionError::Read {
            name: ctx.file_name.clone(),
            source,
        })?;
        let len = bytes.len();

        let strategy = classify(&ctx.file_name);
        ctx.strategy = Some(strategy);
        tracing::debug!(%strategy, bytes = len, "classified");

        let payload = decode(bytes, strategy).map_err(|e| match e {
            DecodeError::MalformedJson(source) => IngestionError::MalformedJson {
                name: ctx.file_name.clone(),
                source,
            },
        })?;

        let handle = self
            .producer
            .table(payload, strategy.table_options())
            .await
            .map_err(|source| IngestionError::TableConstruction {
                name: ctx.file_name.clone(),
                source,
            })?;
        Ok((handle, len))
    }

    fn report<H>(&self, ctx: &IngestionContext, result: &Result<(H, usize), IngestionError>) {
        let Some(obs) = self.options.observer.as_ref() else {
            return;
        };
        match result {
            Ok((_, bytes)) => obs.on_success(ctx, IngestionStats { bytes: *bytes }),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }
}

/// Step 5: the single rendering slot every pipeline competes for.
pub(crate) struct DisplaySlot<R> {
    surface: R,
    policy: AttachPolicy,
    mounted: bool,
    shown: Option<u64>,
}

impl<R> DisplaySlot<R> {
    pub(crate) fn settle<H, S>(
        &mut self,
        settled: Settled<H>,
        controller: &mut DropZoneController<S>,
    ) -> CandidateReport
    where
        R: RenderSurface<H>,
        S: DropSurface,
    {
        let Settled { ctx, result } = settled;
        let outcome = match result {
            Ok(handle) if self.accepts(ctx.seq) => {
                if !self.mounted {
                    self.surface.mount(&controller.config().surface_size);
                    self.mounted = true;
                }
                if let Some(previous) = self.shown {
                    tracing::warn!(
                        file = %ctx.file_name,
                        seq = ctx.seq,
                        replaced_seq = previous,
                        "replacing the displayed table"
                    );
                }
                self.surface.load(handle);
                self.shown = Some(ctx.seq);
                controller.table_attached();
                tracing::info!(file = %ctx.file_name, seq = ctx.seq, "table attached");
                CandidateOutcome::Attached
            }
            Ok(_) => {
                tracing::debug!(
                    file = %ctx.file_name,
                    seq = ctx.seq,
                    shown_seq = ?self.shown,
                    "discarding table from an older submission"
                );
                controller.result_discarded();
                CandidateOutcome::Discarded
            }
            Err(e) => {
                tracing::warn!(file = %ctx.file_name, seq = ctx.seq, error = %e, "ingestion failed");
                controller.ingestion_failed(&e);
                CandidateOutcome::Failed(e)
            }
        };

        CandidateReport {
            seq: ctx.seq,
            file_name: ctx.file_name,
            strategy: ctx.strategy,
            outcome,
        }
    }

    fn accepts(&self, seq: u64) -> bool {
        match (self.policy, self.shown) {
            (AttachPolicy::LastCompleted, _) | (_, None) => true,
            (AttachPolicy::NewestSubmission, Some(shown)) => seq > shown,
        }
    }
}

/// Coordinates pipelines for accepted files and attaches their tables.
pub struct Orchestrator<P, R> {
    pipeline: Pipeline<P>,
    slot: DisplaySlot<R>,
    next_seq: u64,
}

impl<P, R> Orchestrator<P, R>
where
    P: TableProducer,
    R: RenderSurface<P::Handle>,
{
    pub fn new(producer: P, render_surface: R, options: IngestOptions) -> Self {
        let policy = options.attach_policy;
        Self {
            pipeline: Pipeline { producer, options },
            slot: DisplaySlot {
                surface: render_surface,
                policy,
                mounted: false,
                shown: None,
            },
            next_seq: 0,
        }
    }

    pub fn producer(&self) -> &P {
        &self.pipeline.producer
    }

    pub fn render_surface(&self) -> &R {
        &self.slot.surface
    }

    /// Submission number of the table currently shown.
    pub fn shown_seq(&self) -> Option<u64> {
        self.slot.shown
    }

    /// Run every candidate's pipeline concurrently and attach the results.
    ///
    /// Failures are reported per candidate and never affect siblings. Returns once every
    /// pipeline has settled.
    pub async fn ingest<S: DropSurface>(
        &mut self,
        candidates: Vec<UploadCandidate>,
        controller: &mut DropZoneController<S>,
    ) -> IngestReport {
        controller.begin_ingestion(candidates.len());
        let (pipeline, slot, next_seq) = self.parts();

        let mut in_flight: FuturesUnordered<_> = candidates
            .into_iter()
            .map(move |candidate| pipeline.run(take_seq(next_seq), candidate))
            .collect();

        let mut report = IngestReport::default();
        while let Some(settled) = in_flight.next().await {
            report.candidates.push(slot.settle(settled, controller));
        }
        report
    }

    /// Disjoint borrows so pipelines can run while results are attached.
    pub(crate) fn parts(&mut self) -> (&Pipeline<P>, &mut DisplaySlot<R>, &mut u64) {
        (&self.pipeline, &mut self.slot, &mut self.next_seq)
    }
}

pub(crate) fn take_seq(next_seq: &mut u64) -> u64 {
    let seq = *next_seq;
    *next_seq += 1;
    seq
}
