//! Event loop tying the drop zone to the orchestrator.
//!
//! Everything runs on the calling task: events are handled between pipeline steps, and the
//! pipelines themselves only suspend while reading a file or waiting on the table producer.

use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::ingestion::{take_seq, IngestReport, Orchestrator};
use crate::interaction::{DropSurface, DropZoneController, InteractionState, RenderSurface};
use crate::producer::TableProducer;

/// What a finished [`DropZoneSession::run`] observed.
#[derive(Debug)]
pub struct SessionSummary {
    pub final_state: InteractionState,
    /// Submission number of the table left on the rendering surface.
    pub shown_seq: Option<u64>,
    pub report: IngestReport,
}

/// A drop zone wired to an orchestrator.
pub struct DropZoneSession<S: DropSurface, P, R> {
    controller: DropZoneController<S>,
    orchestrator: Orchestrator<P, R>,
}

impl<S, P, R> DropZoneSession<S, P, R>
where
    S: DropSurface,
    P: TableProducer,
    R: RenderSurface<P::Handle>,
{
    pub fn new(controller: DropZoneController<S>, orchestrator: Orchestrator<P, R>) -> Self {
        Self {
            controller,
            orchestrator,
        }
    }

    pub fn controller(&self) -> &DropZoneController<S> {
        &self.controller
    }

    pub fn orchestrator(&self) -> &Orchestrator<P, R> {
        &self.orchestrator
    }

    /// Handle events and settle pipelines until the drop zone stops listening and nothing is in
    /// flight.
    ///
    /// The drop zone stops listening once a table is displayed, or when the host drops every
    /// [`crate::interaction::EventSink`] it was given. Pipelines still in flight at that point run
    /// to completion and are attached according to the orchestrator's attach policy.
    pub async fn run(&mut self) -> SessionSummary {
        let Self {
            controller,
            orchestrator,
        } = self;
        let (pipeline, slot, next_seq) = orchestrator.parts();

        let mut report = IngestReport::default();
        let mut in_flight = FuturesUnordered::new();
        let mut listening = true;

        loop {
            tokio::select! {
                event = controller.next_event(), if listening => {
                    let Some(event) = event else {
                        tracing::debug!(pending = in_flight.len(), "drop zone stopped listening");
                        listening = false;
                        continue;
                    };
                    let response = controller.handle(event);
                    if response.accepted.is_empty() {
                        continue;
                    }
                    controller.begin_ingestion(response.accepted.len());
                    for candidate in response.accepted {
                        in_flight.push(pipeline.run(take_seq(next_seq), candidate));
                    }
                }
                Some(settled) = in_flight.next(), if !in_flight.is_empty() => {
                    report.candidates.push(slot.settle(settled, controller));
                }
                else => break,
            }
        }
        drop(in_flight);

        SessionSummary {
            final_state: controller.state(),
            shown_seq: orchestrator.shown_seq(),
            report,
        }
    }
}
