//! Drop-zone interaction controller.
//!
//! The controller owns the upload region's interaction state and its event subscriptions. It
//! never decodes anything: accepted files are handed back to the caller, which passes them to the
//! [`crate::ingestion::Orchestrator`].
//!
//! ## State Transitions
//!
//! ```text
//! AwaitingInput -> Highlighted    (drag-enter / drag-over)
//! Highlighted   -> AwaitingInput  (drag-leave, or drop; a drop also hands its files over)
//! AwaitingInput -> Loading        (ingestion begins for at least one file)
//! Loading       -> Displaying     (first table attached; the drop region is removed)
//! Loading       -> AwaitingInput  (every in-flight file failed; an inline error stays visible)
//! ```
//!
//! `Displaying` is terminal.

mod surface;

use tokio::sync::mpsc;

use crate::config::DropZoneConfig;
use crate::error::IngestionError;
use crate::types::UploadCandidate;

pub use surface::{
    DropEventKind, DropSurface, DropZoneEvent, EventSink, ListenerId, RenderSurface,
};

/// Interaction state of the upload region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Waiting for a drop or a picker selection.
    #[default]
    AwaitingInput,
    /// Something is being dragged over the region.
    Highlighted,
    /// At least one file is being read, decoded or turned into a table.
    Loading,
    /// A table is shown; the drop region is gone.
    Displaying,
}

/// What the host should do with an event it delivered.
#[derive(Debug, Default)]
pub struct EventResponse {
    /// Cancel the host's default handling of the event.
    pub prevent_default: bool,
    /// Files to hand to the orchestrator. Empty for hover events and empty drops.
    pub accepted: Vec<UploadCandidate>,
}

/// State machine for the upload region.
///
/// Listeners are subscribed in [`DropZoneController::attach`] and released exactly once: when the
/// first table is attached, or when the controller is dropped.
pub struct DropZoneController<S: DropSurface> {
    surface: S,
    config: DropZoneConfig,
    state: InteractionState,
    in_flight: usize,
    listeners: Vec<ListenerId>,
    events: mpsc::UnboundedReceiver<DropZoneEvent>,
    showing_error: bool,
}

impl<S: DropSurface> DropZoneController<S> {
    /// Render the prompt on `surface` and subscribe to all of its event kinds.
    pub fn attach(mut surface: S, config: DropZoneConfig) -> Self {
        surface.present(&config);

        let (tx, events) = mpsc::unbounded_channel();
        let listeners = DropEventKind::ALL
            .into_iter()
            .map(|kind| surface.subscribe(kind, EventSink::new(tx.clone())))
            .collect();

        Self {
            surface,
            config,
            state: InteractionState::AwaitingInput,
            in_flight: 0,
            listeners,
            events,
            showing_error: false,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Number of accepted files whose pipelines have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn config(&self) -> &DropZoneConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Whether the controller still holds event subscriptions.
    pub fn is_listening(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Wait for the next event delivered through a subscription.
    ///
    /// Returns `None` once the controller stopped listening, or every host-side sink was dropped.
    pub async fn next_event(&mut self) -> Option<DropZoneEvent> {
        if !self.is_listening() {
            return None;
        }
        self.events.recv().await
    }

    /// Apply one event to the state machine.
    pub fn handle(&mut self, event: DropZoneEvent) -> EventResponse {
        if self.state == InteractionState::Displaying {
            return EventResponse::default();
        }

        let prevent_default = event.kind().suppresses_default();
        let accepted = match event {
            DropZoneEvent::DragEnter | DropZoneEvent::DragOver => {
                if self.state == InteractionState::AwaitingInput {
                    self.surface.set_highlighted(true);
                    self.state = InteractionState::Highlighted;
                }
                Vec::new()
            }
            DropZoneEvent::DragLeave => {
                self.unhighlight();
                Vec::new()
            }
            DropZoneEvent::Drop(files) => {
                self.unhighlight();
                self.accept(files)
            }
            DropZoneEvent::PickerChange(files) => self.accept(files),
        };

        EventResponse {
            prevent_default,
            accepted,
        }
    }

    /// The orchestrator started `count` pipelines.
    pub fn begin_ingestion(&mut self, count: usize) {
        if count == 0 || self.state == InteractionState::Displaying {
            return;
        }
        self.unhighlight();
        self.in_flight += count;
        self.state = InteractionState::Loading;
        tracing::debug!(count, in_flight = self.in_flight, "drop zone loading");
    }

    /// A table was attached to the rendering surface.
    pub fn table_attached(&mut self) {
        self.settle_one();
        if self.state != InteractionState::Displaying {
            self.teardown();
        }
    }

    /// A pipeline failed. The message is shown inline; the region stays in place.
    pub fn ingestion_failed(&mut self, error: &IngestionError) {
        self.settle_one();
        if self.state == InteractionState::Displaying {
            return;
        }
        self.surface.show_error(&error.to_string());
        self.showing_error = true;
        self.reset_if_idle();
    }

    /// A pipeline produced a table that the attach policy chose not to show.
    pub fn result_discarded(&mut self) {
        self.settle_one();
        self.reset_if_idle();
    }

    fn accept(&mut self, files: Vec<UploadCandidate>) -> Vec<UploadCandidate> {
        if !files.is_empty() && self.showing_error {
            self.surface.clear_error();
            self.showing_error = false;
        }
        files
    }

    fn unhighlight(&mut self) {
        if self.state == InteractionState::Highlighted {
            self.surface.set_highlighted(false);
            self.state = InteractionState::AwaitingInput;
        }
    }

    fn settle_one(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn reset_if_idle(&mut self) {
        if self.in_flight == 0 && self.state == InteractionState::Loading {
            self.state = InteractionState::AwaitingInput;
        }
    }

    fn teardown(&mut self) {
        self.release_listeners();
        self.events.close();
        self.surface.remove();
        self.state = InteractionState::Displaying;
        tracing::info!("drop zone removed, table displayed");
    }

    fn release_listeners(&mut self) {
        for id in self.listeners.drain(..) {
            self.surface.unsubscribe(id);
        }
    }
}

impl<S: DropSurface> Drop for DropZoneController<S> {
    fn drop(&mut self) {
        self.release_listeners();
    }
}
