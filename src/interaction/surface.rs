//! Host-side surfaces the controller and orchestrator drive.
//!
//! A host (browser bindings, a desktop shell, a test double) implements [`DropSurface`] for the
//! upload region and [`RenderSurface`] for the table viewer. Both are handed to their owners at
//! construction time; nothing is looked up globally.

use tokio::sync::mpsc;

use crate::config::{DropZoneConfig, SurfaceSize};
use crate::types::UploadCandidate;

/// Event kinds a drop surface can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropEventKind {
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    PickerChange,
}

impl DropEventKind {
    pub const ALL: [DropEventKind; 5] = [
        Self::DragEnter,
        Self::DragOver,
        Self::DragLeave,
        Self::Drop,
        Self::PickerChange,
    ];

    /// Whether the host must cancel its default handling (opening the file in place).
    ///
    /// Hosts whose default must be cancelled synchronously inside the listener use this instead of
    /// waiting for [`crate::interaction::EventResponse::prevent_default`].
    pub fn suppresses_default(self) -> bool {
        !matches!(self, Self::PickerChange)
    }
}

/// An event raised on the drop surface.
#[derive(Debug)]
pub enum DropZoneEvent {
    DragEnter,
    DragOver,
    DragLeave,
    /// Files dropped onto the region. May be empty (e.g. a dragged text selection).
    Drop(Vec<UploadCandidate>),
    /// Files chosen through the picker.
    PickerChange(Vec<UploadCandidate>),
}

impl DropZoneEvent {
    pub fn kind(&self) -> DropEventKind {
        match self {
            Self::DragEnter => DropEventKind::DragEnter,
            Self::DragOver => DropEventKind::DragOver,
            Self::DragLeave => DropEventKind::DragLeave,
            Self::Drop(_) => DropEventKind::Drop,
            Self::PickerChange(_) => DropEventKind::PickerChange,
        }
    }
}

/// Identifies one listener registered through [`DropSurface::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Where a host delivers events for a subscribed kind.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<DropZoneEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<DropZoneEvent>) -> Self {
        Self { tx }
    }

    /// Deliver an event. Returns `false` once the controller has stopped listening.
    pub fn emit(&self, event: DropZoneEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The upload region.
pub trait DropSurface {
    /// Render the prompt, privacy note and picker.
    fn present(&mut self, config: &DropZoneConfig);

    /// Start delivering `kind` events to `sink`.
    fn subscribe(&mut self, kind: DropEventKind, sink: EventSink) -> ListenerId;

    /// Stop delivering events for a listener returned by [`Self::subscribe`].
    fn unsubscribe(&mut self, id: ListenerId);

    /// Toggle the drag-over highlight.
    fn set_highlighted(&mut self, highlighted: bool);

    /// Show an inline error message inside the region.
    fn show_error(&mut self, message: &str);

    fn clear_error(&mut self);

    /// Remove the region permanently.
    fn remove(&mut self);
}

/// The table viewer a handle is loaded into.
pub trait RenderSurface<H> {
    /// Insert the viewer into the page at `size`. Called once, before the first `load`.
    fn mount(&mut self, size: &SurfaceSize);

    /// Display `handle`, replacing whatever was shown before.
    fn load(&mut self, handle: H);
}
