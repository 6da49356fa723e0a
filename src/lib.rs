//! `table-drop` turns files dropped onto an upload region into in-memory tables, without sending
//! their contents anywhere.
//!
//! ## Pipeline
//!
//! A drop (or a file-picker selection) produces [`types::UploadCandidate`]s. For each one,
//! independently and concurrently:
//!
//! 1. the bytes are read asynchronously,
//! 2. [`ingestion::classify`] picks a [`ingestion::DecodeStrategy`] from the file name,
//! 3. [`ingestion::decode`] produces a [`types::LoadablePayload`],
//! 4. a [`producer::TableProducer`] builds a table handle,
//! 5. the handle is loaded into the [`interaction::RenderSurface`] and the drop region is removed.
//!
//! **File names (case-sensitive suffix match):**
//!
//! - `.feather`, `.arrow`: Arrow IPC, handed to the producer as raw bytes
//! - `.json`: parsed locally (array of records or map of columns)
//! - `.csv`: raw bytes with a CSV hint
//! - anything else: treated as Arrow IPC
//!
//! ## Quick example
//!
//! ```no_run
//! use table_drop::config::DropZoneConfig;
//! use table_drop::ingestion::{IngestOptions, Orchestrator};
//! use table_drop::interaction::{
//!     DropEventKind, DropSurface, DropZoneController, EventSink, ListenerId, RenderSurface,
//! };
//! use table_drop::producer::{PolarsTableProducer, TableHandle};
//! use table_drop::session::DropZoneSession;
//! use table_drop::types::UploadCandidate;
//!
//! struct Region(Vec<EventSink>);
//!
//! impl DropSurface for Region {
//!     fn present(&mut self, _config: &DropZoneConfig) {}
//!     fn subscribe(&mut self, _kind: DropEventKind, sink: EventSink) -> ListenerId {
//!         self.0.push(sink);
//!         ListenerId(self.0.len() as u64)
//!     }
//!     fn unsubscribe(&mut self, _id: ListenerId) {}
//!     fn set_highlighted(&mut self, _highlighted: bool) {}
//!     fn show_error(&mut self, message: &str) { eprintln!("{message}"); }
//!     fn clear_error(&mut self) {}
//!     fn remove(&mut self) {}
//! }
//!
//! struct Viewer;
//!
//! impl RenderSurface<TableHandle> for Viewer {
//!     fn mount(&mut self, _size: &table_drop::config::SurfaceSize) {}
//!     fn load(&mut self, handle: TableHandle) { println!("{}", handle.frame()); }
//! }
//!
//! # async fn demo() {
//! let controller = DropZoneController::attach(Region(Vec::new()), DropZoneConfig::default());
//! let orchestrator = Orchestrator::new(PolarsTableProducer::new(), Viewer, IngestOptions::default());
//! let mut session = DropZoneSession::new(controller, orchestrator);
//! // The host emits events through the sinks it was given, e.g.
//! // sink.emit(DropZoneEvent::Drop(vec![UploadCandidate::from_path("data.csv")]));
//! let summary = session.run().await;
//! println!("{:?}", summary.final_state);
//! # let _ = UploadCandidate::from_bytes("x.csv", b"a\n1".to_vec());
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: classifier, decoder, orchestrator, observer hooks
//! - [`interaction`]: drop-zone state machine and the host surface traits
//! - [`producer`]: the table producer capability and its polars implementation
//! - [`session`]: single-task event loop wiring the pieces together
//! - [`config`]: presentation settings
//! - [`types`]: upload candidates and payloads
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod ingestion;
pub mod interaction;
pub mod producer;
pub mod session;
pub mod types;

pub use error::{DecodeError, IngestionError, IngestionResult, ProducerError};
