//! The ingestion pipeline.
//!
//! - [`classify`] picks a [`DecodeStrategy`] from a file name.
//! - [`decode`] turns raw bytes into a [`crate::types::LoadablePayload`].
//! - [`Orchestrator`] runs read → classify → decode → produce for every accepted file and
//!   attaches the resulting tables to the rendering surface.
//! - [`observability`] reports success/failure/alerts to an [`IngestionObserver`].

mod classify;
mod decode;
pub mod observability;
mod orchestrator;

pub use classify::{classify, DecodeStrategy};
pub use decode::decode;
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use orchestrator::{
    AttachPolicy, CandidateOutcome, CandidateReport, IngestOptions, IngestReport, Orchestrator,
};

pub(crate) use orchestrator::take_seq;
