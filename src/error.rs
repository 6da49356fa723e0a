use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type reported for a single upload candidate.
///
/// Every variant is local to one candidate: it aborts that candidate's pipeline only and is never
/// retried. Sibling candidates that are still in flight are unaffected.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Reading the candidate's bytes failed (permission denied, missing file, broken stream).
    #[error("failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The candidate was classified as JSON but its text is not valid JSON.
    #[error("malformed json in '{name}': {source}")]
    MalformedJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The table producer rejected the payload (bad container, unsupported shape, ...).
    #[error("failed to build table from '{name}': {source}")]
    TableConstruction {
        name: String,
        #[source]
        source: ProducerError,
    },
}

impl IngestionError {
    /// Name of the candidate this error belongs to.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Read { name, .. }
            | Self::MalformedJson { name, .. }
            | Self::TableConstruction { name, .. } => name,
        }
    }
}

/// Error returned by [`crate::ingestion::decode`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed json: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// Error returned by a [`crate::producer::TableProducer`].
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Polars could not parse the payload.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// The JSON value is neither an array of records nor a map of columns.
    #[error("unsupported json shape: {0}")]
    UnsupportedJson(String),

    /// The background worker running the parse did not complete.
    #[error("table worker failed: {0}")]
    Worker(String),
}
