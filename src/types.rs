//! Core data model types for ingestion.
//!
//! A dropped or picked file becomes an [`UploadCandidate`]. Once read and decoded it turns into a
//! [`LoadablePayload`], which a [`crate::producer::TableProducer`] turns into a table handle.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound on the buffer reserved up front from a reader's size hint.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Where an [`UploadCandidate`]'s bytes come from.
enum CandidateSource {
    Path(PathBuf),
    Memory(Vec<u8>),
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

/// One user-supplied file.
///
/// The name is only used to pick a decode strategy. Content is read exactly once:
/// [`UploadCandidate::read`] consumes the candidate.
pub struct UploadCandidate {
    name: String,
    size: Option<u64>,
    source: CandidateSource,
}

impl UploadCandidate {
    /// Candidate backed by a file on disk. The name is the path's final component.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            size: None,
            source: CandidateSource::Path(path.to_path_buf()),
        }
    }

    /// Candidate whose content is already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: Some(bytes.len() as u64),
            source: CandidateSource::Memory(bytes),
        }
    }

    /// Candidate backed by an asynchronous stream supplied by the host.
    pub fn from_reader<R>(name: impl Into<String>, size: Option<u64>, reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            name: name.into(),
            size,
            source: CandidateSource::Reader(Box::new(reader)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes, when the host knew it up front.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Read the full content.
    pub async fn read(self) -> std::io::Result<Vec<u8>> {
        match self.source {
            CandidateSource::Path(path) => tokio::fs::read(path).await,
            CandidateSource::Memory(bytes) => Ok(bytes),
            CandidateSource::Reader(mut reader) => {
                let mut buf = Vec::new();
                // Only a hint from the host; it may be wrong.
                let hint = self
                    .size
                    .and_then(|n| usize::try_from(n).ok())
                    .map_or(0, |n| n.min(MAX_PREALLOC));
                let _ = buf.try_reserve(hint);
                reader.read_to_end(&mut buf).await?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for UploadCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            CandidateSource::Path(p) => format!("path({})", p.display()),
            CandidateSource::Memory(_) => "memory".to_string(),
            CandidateSource::Reader(_) => "reader".to_string(),
        };
        f.debug_struct("UploadCandidate")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("source", &source)
            .finish()
    }
}

/// Input handed to a table producer.
///
/// Exactly one variant is produced per candidate, chosen by its
/// [`crate::ingestion::DecodeStrategy`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadablePayload {
    /// Raw file bytes (columnar binary or delimited text).
    Bytes(Vec<u8>),
    /// Parsed JSON (array of records or map of columns).
    Structured(serde_json::Value),
}

impl LoadablePayload {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(v) => Some(v),
            Self::Bytes(_) => None,
        }
    }
}

/// Format hint passed through to the table producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Treat bytes as delimited text instead of a columnar binary container.
    Csv,
}

/// Options forwarded with a payload to the table producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// `None` means the producer picks its default parse for the payload.
    pub format: Option<TableFormat>,
}

impl TableOptions {
    pub fn csv() -> Self {
        Self {
            format: Some(TableFormat::Csv),
        }
    }
}
