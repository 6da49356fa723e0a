//! The table producer boundary.
//!
//! The ingestion core never looks inside a table handle: it asks a [`TableProducer`] for one and
//! passes it to the rendering surface. [`PolarsTableProducer`] is the default implementation;
//! tests substitute their own.

mod dataframe;

use std::future::Future;

use crate::error::ProducerError;
use crate::types::{LoadablePayload, TableOptions};

pub use dataframe::{PolarsTableProducer, TableHandle};

/// Asynchronous factory turning a payload into a table handle.
pub trait TableProducer {
    /// Opaque handle given to the rendering surface.
    type Handle;

    /// Build a table from `payload`.
    ///
    /// `options.format` carries the delimited-text hint for CSV bytes. Implementations decide
    /// where the work runs; the returned future is awaited on the caller's task.
    fn table(
        &self,
        payload: LoadablePayload,
        options: TableOptions,
    ) -> impl Future<Output = Result<Self::Handle, ProducerError>>;
}
