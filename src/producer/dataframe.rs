//! Polars-backed table producer.
//!
//! Parsing runs on tokio's blocking pool so the caller's task stays responsive while large files
//! are decoded.

use std::fmt;
use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use polars::prelude::*;
use serde_json::{Map, Value};

use crate::error::ProducerError;
use crate::types::{LoadablePayload, TableFormat, TableOptions};

use super::TableProducer;

/// Leading magic of the Arrow IPC file format (Feather v2).
const ARROW_FILE_MAGIC: &[u8] = b"ARROW1";

/// Handle to a table built by [`PolarsTableProducer`].
#[derive(Clone)]
pub struct TableHandle {
    id: u64,
    frame: Arc<DataFrame>,
}

impl TableHandle {
    /// Producer-assigned id, unique per producer instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }
}

impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("id", &self.id)
            .field("shape", &self.frame.shape())
            .finish()
    }
}

/// Builds [`TableHandle`]s from CSV bytes, Arrow IPC bytes, or parsed JSON.
#[derive(Debug, Default)]
pub struct PolarsTableProducer {
    next_id: AtomicU64,
}

impl PolarsTableProducer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableProducer for PolarsTableProducer {
    type Handle = TableHandle;

    fn table(
        &self,
        payload: LoadablePayload,
        options: TableOptions,
    ) -> impl Future<Output = Result<TableHandle, ProducerError>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        async move {
            let frame = tokio::task::spawn_blocking(move || build_frame(payload, options))
                .await
                .map_err(|e| ProducerError::Worker(e.to_string()))??;
            tracing::debug!(
                table_id = id,
                rows = frame.height(),
                columns = frame.width(),
                "table built"
            );
            Ok(TableHandle {
                id,
                frame: Arc::new(frame),
            })
        }
    }
}

fn build_frame(payload: LoadablePayload, options: TableOptions) -> Result<DataFrame, ProducerError> {
    match (payload, options.format) {
        (LoadablePayload::Bytes(bytes), Some(TableFormat::Csv)) => Ok(read_csv(bytes)?),
        (LoadablePayload::Bytes(bytes), None) => Ok(read_arrow(bytes)?),
        (LoadablePayload::Structured(value), _) => read_json(value),
    }
}

fn read_csv(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Arrow IPC in either the file layout (Feather v2, `ARROW1` magic) or the stream layout.
fn read_arrow(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    if bytes.starts_with(ARROW_FILE_MAGIC) {
        IpcReader::new(Cursor::new(bytes)).finish()
    } else {
        IpcStreamReader::new(Cursor::new(bytes)).finish()
    }
}

fn read_json(value: Value) -> Result<DataFrame, ProducerError> {
    match value {
        Value::Array(rows) => read_records(rows),
        Value::Object(columns) => read_column_map(columns),
        other => Err(ProducerError::UnsupportedJson(format!(
            "expected an array of records or a map of columns, got {}",
            json_kind(&other)
        ))),
    }
}

fn read_records(records: Vec<Value>) -> Result<DataFrame, ProducerError> {
    if let Some(bad) = records.iter().find(|r| !r.is_object()) {
        return Err(ProducerError::UnsupportedJson(format!(
            "records must be objects, got {}",
            json_kind(bad)
        )));
    }

    let encoded = serde_json::to_vec(&records)
        .map_err(|e| ProducerError::UnsupportedJson(e.to_string()))?;
    Ok(JsonReader::new(Cursor::new(encoded)).finish()?)
}

/// Column maps without any values keep their columns as an empty, null-typed frame.
fn read_column_map(columns: Map<String, Value>) -> Result<DataFrame, ProducerError> {
    let names: Vec<String> = columns.keys().cloned().collect();
    let records = column_map_to_records(columns)?;
    if records.is_empty() {
        let schema: Schema = names
            .iter()
            .map(|name| Field::new(name.as_str().into(), DataType::Null))
            .collect();
        return Ok(DataFrame::empty_with_schema(&schema));
    }
    read_records(records)
}

/// `{"a": [1, 2], "b": ["x"]}` → `[{"a": 1, "b": "x"}, {"a": 2, "b": null}]`.
fn column_map_to_records(columns: Map<String, Value>) -> Result<Vec<Value>, ProducerError> {
    let mut arrays = Vec::with_capacity(columns.len());
    let mut row_count = 0;
    for (name, column) in columns {
        match column {
            Value::Array(values) => {
                row_count = row_count.max(values.len());
                arrays.push((name, values));
            }
            other => {
                return Err(ProducerError::UnsupportedJson(format!(
                    "column '{name}' must be an array, got {}",
                    json_kind(&other)
                )));
            }
        }
    }

    let mut records = vec![Map::new(); row_count];
    for (name, values) in arrays {
        let mut values = values.into_iter();
        for record in &mut records {
            record.insert(name.clone(), values.next().unwrap_or(Value::Null));
        }
    }
    Ok(records.into_iter().map(Value::Object).collect())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
