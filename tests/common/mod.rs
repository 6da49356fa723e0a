#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::oneshot;

use table_drop::config::{DropZoneConfig, SurfaceSize};
use table_drop::error::ProducerError;
use table_drop::interaction::{
    DropEventKind, DropSurface, DropZoneEvent, EventSink, ListenerId, RenderSurface,
};
use table_drop::producer::TableProducer;
use table_drop::types::{LoadablePayload, TableOptions};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct DropLog {
    pub presented: Option<DropZoneConfig>,
    pub listeners: Vec<(ListenerId, DropEventKind, EventSink)>,
    pub unsubscribed: Vec<ListenerId>,
    pub highlighted: bool,
    pub highlight_toggles: usize,
    pub error: Option<String>,
    pub removed: bool,
    next_id: u64,
}

/// In-memory drop region. Clones share state, so a test keeps one clone to emit events and
/// inspect what the controller did to the region.
#[derive(Clone, Default)]
pub struct FakeDropSurface {
    log: Arc<Mutex<DropLog>>,
}

impl FakeDropSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` the way a host would: only to a listener subscribed to its kind.
    pub fn emit(&self, event: DropZoneEvent) -> bool {
        let sink = {
            let log = self.log.lock().unwrap();
            log.listeners
                .iter()
                .find(|(_, kind, _)| *kind == event.kind())
                .map(|(_, _, sink)| sink.clone())
        };
        match sink {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    /// Drop every sink, as a host page being closed would.
    pub fn close(&self) {
        self.log.lock().unwrap().listeners.clear();
    }

    pub fn active_listeners(&self) -> usize {
        self.log.lock().unwrap().listeners.len()
    }

    pub fn unsubscribed(&self) -> usize {
        self.log.lock().unwrap().unsubscribed.len()
    }

    pub fn highlighted(&self) -> bool {
        self.log.lock().unwrap().highlighted
    }

    pub fn error(&self) -> Option<String> {
        self.log.lock().unwrap().error.clone()
    }

    pub fn removed(&self) -> bool {
        self.log.lock().unwrap().removed
    }

    pub fn presented(&self) -> Option<DropZoneConfig> {
        self.log.lock().unwrap().presented.clone()
    }
}

impl DropSurface for FakeDropSurface {
    fn present(&mut self, config: &DropZoneConfig) {
        self.log.lock().unwrap().presented = Some(config.clone());
    }

    fn subscribe(&mut self, kind: DropEventKind, sink: EventSink) -> ListenerId {
        let mut log = self.log.lock().unwrap();
        log.next_id += 1;
        let id = ListenerId(log.next_id);
        log.listeners.push((id, kind, sink));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        let mut log = self.log.lock().unwrap();
        log.listeners.retain(|(lid, _, _)| *lid != id);
        log.unsubscribed.push(id);
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        let mut log = self.log.lock().unwrap();
        log.highlighted = highlighted;
        log.highlight_toggles += 1;
    }

    fn show_error(&mut self, message: &str) {
        self.log.lock().unwrap().error = Some(message.to_string());
    }

    fn clear_error(&mut self) {
        self.log.lock().unwrap().error = None;
    }

    fn remove(&mut self) {
        self.log.lock().unwrap().removed = true;
    }
}

pub struct RenderLog<H> {
    pub mounted: Option<SurfaceSize>,
    pub mount_calls: usize,
    pub loads: Vec<H>,
}

/// Rendering surface that records every mount/load.
pub struct RecordingRender<H> {
    log: Arc<Mutex<RenderLog<H>>>,
}

impl<H> Clone for RecordingRender<H> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<H: Clone> RecordingRender<H> {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(RenderLog {
                mounted: None,
                mount_calls: 0,
                loads: Vec::new(),
            })),
        }
    }

    pub fn loads(&self) -> Vec<H> {
        self.log.lock().unwrap().loads.clone()
    }

    pub fn last(&self) -> Option<H> {
        self.log.lock().unwrap().loads.last().cloned()
    }

    pub fn mounted(&self) -> Option<SurfaceSize> {
        self.log.lock().unwrap().mounted.clone()
    }

    pub fn mount_calls(&self) -> usize {
        self.log.lock().unwrap().mount_calls
    }
}

impl<H> RenderSurface<H> for RecordingRender<H> {
    fn mount(&mut self, size: &SurfaceSize) {
        let mut log = self.log.lock().unwrap();
        log.mounted = Some(size.clone());
        log.mount_calls += 1;
    }

    fn load(&mut self, handle: H) {
        self.log.lock().unwrap().loads.push(handle);
    }
}

/// Text form of a payload; doubles as the handle [`GatedProducer`] returns.
pub fn payload_label(payload: &LoadablePayload) -> String {
    match payload {
        LoadablePayload::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        LoadablePayload::Structured(v) => v.to_string(),
    }
}

/// Table producer double.
///
/// The handle is the payload's label. A call waits on its gate if one was registered for that
/// label, and payloads whose label starts with `reject` fail.
#[derive(Default)]
pub struct GatedProducer {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<(String, TableOptions)>>,
}

impl GatedProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold back the call for `label` until the returned sender fires.
    pub fn gate(&self, label: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(label.into(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<(String, TableOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TableProducer for GatedProducer {
    type Handle = String;

    fn table(
        &self,
        payload: LoadablePayload,
        options: TableOptions,
    ) -> impl Future<Output = Result<String, ProducerError>> {
        let label = payload_label(&payload);
        self.calls.lock().unwrap().push((label.clone(), options));
        let gate = self.gates.lock().unwrap().remove(&label);
        async move {
            if let Some(gate) = gate {
                gate.await
                    .map_err(|_| ProducerError::Worker("gate dropped".to_string()))?;
            }
            if label.starts_with("reject") {
                return Err(ProducerError::UnsupportedJson(label));
            }
            Ok(label)
        }
    }
}

/// Reader whose first read fails.
pub struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        )))
    }
}

/// Yield until `cond` holds, so other branches of a `join!` can make progress.
pub async fn yield_until(mut cond: impl FnMut() -> bool) {
    while !cond() {
        tokio::task::yield_now().await;
    }
}
