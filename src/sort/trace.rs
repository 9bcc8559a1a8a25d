//! Decision trace capture for sort runs, and the JSON Lines writer behind it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::debug;

use crate::record::Record;

#[derive(Debug, Clone, Serialize)]
pub struct DecisionTrace {
    pub timestamp_ms: u64,
    pub decision_index: u64,
    pub left_subject: String,
    pub right_subject: String,
    pub left_hash: String,
    pub right_hash: String,
    /// "left" or "right"; absent when the decision failed.
    pub chosen: Option<String>,
    pub decisions_estimated: f64,
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("trace writer is gone")]
    Closed,
    #[error("trace writer panicked")]
    Panicked,
}

pub trait TraceSink: Send + Sync {
    fn record(&self, event: DecisionTrace) -> Result<(), TraceError>;
}

/// Appends serializable rows to a JSON Lines file from a dedicated thread.
///
/// Dropping every clone of the sink ends the stream; [`TraceWorker::join`]
/// then reports how many lines reached the file.
pub struct JsonlSink<T> {
    sender: mpsc::Sender<T>,
}

impl<T> Clone for JsonlSink<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Decision trace written one row per resolved or failed decision.
pub type JsonlTraceSink = JsonlSink<DecisionTrace>;

pub struct TraceWorker {
    handle: std::thread::JoinHandle<Result<u64, TraceError>>,
}

impl TraceWorker {
    /// Wait for the writer to drain and flush. Returns the number of lines written.
    pub fn join(self) -> Result<u64, TraceError> {
        self.handle.join().map_err(|_| TraceError::Panicked)?
    }
}

impl<T: Serialize + Send + 'static> JsonlSink<T> {
    pub fn new(path: impl AsRef<Path>) -> Result<(Self, TraceWorker), TraceError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let (sender, rows) = mpsc::channel::<T>();
        let target = path.display().to_string();
        let handle = std::thread::Builder::new()
            .name("mob-sort-jsonl".into())
            .spawn(move || drain_rows(file, rows, &target))?;
        Ok((Self { sender }, TraceWorker { handle }))
    }

    pub fn send(&self, row: T) -> Result<(), TraceError> {
        self.sender.send(row).map_err(|_| TraceError::Closed)
    }
}

impl TraceSink for JsonlSink<DecisionTrace> {
    fn record(&self, event: DecisionTrace) -> Result<(), TraceError> {
        self.send(event)
    }
}

fn drain_rows<T: Serialize>(
    file: File,
    rows: mpsc::Receiver<T>,
    target: &str,
) -> Result<u64, TraceError> {
    let mut out = BufWriter::new(file);
    let mut written = 0u64;
    for row in rows {
        serde_json::to_writer(&mut out, &row)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    debug!(path = target, lines = written, "jsonl stream closed");
    Ok(written)
}

/// Content hash of a record, stable across runs.
pub fn record_hash(record: &Record) -> String {
    let mut hasher = blake3::Hasher::new();
    for attr in record.attributes() {
        hasher.update(attr.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(attr.value.to_string().as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}

/// Wall-clock milliseconds; a clock set before 1970 reads as 0.
pub fn now_epoch_ms() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
}
