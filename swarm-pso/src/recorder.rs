//! NDJSON event recorder.
//!
//! Appends every [`SwarmEvent`] as one JSON line to any [`Write`] sink,
//! e.g. a `runs/<name>/events.ndjson` file for offline inspection. Writes
//! go through a mutex so lines never interleave. Because observers cannot
//! fail a run, the first write error is kept and reported by
//! [`EventRecorder::finish`]; later events are dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use swarm_pso_core::observe::{SwarmEvent, SwarmObserver};

/// Event recording errors
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A writer panicked while holding the lock
    #[error("event recorder mutex poisoned")]
    Poisoned,
}

struct Inner<W> {
    writer: W,
    lines: u64,
    error: Option<RecorderError>,
}

/// Observer writing NDJSON lines
pub struct EventRecorder<W: Write> {
    inner: Mutex<Inner<W>>,
}

impl EventRecorder<BufWriter<File>> {
    /// Append to `path`, creating it and its parent directories if needed
    pub fn append_to(path: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                writer,
                lines: 0,
                error: None,
            }),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, Inner<W>>, RecorderError> {
        self.inner.lock().map_err(|_| RecorderError::Poisoned)
    }

    /// Append one event.
    pub fn record(&self, event: &SwarmEvent) -> Result<(), RecorderError> {
        let mut inner = self.guard()?;
        append_ndjson(&mut inner.writer, event)?;
        inner.lines += 1;
        Ok(())
    }

    /// Number of lines written so far
    pub fn lines(&self) -> u64 {
        self.guard().map(|inner| inner.lines).unwrap_or(0)
    }

    /// Flush and return the sink, or the first error hit while observing.
    pub fn finish(self) -> Result<W, RecorderError> {
        let inner = self.inner.into_inner().map_err(|_| RecorderError::Poisoned)?;
        if let Some(err) = inner.error {
            return Err(err);
        }
        let mut writer = inner.writer;
        writer.flush()?;
        Ok(writer)
    }
}

impl<W: Write> SwarmObserver for EventRecorder<W> {
    fn notify(&self, event: &SwarmEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.error.is_some() {
            return;
        }
        match append_ndjson(&mut inner.writer, event) {
            Ok(()) => inner.lines += 1,
            Err(err) => {
                tracing::warn!(error = %err, "dropping swarm events after write failure");
                inner.error = Some(err);
            }
        }
    }
}

fn append_ndjson<W: Write>(writer: &mut W, event: &SwarmEvent) -> Result<(), RecorderError> {
    serde_json::to_writer(&mut *writer, event)?;
    writer.write_all(b"\n")?;
    Ok(())
}
