//! Test doubles for the forwarding boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ForwardError;
use crate::forward::LogForwarder;
use crate::record::LogRecord;

/// Collects forwarded records in memory.
///
/// Clones share the same storage, so a test can keep one handle while the
/// code under test owns another.
#[derive(Clone, Debug, Default)]
pub struct RecordingForwarder {
    records: Arc<Mutex<Vec<LogRecord>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every record is rejected with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogForwarder for RecordingForwarder {
    fn forward(&self, record: LogRecord) -> Result<(), ForwardError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ForwardError::Transport("recording forwarder set to fail".into()));
        }
        self.lock().push(record);
        Ok(())
    }
}
