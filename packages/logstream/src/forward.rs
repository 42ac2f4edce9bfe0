//! Handing records to the native boundary.
//!
//! [`LogForwarder`] is the seam: the real native call implements it, as do
//! test doubles. [`ForwardingPool`] decouples writers from that call with a
//! bounded queue drained by a fixed set of worker threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::config::LogStreamConfig;
use crate::error::ForwardError;
use crate::record::LogRecord;

/// Something that accepts finished log records.
pub trait LogForwarder: Send + Sync {
    fn forward(&self, record: LogRecord) -> Result<(), ForwardError>;
}

impl<T: LogForwarder + ?Sized> LogForwarder for Arc<T> {
    fn forward(&self, record: LogRecord) -> Result<(), ForwardError> {
        (**self).forward(record)
    }
}

impl<T: LogForwarder + ?Sized> LogForwarder for Box<T> {
    fn forward(&self, record: LogRecord) -> Result<(), ForwardError> {
        (**self).forward(record)
    }
}

#[derive(Debug, Default)]
struct PoolStats {
    forwarded: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

/// A bounded queue in front of a forwarder, drained by worker threads.
///
/// Enqueueing never blocks: a full queue rejects the record with
/// [`ForwardError::QueueFull`]. Failures inside the workers are logged and
/// counted, never returned to the writer.
///
/// The pool owns its threads. [`shutdown`](Self::shutdown) closes the queue,
/// lets the workers drain what was already accepted and joins them; dropping
/// the pool does the same.
pub struct ForwardingPool {
    sender: RwLock<Option<mpsc::Sender<LogRecord>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<PoolStats>,
}

impl ForwardingPool {
    /// Starts `workers` threads (at least one) in front of `target`.
    pub fn new(
        target: Arc<dyn LogForwarder>,
        workers: usize,
        capacity: usize,
    ) -> Result<Self, ForwardError> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(PoolStats::default());

        let mut handles = Vec::with_capacity(workers.max(1));
        for index in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let target = Arc::clone(&target);
            let stats = Arc::clone(&stats);
            let handle = std::thread::Builder::new()
                .name(format!("yr-log-forward-{}", index))
                .spawn(move || drain(&rx, target.as_ref(), &stats))?;
            handles.push(handle);
        }
        log::debug!("started {} log forwarding workers", handles.len());

        Ok(Self {
            sender: RwLock::new(Some(tx)),
            workers: Mutex::new(handles),
            stats,
        })
    }

    pub fn from_config(
        target: Arc<dyn LogForwarder>,
        config: &LogStreamConfig,
    ) -> Result<Self, ForwardError> {
        Self::new(target, config.forward_workers, config.forward_queue_capacity)
    }

    /// Records the target accepted.
    pub fn forwarded(&self) -> u64 {
        self.stats.forwarded.load(Ordering::Relaxed)
    }

    /// Records the target rejected.
    pub fn failed(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    /// Records turned away because the queue was full.
    pub fn rejected(&self) -> u64 {
        self.stats.rejected.load(Ordering::Relaxed)
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Closes the queue and waits for the workers to finish.
    ///
    /// Every record accepted before this call is offered to the target
    /// before it returns. Further calls are no-ops.
    pub fn shutdown(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                log::error!("log forwarding worker panicked");
            }
        }
    }
}

impl LogForwarder for ForwardingPool {
    fn forward(&self, record: LogRecord) -> Result<(), ForwardError> {
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = sender.as_ref() else {
            return Err(ForwardError::Closed);
        };
        tx.try_send(record).map_err(|e| match e {
            TrySendError::Full(_) => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                ForwardError::QueueFull
            }
            TrySendError::Closed(_) => ForwardError::Closed,
        })
    }
}

impl Drop for ForwardingPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn drain(rx: &Mutex<mpsc::Receiver<LogRecord>>, target: &dyn LogForwarder, stats: &PoolStats) {
    loop {
        // The lock is held only while waiting; forwarding runs unlocked.
        let next = rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .blocking_recv();
        let Some(record) = next else {
            break;
        };
        match target.forward(record) {
            Ok(()) => {
                stats.forwarded.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("failed to forward log record: {}", e);
            }
        }
    }
}
