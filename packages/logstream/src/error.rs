//! Error types for log streaming and forwarding.

use thiserror::Error;

/// Errors raised to writers of a [`LoggerStream`](crate::LoggerStream).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The requested slice does not lie within the written buffer.
    #[error("write out of bounds: offset {offset}, length {length}, buffer length {len}")]
    OutOfBounds {
        offset: usize,
        length: usize,
        len: usize,
    },
}

/// Errors from handing a record to the native boundary.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The forwarding queue is full; the record was not accepted.
    #[error("forwarding queue is full")]
    QueueFull,

    /// The forwarder has been shut down.
    #[error("forwarder is shut down")]
    Closed,

    /// The boundary call itself failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A forwarding worker thread could not be started.
    #[error("failed to spawn forwarding worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<StreamError> for std::io::Error {
    fn from(e: StreamError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    }
}
