use std::io;
use thiserror::Error;

/// Error type for worker pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// IO error, e.g. the OS refused to spawn a worker thread.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error while writing a report.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A job was submitted after the queue stopped accepting work.
    #[error("Job queue is closed")]
    QueueClosed,

    /// A pool was requested with an unusable number of workers.
    #[error("Invalid worker count: {0}")]
    InvalidWorkerCount(usize),

    /// A worker thread terminated abnormally.
    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    /// The Collatz sequence is undefined for zero.
    #[error("Collatz sequence is undefined for 0")]
    CollatzZero,

    /// The Collatz sequence starting at this input left the 128-bit range.
    #[error("Collatz sequence for {0} overflows")]
    CollatzOverflow(u64),

    /// Error with a string message.
    #[error("{0}")]
    StringError(String),
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
