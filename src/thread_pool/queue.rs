use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::{PoolError, Result};

/// A unit of work: an opaque closure invoked exactly once by some worker.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of a bounded wait on the queue.
pub enum Take {
    /// The head job, now owned by the caller.
    Job(Job),
    /// The queue is closed and empty; no more work will arrive.
    Closed,
    /// Nothing arrived before the deadline and the queue is still open.
    TimedOut,
}

/// A FIFO hand-off of jobs from submitter threads to worker threads.
///
/// Backed by an unbounded MPMC channel. The sending half lives behind a
/// lock so that closing is an explicit operation: once it is dropped the
/// receivers still drain whatever was queued and then observe disconnection.
/// A send wakes a single blocked receiver; disconnection wakes all of them.
pub struct JobQueue {
    tx: RwLock<Option<Sender<Job>>>,
    rx: Receiver<Job>,
}

impl JobQueue {
    /// Creates an empty queue in the accepting state.
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        JobQueue {
            tx: RwLock::new(Some(tx)),
            rx,
        }
    }

    /// Appends `job` at the tail.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::QueueClosed` if `close` has already been called.
    pub fn submit(&self, job: Job) -> Result<()> {
        // Submitters share the read side; `close` takes the write side, so a
        // send never races with the sender being dropped.
        let tx = self.tx.read().unwrap_or_else(PoisonError::into_inner);
        match tx.as_ref() {
            Some(tx) => tx.send(job).map_err(|_| PoolError::QueueClosed),
            None => Err(PoolError::QueueClosed),
        }
    }

    /// Stops accepting jobs and wakes every blocked consumer.
    ///
    /// Calling this more than once has no further effect.
    pub fn close(&self) {
        let mut tx = self.tx.write().unwrap_or_else(PoisonError::into_inner);
        tx.take();
    }

    /// Blocks until a job is available or the queue is closed and empty.
    ///
    /// Returns `None` only in the latter case.
    pub fn try_take(&self) -> Option<Job> {
        self.rx.recv().ok()
    }

    /// Like `try_take`, but gives up after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Take {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => Take::Job(job),
            Err(RecvTimeoutError::Timeout) => Take::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Take::Closed,
        }
    }

    /// Returns `true` until `close` is called.
    pub fn is_accepting(&self) -> bool {
        self.tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of jobs waiting to be taken.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no job is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
