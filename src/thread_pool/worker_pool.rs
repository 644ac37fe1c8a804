use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, error};

use super::queue::{Job, JobQueue, Take};
use crate::{PoolError, Result};

/// Why a worker left `run_loop_until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The queue was closed and every queued job had been taken.
    Drained,
    /// The cancellation flag was raised while the worker was idle.
    Cancelled,
}

/// A fixed-size pool of workers sharing one job queue.
///
/// The pool does not start any threads. The caller spawns `worker_count`
/// threads, each running [`WorkerPool::run_loop`], keeps their handles, and
/// joins them after [`WorkerPool::complete`]:
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::thread;
/// use workpool::WorkerPool;
///
/// let pool = WorkerPool::new(2).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// thread::scope(|s| {
///     for _ in 0..pool.worker_count() {
///         s.spawn(|| pool.run_loop());
///     }
///     for _ in 0..10 {
///         let counter = Arc::clone(&counter);
///         pool.submit(move || {
///             counter.fetch_add(1, Ordering::SeqCst);
///         })
///         .unwrap();
///     }
///     pool.complete();
/// });
///
/// assert_eq!(counter.load(Ordering::SeqCst), 10);
/// ```
///
/// A job that panics is logged and dropped; the worker that ran it keeps
/// serving the queue.
pub struct WorkerPool {
    worker_count: usize,
    queue: JobQueue,
}

impl WorkerPool {
    /// Creates a pool for `worker_count` workers with an accepting queue.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidWorkerCount` if `worker_count` is zero.
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(PoolError::InvalidWorkerCount(worker_count));
        }
        Ok(WorkerPool {
            worker_count,
            queue: JobQueue::new(),
        })
    }

    /// Number of workers the caller is expected to start.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Jobs queued but not yet taken by a worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` once `complete` has been called.
    pub fn is_complete(&self) -> bool {
        !self.queue.is_accepting()
    }

    /// Queues `job` for execution by one of the workers.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::QueueClosed` after `complete`.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.submit(Box::new(job))
    }

    /// Stops accepting jobs. Queued jobs still run.
    ///
    /// Does not wait for the workers; join them afterwards.
    pub fn complete(&self) {
        debug!("Worker pool closed with {} job(s) pending", self.pending());
        self.queue.close();
    }

    /// The worker loop: runs jobs until the queue is closed and empty.
    pub fn run_loop(&self) {
        while let Some(job) = self.queue.try_take() {
            execute(job);
        }
        debug!("{}: queue drained, exiting", worker_name());
    }

    /// A worker loop that can also be stopped from outside.
    ///
    /// While idle the worker wakes every `poll` to check `cancel`. A job
    /// that was already taken runs to completion before the flag is seen.
    pub fn run_loop_until(&self, cancel: &AtomicBool, poll: Duration) -> WorkerExit {
        loop {
            if cancel.load(Ordering::Acquire) {
                debug!("{}: cancelled", worker_name());
                return WorkerExit::Cancelled;
            }
            match self.queue.take_timeout(poll) {
                Take::Job(job) => execute(job),
                Take::TimedOut => {}
                Take::Closed => {
                    debug!("{}: queue drained, exiting", worker_name());
                    return WorkerExit::Drained;
                }
            }
        }
    }
}

fn execute(job: Job) {
    debug!("{} executing job", worker_name());
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
        error!(
            "{}: job panicked, continuing: {}",
            worker_name(),
            panic_message(payload.as_ref())
        );
    }
}

fn worker_name() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_owned(),
        None => format!("{:?}", current.id()),
    }
}

/// Extracts the message from a panic payload, if it carries one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
