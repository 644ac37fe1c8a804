#![deny(missing_docs)]

//! A fixed-capacity worker pool fed by a single shared job queue.
//!
//! Workers block on the queue until a job arrives or the queue is closed
//! and drained. Shutdown happens in two steps: `complete` stops accepting
//! work, then the caller joins its worker threads once the backlog is gone.

pub mod collatz;
mod error;
mod slot;
/// Worker pool, job queue and managed thread pool implementations.
pub mod thread_pool;

pub use error::{PoolError, Result};
pub use slot::JobSlot;
pub use thread_pool::{
    Job, JobQueue, RayonThreadPool, SharedQueueThreadPool, Take, ThreadPool, WorkerExit,
    WorkerPool,
};
