use crate::Result;

/// A thread pool for executing jobs concurrently.
///
/// Implementors manage a set of worker threads, distribute spawned jobs
/// across them, and can be joined once no more work will be spawned.
pub trait ThreadPool {
    /// Creates a new thread pool with the given number of threads.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created (e.g., zero threads,
    /// or the OS refuses to spawn one).
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Spawns a function into the thread pool.
    ///
    /// The function will be executed by one of the threads in the pool. A
    /// panicking function does not take its worker down with it.
    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;

    /// Waits until every spawned function has run, then releases the workers.
    fn join(self) -> Result<()>
    where
        Self: Sized;
}

mod queue;
mod rayon_pool;
mod shared_queue;
mod worker_pool;

pub use self::queue::{Job, JobQueue, Take};
pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
pub use self::worker_pool::{WorkerExit, WorkerPool};
