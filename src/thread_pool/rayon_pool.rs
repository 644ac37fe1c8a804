use crossbeam::sync::WaitGroup;
use log::error;

use super::worker_pool::panic_message;
use super::ThreadPool;
use crate::{PoolError, Result};

/// A thread pool backed by the `rayon` library.
///
/// Uses rayon's work-stealing scheduler; kept as a baseline to compare the
/// shared-queue pool against. Outstanding jobs are tracked with a
/// `WaitGroup` so `join` can wait for them.
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
    pending: WaitGroup,
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32) -> Result<Self> {
        if threads == 0 {
            return Err(PoolError::InvalidWorkerCount(0));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .thread_name(|id| format!("rayon-worker-{id}"))
            .panic_handler(|payload| {
                error!("Job panicked, continuing: {}", panic_message(payload.as_ref()));
            })
            .build()
            .map_err(|e| PoolError::StringError(e.to_string()))?;
        Ok(RayonThreadPool {
            pool,
            pending: WaitGroup::new(),
        })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let pending = self.pending.clone();
        self.pool.spawn(move || {
            // Released on unwind as well.
            let _pending = pending;
            job();
        });
        Ok(())
    }

    fn join(self) -> Result<()> {
        self.pending.wait();
        Ok(())
    }
}
