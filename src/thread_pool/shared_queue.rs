use std::mem;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::worker_pool::{panic_message, WorkerPool};
use super::ThreadPool;
use crate::{PoolError, Result};

/// A thread pool that starts and joins its own workers.
///
/// Wraps a [`WorkerPool`]: `new` spawns one named thread per worker, each
/// running the pool's loop, and `join` (or drop) completes the queue and
/// waits for every worker to drain it.
pub struct SharedQueueThreadPool {
    pool: Arc<WorkerPool>,
    workers: Vec<JoinHandle<()>>,
}

impl SharedQueueThreadPool {
    fn shutdown(&mut self) -> Result<()> {
        self.pool.complete();

        let mut result = Ok(());
        for handle in mem::take(&mut self.workers) {
            if let Err(payload) = handle.join() {
                let msg = panic_message(payload.as_ref());
                error!("Worker thread terminated abnormally: {}", msg);
                result = Err(PoolError::WorkerPanicked(msg));
            }
        }
        result
    }
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let pool = Arc::new(WorkerPool::new(threads as usize)?);
        let mut this = SharedQueueThreadPool {
            pool,
            workers: Vec::with_capacity(threads as usize),
        };

        for id in 0..threads {
            match spawn_worker(id, Arc::clone(&this.pool)) {
                Ok(handle) => this.workers.push(handle),
                Err(e) => {
                    error!("Failed to spawn worker {id}: {e}");
                    let _ = this.shutdown();
                    return Err(e);
                }
            }
        }

        Ok(this)
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.submit(job)
    }

    fn join(mut self) -> Result<()> {
        self.shutdown()
    }
}

/// Spawns a single named worker thread running the pool's loop.
fn spawn_worker(id: u32, pool: Arc<WorkerPool>) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(format!("pool-worker-{id}"))
        .spawn(move || {
            debug!("Worker {id} started");
            pool.run_loop();
        })?;
    Ok(handle)
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            let _ = self.shutdown();
        }
    }
}
