use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use rand::Rng;
use workpool::{JobSlot, PoolError, Result, WorkerExit, WorkerPool};

/// Starts `pool.worker_count()` threads, runs `submit`, completes the pool
/// and joins every worker.
fn run_pool<F>(pool: &WorkerPool, submit: F)
where
    F: FnOnce(&WorkerPool),
{
    thread::scope(|s| {
        let workers: Vec<_> = (0..pool.worker_count())
            .map(|_| s.spawn(move || pool.run_loop()))
            .collect();
        submit(pool);
        pool.complete();
        for worker in workers {
            worker.join().unwrap();
        }
    });
}

#[test]
fn zero_workers_is_rejected() {
    assert!(matches!(
        WorkerPool::new(0),
        Err(PoolError::InvalidWorkerCount(0))
    ));
}

#[test]
fn every_job_runs_exactly_once() -> Result<()> {
    for &workers in &[1, 2, 8] {
        for &jobs in &[0usize, 1, 100, 1000] {
            let pool = WorkerPool::new(workers)?;
            let runs: Arc<Vec<AtomicUsize>> =
                Arc::new((0..jobs).map(|_| AtomicUsize::new(0)).collect());

            run_pool(&pool, |pool| {
                for i in 0..jobs {
                    let runs = Arc::clone(&runs);
                    pool.submit(move || {
                        runs[i].fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
                }
            });

            assert!(
                runs.iter().all(|r| r.load(Ordering::SeqCst) == 1),
                "{jobs} jobs on {workers} workers"
            );
            assert_eq!(pool.pending(), 0);
        }
    }
    Ok(())
}

#[test]
fn concurrent_submitters_do_not_duplicate_jobs() -> Result<()> {
    const SUBMITTERS: usize = 4;
    const PER_SUBMITTER: usize = 500;

    let pool = WorkerPool::new(4)?;
    let runs: Arc<Vec<AtomicUsize>> = Arc::new(
        (0..SUBMITTERS * PER_SUBMITTER)
            .map(|_| AtomicUsize::new(0))
            .collect(),
    );

    run_pool(&pool, |pool| {
        thread::scope(|s| {
            for submitter in 0..SUBMITTERS {
                let runs = Arc::clone(&runs);
                s.spawn(move || {
                    let mut rng = rand::thread_rng();
                    for i in 0..PER_SUBMITTER {
                        let runs = Arc::clone(&runs);
                        let idx = submitter * PER_SUBMITTER + i;
                        let pause = rng.gen_range(0..20);
                        pool.submit(move || {
                            thread::sleep(Duration::from_micros(pause));
                            runs[idx].fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                    }
                });
            }
        });
    });

    for (idx, r) in runs.iter().enumerate() {
        assert_eq!(r.load(Ordering::SeqCst), 1, "job {idx}");
    }
    Ok(())
}

#[test]
fn four_workers_count_to_ten_thousand() -> Result<()> {
    let pool = WorkerPool::new(4)?;
    let counter = Arc::new(AtomicUsize::new(0));

    run_pool(&pool, |pool| {
        for _ in 0..10_000 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), 10_000);
    Ok(())
}

#[test]
fn submit_after_complete_is_rejected() -> Result<()> {
    let pool = WorkerPool::new(2)?;
    let ran = Arc::new(AtomicBool::new(false));

    run_pool(&pool, |_| {});
    assert!(pool.is_complete());

    let flag = Arc::clone(&ran);
    let result = pool.submit(move || flag.store(true, Ordering::SeqCst));
    assert!(matches!(result, Err(PoolError::QueueClosed)));
    assert_eq!(pool.pending(), 0);
    assert!(!ran.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn complete_is_idempotent() -> Result<()> {
    let pool = WorkerPool::new(1)?;
    pool.complete();
    pool.complete();
    assert!(pool.is_complete());
    pool.run_loop();
    Ok(())
}

#[test]
fn idle_pool_terminates() -> Result<()> {
    let pool = Arc::new(WorkerPool::new(4)?);
    let workers: Vec<_> = (0..pool.worker_count())
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.run_loop())
        })
        .collect();

    // Let the workers block on the empty queue first.
    thread::sleep(Duration::from_millis(20));
    pool.complete();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for worker in workers {
            worker.join().unwrap();
        }
        tx.send(()).unwrap();
    });
    rx.recv_timeout(Duration::from_secs(5))
        .expect("workers did not exit after complete");
    Ok(())
}

#[test]
fn single_worker_starts_jobs_in_submission_order() -> Result<()> {
    let pool = WorkerPool::new(1)?;
    let order = Arc::new(Mutex::new(Vec::new()));

    // Queue everything before the worker exists.
    for i in 0..50 {
        let order = Arc::clone(&order);
        pool.submit(move || order.lock().unwrap().push(i))?;
    }
    run_pool(&pool, |_| {});

    assert_eq!(*order.lock().unwrap(), (0..50).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn single_worker_serializes_slot_writes() -> Result<()> {
    let pool = WorkerPool::new(1)?;
    let slot = JobSlot::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    run_pool(&pool, |pool| {
        let (a_slot, a_seen) = (slot.clone(), Arc::clone(&seen));
        pool.submit(move || {
            thread::sleep(Duration::from_millis(50));
            a_slot.fill(1);
            a_seen.lock().unwrap().push('A');
        })
        .unwrap();

        let (b_slot, b_seen) = (slot.clone(), Arc::clone(&seen));
        pool.submit(move || {
            b_slot.fill(2);
            b_seen.lock().unwrap().push('B');
        })
        .unwrap();
    });

    assert_eq!(slot.get(), Some(2));
    assert_eq!(*seen.lock().unwrap(), vec!['A', 'B']);
    Ok(())
}

#[test]
fn panicking_job_does_not_kill_its_worker() -> Result<()> {
    let pool = WorkerPool::new(1)?;
    let counter = Arc::new(AtomicUsize::new(0));

    run_pool(&pool, |pool| {
        for i in 0..10 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                if i % 2 == 0 {
                    panic_control::disable_hook_in_current_thread();
                    panic!("job {i} failed");
                }
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), 5);
    Ok(())
}

#[test]
fn cancelled_workers_leave_while_idle() -> Result<()> {
    let pool = WorkerPool::new(2)?;
    let cancel = AtomicBool::new(false);
    let (pool, cancel) = (&pool, &cancel);

    thread::scope(|s| {
        let workers: Vec<_> = (0..pool.worker_count())
            .map(|_| {
                s.spawn(move || pool.run_loop_until(cancel, Duration::from_millis(5)))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        cancel.store(true, Ordering::Release);

        for worker in workers {
            assert_eq!(worker.join().unwrap(), WorkerExit::Cancelled);
        }
    });

    // Cancellation does not close the queue.
    assert!(!pool.is_complete());
    Ok(())
}

#[test]
fn bounded_wait_workers_still_drain() -> Result<()> {
    let pool = WorkerPool::new(3)?;
    let cancel = AtomicBool::new(false);
    let (pool, cancel) = (&pool, &cancel);
    let counter = Arc::new(AtomicUsize::new(0));

    thread::scope(|s| {
        let workers: Vec<_> = (0..pool.worker_count())
            .map(|_| {
                s.spawn(move || pool.run_loop_until(cancel, Duration::from_millis(1)))
            })
            .collect();

        for _ in 0..300 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.complete();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), WorkerExit::Drained);
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), 300);
    Ok(())
}
