//! Collatz sequence lengths computed as pool jobs.
//!
//! Each input becomes one job that writes its result into a [`JobSlot`]
//! owned by the submitter. Once the pool has been joined the slots are read
//! back and folded into a [`CollatzReport`].

use log::warn;
use serde::Serialize;

use crate::slot::JobSlot;
use crate::thread_pool::ThreadPool;
use crate::{PoolError, Result};

/// Number of terms in the Collatz sequence from `n` down to 1, both ends
/// included. `collatz_count(1)` is 1.
///
/// # Errors
///
/// `PoolError::CollatzZero` for zero, `PoolError::CollatzOverflow` if an
/// intermediate term does not fit in 128 bits.
pub fn collatz_count(n: u64) -> Result<u32> {
    if n == 0 {
        return Err(PoolError::CollatzZero);
    }
    let mut term = u128::from(n);
    let mut count = 1;
    while term != 1 {
        term = if term % 2 == 0 {
            term / 2
        } else {
            term.checked_mul(3)
                .and_then(|t| t.checked_add(1))
                .ok_or(PoolError::CollatzOverflow(n))?
        };
        count += 1;
    }
    Ok(count)
}

/// One input together with the slot its job reports into.
pub struct CollatzJob {
    num: u64,
    count: JobSlot<Result<u32>>,
}

impl CollatzJob {
    /// Creates an unscheduled job for `num`.
    pub fn new(num: u64) -> Self {
        CollatzJob {
            num,
            count: JobSlot::new(),
        }
    }

    /// The input.
    pub fn num(&self) -> u64 {
        self.num
    }

    /// The closure to hand to a pool. It fills this job's slot when run.
    pub fn task(&self) -> impl FnOnce() + Send + 'static {
        let num = self.num;
        let count = self.count.clone();
        move || count.fill(collatz_count(num))
    }

    /// Takes the result, or `None` if the task has not run.
    pub fn take_result(&self) -> Option<Result<u32>> {
        self.count.take()
    }
}

/// An input and its sequence length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollatzEntry {
    /// The input.
    pub num: u64,
    /// Terms in its sequence.
    pub count: u32,
}

/// An input whose job failed or never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollatzFailure {
    /// The input.
    pub num: u64,
    /// Why no count is available.
    pub error: String,
}

/// Aggregated results of a Collatz run.
#[derive(Debug, Clone, Serialize)]
pub struct CollatzReport {
    /// Number of inputs submitted.
    pub trials: u64,
    /// The first input with the longest sequence.
    pub max: Option<CollatzEntry>,
    /// Entries for inputs divisible by the milestone interval.
    pub milestones: Vec<CollatzEntry>,
    /// Inputs without a result.
    pub failures: Vec<CollatzFailure>,
}

impl CollatzReport {
    /// Folds finished jobs into a report. Consumes the jobs' results.
    ///
    /// `every == 0` disables milestones.
    pub fn collect(jobs: &[CollatzJob], every: u64) -> Self {
        let mut report = CollatzReport {
            trials: jobs.len() as u64,
            max: None,
            milestones: Vec::new(),
            failures: Vec::new(),
        };

        for job in jobs {
            let num = job.num();
            let count = match job.take_result() {
                Some(Ok(count)) => count,
                Some(Err(e)) => {
                    report.failures.push(CollatzFailure {
                        num,
                        error: e.to_string(),
                    });
                    continue;
                }
                None => {
                    report.failures.push(CollatzFailure {
                        num,
                        error: "job did not complete".to_owned(),
                    });
                    continue;
                }
            };

            let entry = CollatzEntry { num, count };
            if every != 0 && num % every == 0 {
                report.milestones.push(entry);
            }
            if report.max.map_or(true, |max| max.count < count) {
                report.max = Some(entry);
            }
        }

        report
    }
}

/// Computes sequence lengths for `1..=trials` on `pool`.
///
/// Joins the pool before reading any result.
pub fn run_collatz<P: ThreadPool>(pool: P, trials: u64, every: u64) -> Result<CollatzReport> {
    let jobs: Vec<CollatzJob> = (1..=trials).map(CollatzJob::new).collect();
    for job in &jobs {
        pool.spawn(job.task())?;
    }
    pool.join()?;

    let report = CollatzReport::collect(&jobs, every);
    for failure in &report.failures {
        warn!("Collatz job for {} failed: {}", failure.num, failure.error);
    }
    Ok(report)
}
