use std::io::{self, Write};
use std::process::exit;

use clap::{Parser, ValueEnum};
use log::{error, info};

use workpool::collatz::{run_collatz, CollatzReport};
use workpool::{RayonThreadPool, Result, SharedQueueThreadPool, ThreadPool};

const DEFAULT_EVERY: u64 = 10_000;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PoolKind {
    /// Fixed workers draining one shared queue
    Shared,
    /// rayon's work-stealing pool
    Rayon,
}

#[derive(Parser)]
#[command(
    name = "collatz",
    version,
    about = "Computes Collatz sequence lengths on a worker pool"
)]
struct Cli {
    /// Number of worker threads (capped at the number of CPUs)
    #[arg(value_name = "THREADS")]
    threads: u32,

    /// Number of inputs, 1 through TRIALS
    #[arg(value_name = "TRIALS")]
    trials: u64,

    /// Pool implementation
    #[arg(long, value_enum, default_value_t = PoolKind::Shared)]
    pool: PoolKind,

    /// Print every input divisible by this (0 disables)
    #[arg(long, default_value_t = DEFAULT_EVERY, value_name = "N")]
    every: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cpus = num_cpus::get() as u32;
    let threads = cli.threads.min(cpus).max(1);

    info!("collatz {}", env!("CARGO_PKG_VERSION"));
    info!("System supports {} threads", cpus);
    info!(
        "Running {} trials on {} {:?} worker(s)",
        cli.trials, threads, cli.pool
    );

    let report = match cli.pool {
        PoolKind::Shared => run_collatz(
            SharedQueueThreadPool::new(threads)?,
            cli.trials,
            cli.every,
        )?,
        PoolKind::Rayon => run_collatz(RayonThreadPool::new(threads)?, cli.trials, cli.every)?,
    };

    if cli.json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        print_report(&report)?;
    }
    Ok(())
}

fn print_report(report: &CollatzReport) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for entry in &report.milestones {
        writeln!(stdout, "{}\t{}", entry.num, entry.count)?;
    }
    if let Some(max) = report.max {
        writeln!(stdout, "MAX COLLATZ = {}\t{}", max.num, max.count)?;
    }
    Ok(())
}
