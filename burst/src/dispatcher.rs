use std::{sync::Arc, thread, time::Instant};

use anyhow::Error;

use crate::{
    cfg::Config,
    engine::{Job, Task},
    pool::WorkerPool,
    sink::Sink,
};

/// Submission counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Number of ticks performed.
    pub ticks: u64,
    /// Number of jobs submitted to the pool.
    pub submitted: u64,
}

/// Rate-controlled dispatch loop.
///
/// Every tick submits `rate` jobs to the worker pool without waiting for their
/// completion, then sleeps for the tick interval. Ticks continue while the
/// elapsed time is less than the configured duration.
#[derive(Debug)]
pub struct Dispatcher<T, S> {
    cfg: Config,
    task: Arc<T>,
    sink: Arc<S>,
}

impl<T, S> Dispatcher<T, S>
where
    T: Task + Send + Sync + 'static,
    S: Sink + 'static,
{
    pub fn new(cfg: Config, task: Arc<T>, sink: Arc<S>) -> Self {
        Self { cfg, task, sink }
    }

    /// Runs the load, then waits for all in-flight requests to complete.
    pub fn run(self) -> Result<Report, Error> {
        let Config { target, rate, duration, .. } = &self.cfg;

        self.sink.emit(&format!(
            "Starting load test on {target} for {} seconds...",
            duration.as_secs()
        ));
        self.sink.emit(&format!("Generating {rate} requests per second."));

        let pool = WorkerPool::new(*rate, self.task.clone(), self.sink.clone())?;
        log::info!("running {target} at {rate} rps for {duration:?}");

        // Drain even when submission fails, so in-flight requests still report.
        let rc = self.dispatch(&pool);
        pool.join();
        let report = rc?;

        self.sink.emit("Load test finished.");

        Ok(report)
    }

    fn dispatch(&self, pool: &WorkerPool) -> Result<Report, Error> {
        let Config { rate, duration, interval, .. } = &self.cfg;

        let mut report = Report::default();
        let now = Instant::now();
        while now.elapsed() < *duration {
            let tick_now = Instant::now();
            for seq in 0..rate.get() {
                pool.submit(Job::new(report.ticks, seq))?;
                report.submitted += 1;
            }

            let elapsed = tick_now.elapsed();
            if elapsed > *interval {
                log::warn!("tick {} submission took {elapsed:?}, rate is below target", report.ticks);
            } else {
                log::debug!("tick {}: submitted {rate} jobs in {elapsed:?}", report.ticks);
            }
            report.ticks += 1;

            thread::sleep(*interval);
        }

        log::info!(
            "submitted {} requests in {} ticks, waiting for in-flight requests",
            report.submitted,
            report.ticks
        );

        Ok(report)
    }
}
