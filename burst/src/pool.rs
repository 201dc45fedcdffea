use core::num::NonZero;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex, PoisonError,
    },
    thread::{Builder, JoinHandle},
};

use anyhow::{anyhow, Error};
use tokio::runtime::{self, Runtime};

use crate::{
    engine::{Job, Task},
    sink::Sink,
};

/// Fixed-size pool of worker threads executing submitted jobs.
///
/// At most `size` jobs are executed concurrently, each worker running exactly
/// one job at a time. Jobs submitted while all workers are busy are queued
/// in FIFO order.
#[derive(Debug)]
pub struct WorkerPool {
    tx: Option<Sender<Job>>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` worker threads, each owning its own I/O runtime.
    ///
    /// Every job executes `task` once and writes the resulting observation to
    /// `sink`.
    pub fn new<T, S>(size: NonZero<usize>, task: Arc<T>, sink: Arc<S>) -> Result<Self, Error>
    where
        T: Task + Send + Sync + 'static,
        S: Sink + 'static,
    {
        let num_threads = size.get();
        let mut threads = Vec::with_capacity(num_threads);

        let (tx, rx) = mpsc::channel();
        let rx = Arc::new(Mutex::new(rx));

        for idx in 0..num_threads {
            let runtime = runtime::Builder::new_current_thread()
                .enable_io()
                .enable_time()
                .build()?;
            let worker = Worker {
                rx: rx.clone(),
                task: task.clone(),
                sink: sink.clone(),
                runtime,
            };

            let thread = Builder::new()
                .name(format!("burst:w{idx:03}"))
                .spawn(move || worker.run())?;

            threads.push(thread);
        }

        log::debug!("spawned {num_threads} workers");

        let m = Self { tx: Some(tx), threads };

        Ok(m)
    }

    /// Enqueues the given job without waiting for its execution.
    #[inline]
    pub fn submit(&self, job: Job) -> Result<(), Error> {
        match &self.tx {
            Some(tx) => tx.send(job).map_err(|_| anyhow!("all workers have exited")),
            None => Err(anyhow!("pool is closed")),
        }
    }

    /// Closes the queue and waits until all submitted jobs are executed.
    pub fn join(mut self) {
        self.tx.take();

        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                log::error!("worker thread panicked");
            }
        }
    }
}

struct Worker<T, S> {
    rx: Arc<Mutex<Receiver<Job>>>,
    task: Arc<T>,
    sink: Arc<S>,
    runtime: Runtime,
}

impl<T, S> Worker<T, S>
where
    T: Task,
    S: Sink,
{
    fn run(self) {
        // The lock is released as soon as a job is received, so the queue
        // is never blocked by an executing job.
        while let Ok(job) = self.next() {
            // A panicking task costs its own job only, the worker keeps serving.
            let rc = panic::catch_unwind(AssertUnwindSafe(|| self.runtime.block_on(self.task.execute(job))));
            let obs = match rc {
                Ok(obs) => obs,
                Err(..) => {
                    log::error!("tick {} #{}: task panicked", job.tick, job.seq);
                    continue;
                }
            };
            log::trace!("tick {} #{}: {}", job.tick, job.seq, obs);

            self.sink.emit(&obs.to_string());
        }
    }

    #[inline]
    fn next(&self) -> Result<Job, mpsc::RecvError> {
        self.rx.lock().unwrap_or_else(PoisonError::into_inner).recv()
    }
}

#[cfg(test)]
mod test {
    use core::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use std::thread;

    use super::*;
    use crate::{observation::Observation, sink::Lines};

    /// Counts concurrent invocations, tracking the highest value seen.
    #[derive(Debug, Default)]
    struct Gauge {
        curr: AtomicUsize,
        max: AtomicUsize,
        num_calls: AtomicUsize,
    }

    impl Task for Gauge {
        async fn execute(&self, _job: Job) -> Observation {
            let curr = self.curr.fetch_add(1, Ordering::SeqCst) + 1;
            self.max.fetch_max(curr, Ordering::SeqCst);
            self.num_calls.fetch_add(1, Ordering::SeqCst);

            thread::sleep(Duration::from_millis(20));

            self.curr.fetch_sub(1, Ordering::SeqCst);
            Observation::response(200, b"ok")
        }
    }

    #[test]
    fn test_concurrency_bounded_by_size() {
        let task = Arc::new(Gauge::default());
        let sink = Arc::new(Lines::default());
        let pool = WorkerPool::new(NonZero::new(4).unwrap(), task.clone(), sink.clone()).unwrap();

        for idx in 0..40 {
            pool.submit(Job::new(0, idx)).unwrap();
        }
        pool.join();

        let max = task.max.load(Ordering::SeqCst);
        assert!((1..=4).contains(&max), "max concurrency: {max}");
        assert_eq!(40, task.num_calls.load(Ordering::SeqCst));
    }

    /// Panics on the first job of every tick.
    #[derive(Debug)]
    struct Flaky;

    impl Task for Flaky {
        async fn execute(&self, job: Job) -> Observation {
            if job.seq == 0 {
                panic!("boom");
            }
            Observation::response(200, b"ok")
        }
    }

    #[test]
    fn test_panicking_task_keeps_worker() {
        let sink = Arc::new(Lines::default());
        let pool = WorkerPool::new(NonZero::new(1).unwrap(), Arc::new(Flaky), sink.clone()).unwrap();

        for tick in 0..3 {
            for idx in 0..4 {
                pool.submit(Job::new(tick, idx)).unwrap();
            }
        }
        pool.join();

        // The only worker survives every panic and serves the rest of the queue.
        assert_eq!(9, sink.lines().len());
    }

    #[test]
    fn test_join_drains_queue() {
        let task = Arc::new(Gauge::default());
        let sink = Arc::new(Lines::default());
        let pool = WorkerPool::new(NonZero::new(2).unwrap(), task, sink.clone()).unwrap();

        for idx in 0..10 {
            pool.submit(Job::new(0, idx)).unwrap();
        }
        pool.join();

        let lines = sink.lines();
        assert_eq!(10, lines.len());
        assert!(lines.iter().all(|v| v == "Status: 200, Response: ok"));
    }
}
