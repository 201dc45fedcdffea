use crate::observation::Observation;

pub mod http;

/// Unit of work submitted to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    /// Tick number this job was submitted on, starting from zero.
    pub tick: u64,
    /// Position within the tick.
    pub seq: usize,
}

impl Job {
    #[inline]
    pub const fn new(tick: u64, seq: usize) -> Self {
        Self { tick, seq }
    }
}

/// Task unit.
///
/// Executed once per submitted [`Job`]. Implementations must not fail: every
/// error is expected to be folded into the returned [`Observation`].
#[allow(async_fn_in_trait)]
pub trait Task {
    /// Executes this task once.
    async fn execute(&self, job: Job) -> Observation;
}
