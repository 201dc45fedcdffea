use core::{error::Error, num::NonZero, time::Duration};
use std::{fs, path::Path};

use serde::Deserialize;

use crate::{cmd::Cmd, target::Target};

const DEFAULT_TARGET: &str = "127.0.0.1";
const DEFAULT_RATE: NonZero<usize> = NonZero::new(200).unwrap();
const DEFAULT_DURATION: Duration = Duration::from_secs(120);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Load generator config.
#[derive(Debug, Clone)]
pub struct Config {
    /// Target endpoint.
    pub target: Target,
    /// Number of requests submitted per tick.
    ///
    /// This is also the size of the worker pool.
    pub rate: NonZero<usize>,
    /// Total run time.
    pub duration: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Sleep time between ticks.
    ///
    /// Not compensated for the time spent on submission.
    pub interval: Duration,
}

impl Config {
    pub fn new(target: Target, rate: NonZero<usize>, duration: Duration) -> Self {
        Self {
            target,
            rate,
            duration,
            timeout: DEFAULT_TIMEOUT,
            interval: TICK_INTERVAL,
        }
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl TryFrom<Cmd> for Config {
    type Error = Box<dyn Error>;

    fn try_from(cmd: Cmd) -> Result<Self, Self::Error> {
        let file = match &cmd.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let target = match cmd.target.or(file.target) {
            Some(target) => target,
            None => DEFAULT_TARGET.parse()?,
        };
        let rate = cmd.rate.or(file.rate).unwrap_or(DEFAULT_RATE);
        let duration = cmd
            .duration
            .or(file.duration)
            .map(|v| Duration::from_secs(v.get()))
            .unwrap_or(DEFAULT_DURATION);
        let timeout = cmd
            .timeout
            .or(file.timeout)
            .map(|v| Duration::from_secs(v.get()))
            .unwrap_or(DEFAULT_TIMEOUT);

        let m = Self::new(target, rate, duration).with_timeout(timeout);

        Ok(m)
    }
}

/// Config file contents.
///
/// All fields are optional, missing ones fall back to defaults.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    target: Option<Target>,
    rate: Option<NonZero<usize>>,
    /// Duration in seconds.
    duration: Option<NonZero<u64>>,
    /// Timeout in seconds.
    timeout: Option<NonZero<u64>>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let data = fs::read(path)?;
        let cfg = serde_yaml::from_slice(&data)?;

        Ok(cfg)
    }
}
