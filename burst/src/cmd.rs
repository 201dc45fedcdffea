use core::num::NonZero;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::target::Target;

/// Fires batches of HTTP GET requests at a target every second and prints
/// each response.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cmd {
    /// Target endpoint, either "host[:port]" or "http://host[:port]/path".
    ///
    /// Defaults to 127.0.0.1.
    pub target: Option<Target>,
    /// Number of requests submitted every second.
    ///
    /// This is also the number of worker threads, i.e. the maximum number of
    /// requests in flight. Defaults to 200.
    #[clap(short, long)]
    pub rate: Option<NonZero<usize>>,
    /// How long to generate load, in seconds.
    ///
    /// Defaults to 120.
    #[clap(short, long, value_name = "SECS")]
    pub duration: Option<NonZero<u64>>,
    /// Per-request timeout, in seconds.
    ///
    /// Covers connection establishing and reading the whole response.
    /// Defaults to 5.
    #[clap(long, value_name = "SECS")]
    pub timeout: Option<NonZero<u64>>,
    /// Path to the YAML configuration file.
    ///
    /// Command line arguments take precedence over values from this file.
    #[clap(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Be verbose in terms of logging.
    #[clap(short, action = ArgAction::Count)]
    pub verbose: u8,
}
