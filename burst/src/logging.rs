use std::error::Error;

use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Maps the number of `-v` flags to the crate's log level.
pub fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initializes diagnostic logging.
///
/// Records go to stderr, stdout carries observations only. Dependencies stay
/// silent unless enabled through `RUST_LOG`, which also overrides the level
/// given here.
pub fn init(verbose: u8) -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(LevelFilter::Off)
        .with_module_level(env!("CARGO_CRATE_NAME"), level(verbose))
        .with_utc_timestamps()
        .env()
        .init()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(LevelFilter::Info, level(0));
        assert_eq!(LevelFilter::Debug, level(1));
        assert_eq!(LevelFilter::Trace, level(2));
        assert_eq!(LevelFilter::Trace, level(u8::MAX));
    }
}
