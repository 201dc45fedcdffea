use std::io::{self, Write};

/// Shared append-only line output.
///
/// Each call to [`Sink::emit`] must write the whole line atomically, i.e.
/// lines written concurrently from different threads never interleave.
pub trait Sink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes lines to the standard output.
#[derive(Debug, Default)]
pub struct Stdout;

impl Sink for Stdout {
    #[inline]
    fn emit(&self, line: &str) {
        let mut out = io::stdout().lock();

        if let Err(err) = writeln!(out, "{line}") {
            log::warn!("failed to write to stdout: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) use self::test::Lines;
