//! Error formatting helpers used at the binaries' fatal-exit sites.

use std::error::Error as StdError;
use std::fmt::Write;

/// Extension methods for displaying an error together with its full cause
/// chain, for the handful of places a fatal error is printed to stderr.
pub trait ErrorExt {
    fn display_with_causes(&self) -> String;
}

impl ErrorExt for anyhow::Error {
    fn display_with_causes(&self) -> String {
        display_with_causes(self.as_ref())
    }
}

fn display_with_causes(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}
