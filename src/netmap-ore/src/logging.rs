//! Minimal tracing setup: an [`tracing_subscriber::EnvFilter`] built from a
//! CLI/env log level plus a plain `fmt` layer on stdout.
//!
//! File rotation is an external collaborator and is intentionally not
//! wired up here; the `--log.*` flags are still parsed by each binary's
//! `Args` so the documented CLI surface exists.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber. `default_level` is used when
/// `RUST_LOG`/the CLI-supplied filter string is absent.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(true);
    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);
    if registry.try_init().is_err() {
        // A global subscriber is already installed (e.g. under `cargo test`);
        // nothing else to do.
    }
}
