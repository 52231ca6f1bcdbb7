//! Ambient stack shared by `netserver` and `netagent`: CLI parsing, named
//! task spawning, a wall-clock abstraction, a metrics registry, error
//! formatting, and tracing setup.

pub mod cli;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod now;
pub mod signal;
pub mod task;
