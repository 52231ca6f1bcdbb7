//! Spawns a [`tokio`] task under a name, so that a panic or a slow task shows
//! up in logs and traces with something more useful than a raw task id.

use std::future::Future;
use tracing::Instrument;

/// Spawns `future` as a named task. `name` is a closure rather than a plain
/// string so that call sites pay nothing to construct it when tracing is
/// disabled.
pub fn spawn<Name, S, Fut>(name: Name, future: Fut) -> tokio::task::JoinHandle<Fut::Output>
where
    Name: FnOnce() -> S,
    S: Into<String>,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let name = name().into();
    let span = tracing::info_span!("task", name = name.as_str());
    tokio::spawn(future.instrument(span))
}
