//! Process signal handling shared by every long-running binary: `SIGHUP`
//! is absorbed and logged so a supervisor's reload ping doesn't kill the
//! process, while `SIGINT`/`SIGTERM` (or Ctrl-C on any platform) resolve
//! the returned future so callers can begin a graceful shutdown.

use tokio::signal;

/// Waits for a termination signal, looping past any number of `SIGHUP`s
/// first.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install the Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install the SIGTERM handler");
        let mut sighup =
            signal(SignalKind::hangup()).expect("failed to install the SIGHUP handler");
        loop {
            tokio::select! {
                _ = sigterm.recv() => return,
                _ = sighup.recv() => {
                    tracing::info!("received SIGHUP, continuing");
                }
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
