//! # Host shutdown signals.
//!
//! On a device nothing ever asks the supervisor to stop. Hosted runs (demos, CI
//! soak tests) do, so [`shutdown_requested`] completes when the process receives:
//! - **Unix**: `SIGINT`, `SIGTERM` or `SIGQUIT`
//! - **elsewhere**: Ctrl-C via [`tokio::signal::ctrl_c`]
//!
//! If signal registration fails the future never completes: the supervisor keeps
//! running exactly as it would on hardware.

use tracing::warn;

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Completes once a termination signal arrives.
pub async fn shutdown_requested() {
    if let Err(e) = wait_for_signal().await {
        warn!(error = %e, "signal handlers unavailable; running until halted");
        std::future::pending::<()>().await;
    }
}
