//! Shutdown Signal Wiring
//!
//! Translates SIGINT/SIGTERM into a watch channel every long-running loop
//! can select on, so in-flight backoff sleeps and ticks abort promptly.

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

/// Spawns a signal listener and returns a receiver that flips to `true`
/// once SIGINT or SIGTERM arrives. Must be called inside the runtime.
pub fn watch_signals() -> Result<watch::Receiver<bool>> {
    let (tx, rx) = watch::channel(false);
    let mut interrupt = signal(SignalKind::interrupt()).context("install SIGINT handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("install SIGTERM handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }
        let _ = tx.send(true);
    });

    Ok(rx)
}

/// Resolves when the shutdown signal fires; used as the graceful-shutdown
/// hook of the HTTP server.
pub async fn wait(mut rx: watch::Receiver<bool>) {
    let _ = rx.changed().await;
}
