//! Process signals and loop cancellation.

use tokio::sync::watch;
use tracing::info;

/// Resolve when the process receives Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// Receiving end of a cancellation request.
///
/// The loop checks it between cycles and while waiting; a cycle already
/// in progress always runs to completion.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    rx: watch::Receiver<bool>,
}

impl ShutdownFlag {
    /// Create a flag and the sender that trips it.
    pub fn new() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// A flag that never trips.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender leaves the value at false forever.
        drop(tx);
        Self { rx }
    }

    /// Trip a new flag when the process is signalled.
    pub fn on_signal() -> Self {
        let (tx, flag) = Self::new();
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = tx.send(true);
        });
        flag
    }

    /// Check whether cancellation was requested.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is requested. Pends forever if it never is.
    pub async fn triggered(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
