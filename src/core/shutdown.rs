//! Generic Shutdown Coordination
//!
//! Provides a reusable shutdown coordination system that handles signal
//! handling and allows guarding code execution with coordinated shutdown.

use tokio::sync::broadcast;

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        // Larger channel to avoid dropping bursts of shutdown signals
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);

        (Self { shutdown_tx }, shutdown_rx)
    }

    /// Request shutdown programmatically, as a delivered signal would
    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Guard execution of a future with shutdown coordination
    ///
    /// Sets up signal handlers automatically and hands the closure a
    /// broadcast receiver that fires when shutdown is requested.
    pub async fn guard<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (coordinator, shutdown_rx) = Self::new();

        setup_signal_handlers(coordinator.shutdown_tx.clone());

        future_fn(shutdown_rx).await
    }
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tokio::signal::unix::{signal, SignalKind};
        let signal_count = Arc::new(AtomicUsize::new(0));
        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let tx = shutdown_tx.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    #[allow(clippy::never_loop)]
                    while sig.recv().await.is_some() {
                        let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                        let _ = tx.send(());
                        if prev >= 1 {
                            // Second signal received; forcing immediate exit
                            std::process::exit(130);
                        }
                        break;
                    }
                }
            });
        }

        // Fallback generic ctrl_c handler for terminals where specific UNIX
        // signals are not delivered as expected
        {
            let tx = shutdown_tx.clone();
            let sig_ctr = signal_count.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                    let _ = tx.send(());
                    if prev >= 1 {
                        log::warn!("Ctrl-C received; exiting");
                        std::process::exit(130);
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_trigger_reaches_receiver() {
        let (coordinator, mut rx) = ShutdownCoordinator::new();

        coordinator.trigger_shutdown();

        let signal_received = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(signal_received.is_ok(), "Should receive shutdown signal");
    }

    #[tokio::test]
    async fn test_trigger_survives_receiver_backlog() {
        let (coordinator, mut rx) = ShutdownCoordinator::new();

        // Burst of triggers must not panic or drop the channel
        coordinator.trigger_shutdown();
        coordinator.trigger_shutdown();
        coordinator.trigger_shutdown();

        let signal_received = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(signal_received.is_ok(), "Should receive shutdown signal");
    }

    #[tokio::test]
    async fn test_guard_functionality() {
        let result = ShutdownCoordinator::guard(|mut shutdown_rx| async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(50)) => {
                    Ok::<i32, &str>(42)
                }
                _ = shutdown_rx.recv() => {
                    Ok(-1)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
    }
}
