use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::VerificationApi;
use crate::verification::VerificationSession;

/// Graceful shutdown coordinator for long-running commands
#[derive(Debug)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Trigger shutdown on SIGINT/Ctrl-C
    pub fn install_signal_handlers(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, shutting down");
                    tx.send_replace(true);
                }
                Err(e) => warn!("Failed to listen for interrupt: {}", e),
            }
        });
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been requested
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.tx.subscribe();
        // Only fails if the sender is gone, which cannot happen while &self lives
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Release the session's timers and log final counters
    pub fn shutdown_session<A>(session: &mut VerificationSession<A>) -> Result<()>
    where
        A: VerificationApi + ?Sized + 'static,
    {
        info!("Tearing down verification session");
        session.teardown();
        Ok(())
    }
}
