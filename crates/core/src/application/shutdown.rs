// Shutdown Signal

use crate::port::ProcessControl;
use std::sync::Arc;
use tokio::sync::watch;

/// Shutdown signal observed by long-lived tasks (streams, servers)
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal
    ///
    /// Returns immediately if shutdown was already requested.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|down| *down).await;
    }
}

/// Shutdown sender
#[derive(Clone)]
pub struct ShutdownSender {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSender {
    /// Signal shutdown to every token holder
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }

    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }
}

impl ProcessControl for ShutdownSender {
    fn request_shutdown(&self) {
        tracing::info!("Shutdown requested via API");
        self.shutdown();
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx: Arc::new(tx) }, ShutdownToken { rx })
}
