// Standalone node state
// reason: lets the gateway run without a p2p/mesh stack attached

use meshgate_core::application::ShutdownToken;
use meshgate_core::domain::LayerId;
use meshgate_core::port::{ClockInfo, LedgerInfo, NetworkInfo, SyncControl};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Network, mesh and sync view of a node running on its own
///
/// Values are plain atomics updated by whoever hosts the node; readers never
/// block writers.
#[derive(Default)]
pub struct StandaloneNode {
    peers: AtomicU64,
    seen_layer: AtomicU64,
    verified_layer: AtomicU64,
    synced: AtomicBool,
}

impl StandaloneNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_peer_count(&self, peers: u64) {
        self.peers.store(peers, Ordering::Relaxed);
    }

    /// Record mesh progress; the verified layer never exceeds the seen layer
    pub fn record_layers(&self, seen: LayerId, verified: LayerId) {
        self.seen_layer.store(seen.value(), Ordering::Relaxed);
        self.verified_layer
            .store(verified.value().min(seen.value()), Ordering::Relaxed);
    }

    /// Advance the local mesh with the clock until shutdown
    ///
    /// On every layer tick the current layer is marked seen and the one
    /// before it verified.
    pub async fn follow_clock(&self, clock: Arc<dyn ClockInfo>, mut shutdown: ShutdownToken) {
        loop {
            let current = clock.current_layer();
            self.record_layers(current, LayerId(current.value().saturating_sub(1)));
            debug!(layer = current.value(), "Local mesh advanced");

            tokio::select! {
                _ = tokio::time::sleep(clock.layer_duration()) => {}
                _ = shutdown.wait() => break,
            }
        }
    }
}

impl NetworkInfo for StandaloneNode {
    fn peer_count(&self) -> u64 {
        self.peers.load(Ordering::Relaxed)
    }
}

impl LedgerInfo for StandaloneNode {
    fn latest_seen_layer(&self) -> LayerId {
        LayerId(self.seen_layer.load(Ordering::Relaxed))
    }

    fn latest_verified_layer(&self) -> LayerId {
        LayerId(self.verified_layer.load(Ordering::Relaxed))
    }
}

impl SyncControl for StandaloneNode {
    fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Relaxed)
    }

    fn start_sync(&self) {
        // Nothing to download without peers: the local mesh is all there is
        if !self.synced.swap(true, Ordering::Relaxed) {
            info!("Standalone node marked as synced");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgate_core::application::shutdown_channel;
    use meshgate_core::port::mesh::mocks::MockClock;

    #[tokio::test]
    async fn test_follow_clock_records_layers_until_shutdown() {
        let node = StandaloneNode::new();
        let (tx, token) = shutdown_channel();
        tx.shutdown();

        node.follow_clock(Arc::new(MockClock::new(12)), token).await;

        assert_eq!(node.latest_seen_layer(), LayerId(12));
        assert_eq!(node.latest_verified_layer(), LayerId(11));
    }

    #[test]
    fn test_start_sync_marks_synced() {
        let node = StandaloneNode::new();
        assert!(!node.is_synced());
        node.start_sync();
        node.start_sync();
        assert!(node.is_synced());
    }

    #[test]
    fn test_verified_layer_is_capped_by_seen_layer() {
        let node = StandaloneNode::new();
        node.record_layers(LayerId(10), LayerId(12));
        assert_eq!(node.latest_seen_layer(), LayerId(10));
        assert_eq!(node.latest_verified_layer(), LayerId(10));
    }
}
