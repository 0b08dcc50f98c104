// Status Aggregator

use crate::domain::NodeStatus;
use crate::port::{ClockInfo, LedgerInfo, NetworkInfo, SyncControl};
use std::sync::Arc;

/// Composes a [`NodeStatus`] from independently owned subsystems.
///
/// Each value is read once, back to back, without any lock spanning
/// subsystems. Subsystems keep mutating while we read, so fields may be
/// slightly skewed relative to each other.
#[derive(Clone)]
pub struct NodeStatusReader {
    network: Arc<dyn NetworkInfo>,
    syncer: Arc<dyn SyncControl>,
    ledger: Arc<dyn LedgerInfo>,
    clock: Arc<dyn ClockInfo>,
}

impl NodeStatusReader {
    pub fn new(
        network: Arc<dyn NetworkInfo>,
        syncer: Arc<dyn SyncControl>,
        ledger: Arc<dyn LedgerInfo>,
        clock: Arc<dyn ClockInfo>,
    ) -> Self {
        Self {
            network,
            syncer,
            ledger,
            clock,
        }
    }

    pub fn snapshot(&self) -> NodeStatus {
        NodeStatus {
            connected_peers: self.network.peer_count(),
            is_synced: self.syncer.is_synced(),
            synced_layer: self.ledger.latest_seen_layer(),
            top_layer: self.clock.current_layer(),
            verified_layer: self.ledger.latest_verified_layer(),
        }
    }
}
