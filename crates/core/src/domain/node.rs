// Node Status Model

use serde::{Deserialize, Serialize};

/// Index of a layer in the ledger ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl LayerId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for LayerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time view of the node, composed per request.
///
/// Each field is read from a different subsystem without a shared lock, so
/// the values may be skewed relative to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub connected_peers: u64,
    pub is_synced: bool,
    /// Latest layer seen from the network
    pub synced_layer: LayerId,
    /// Current layer according to the clock
    pub top_layer: LayerId,
    /// Latest layer applied to state
    pub verified_layer: LayerId,
}
