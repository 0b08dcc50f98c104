// Mesh & Clock Ports

use crate::domain::LayerId;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Read-only view of the mesh (ledger) state
pub trait LedgerInfo: Send + Sync {
    /// Latest layer seen from the network
    fn latest_seen_layer(&self) -> LayerId;

    /// Latest layer applied to state
    fn latest_verified_layer(&self) -> LayerId;
}

/// Layer clock derived from genesis time
pub trait ClockInfo: Send + Sync {
    /// Layer the wall clock is currently in
    fn current_layer(&self) -> LayerId;

    fn genesis_time(&self) -> DateTime<Utc>;

    fn layer_duration(&self) -> Duration;

    fn layers_per_epoch(&self) -> u64;

    /// Epoch containing the current layer
    fn current_epoch(&self) -> u64 {
        match self.layers_per_epoch() {
            0 => 0,
            n => self.current_layer().value() / n,
        }
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    pub struct MockLedger {
        seen: AtomicU64,
        verified: AtomicU64,
    }

    impl MockLedger {
        pub fn new(seen: u64, verified: u64) -> Self {
            Self {
                seen: AtomicU64::new(seen),
                verified: AtomicU64::new(verified),
            }
        }

        pub fn set_layers(&self, seen: u64, verified: u64) {
            self.seen.store(seen, Ordering::SeqCst);
            self.verified.store(verified, Ordering::SeqCst);
        }
    }

    impl LedgerInfo for MockLedger {
        fn latest_seen_layer(&self) -> LayerId {
            LayerId(self.seen.load(Ordering::SeqCst))
        }

        fn latest_verified_layer(&self) -> LayerId {
            LayerId(self.verified.load(Ordering::SeqCst))
        }
    }

    /// Clock pinned to a fixed layer
    pub struct MockClock {
        layer: AtomicU64,
        genesis: DateTime<Utc>,
        layer_duration: Duration,
        layers_per_epoch: u64,
    }

    impl MockClock {
        pub fn new(layer: u64) -> Self {
            Self {
                layer: AtomicU64::new(layer),
                genesis: DateTime::<Utc>::UNIX_EPOCH,
                layer_duration: Duration::from_secs(30),
                layers_per_epoch: 10,
            }
        }

        pub fn set_layer(&self, layer: u64) {
            self.layer.store(layer, Ordering::SeqCst);
        }
    }

    impl ClockInfo for MockClock {
        fn current_layer(&self) -> LayerId {
            LayerId(self.layer.load(Ordering::SeqCst))
        }

        fn genesis_time(&self) -> DateTime<Utc> {
            self.genesis
        }

        fn layer_duration(&self) -> Duration {
            self.layer_duration
        }

        fn layers_per_epoch(&self) -> u64 {
            self.layers_per_epoch
        }
    }
}
