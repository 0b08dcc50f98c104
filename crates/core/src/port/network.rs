// Network Port

/// Read-only view of the p2p layer
pub trait NetworkInfo: Send + Sync {
    /// Number of currently connected peers
    fn peer_count(&self) -> u64;
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    pub struct MockNetwork {
        peers: AtomicU64,
    }

    impl MockNetwork {
        pub fn new(peers: u64) -> Self {
            Self {
                peers: AtomicU64::new(peers),
            }
        }

        pub fn set_peers(&self, peers: u64) {
            self.peers.store(peers, Ordering::SeqCst);
        }
    }

    impl NetworkInfo for MockNetwork {
        fn peer_count(&self) -> u64 {
            self.peers.load(Ordering::SeqCst)
        }
    }
}
