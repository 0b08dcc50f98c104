// Sync Port

/// Control over mesh synchronization
pub trait SyncControl: Send + Sync {
    fn is_synced(&self) -> bool;

    /// Request that syncing starts; a no-op if it already runs
    fn start_sync(&self);
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    pub struct MockSyncer {
        synced: AtomicBool,
        start_calls: AtomicUsize,
    }

    impl MockSyncer {
        pub fn new(synced: bool) -> Self {
            Self {
                synced: AtomicBool::new(synced),
                start_calls: AtomicUsize::new(0),
            }
        }

        pub fn start_calls(&self) -> usize {
            self.start_calls.load(Ordering::SeqCst)
        }
    }

    impl SyncControl for MockSyncer {
        fn is_synced(&self) -> bool {
            self.synced.load(Ordering::SeqCst)
        }

        fn start_sync(&self) {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
        }
    }
}
