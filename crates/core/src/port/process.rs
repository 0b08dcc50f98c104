// Process Control Port

/// Lifecycle hooks of the hosting process
pub trait ProcessControl: Send + Sync {
    /// Ask the process to shut down gracefully. Returns immediately.
    fn request_shutdown(&self);
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct MockProcessControl {
        requests: AtomicUsize,
    }

    impl MockProcessControl {
        pub fn shutdown_requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl ProcessControl for MockProcessControl {
        fn request_shutdown(&self) {
            self.requests.fetch_add(1, Ordering::SeqCst);
        }
    }
}
