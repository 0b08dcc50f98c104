// PoST Backend Port
// Abstraction over the component that actually generates the data area

use crate::domain::{ComputeProvider, PostOptions, ProgressEvent};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Compute backend for PoST data initialization
///
/// Implementations:
/// - LocalPostBackend: writes label files on the local disk
#[async_trait]
pub trait PostBackend: Send + Sync {
    /// Begin initializing with `options`
    ///
    /// The returned receiver yields progress events in emission order and
    /// closes when the session ends (completion, failure or stop).
    ///
    /// # Errors
    /// - AppError::InvalidArgument if the options are unusable (unknown
    ///   provider, not enough disk space, ...)
    async fn start(&self, options: &PostOptions) -> Result<mpsc::Receiver<ProgressEvent>>;

    /// Stop the running session and wait until it no longer writes
    async fn stop(&self) -> Result<()>;

    /// Remove initialized data under `data_dir`
    async fn delete_data(&self, data_dir: &str) -> Result<()>;

    /// Available compute providers
    async fn providers(&self) -> Result<Vec<ComputeProvider>>;

    /// Measure throughput of `provider` in bytes per second. May be slow.
    async fn benchmark(&self, provider: &ComputeProvider) -> Result<u64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ComputeApiClass;
    use crate::error::AppError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const MOCK_EVENT_BUFFER: usize = 64;

    /// Failure injected into `start`
    #[derive(Debug, Clone)]
    pub enum MockStartFailure {
        InvalidArgument(String),
        Internal(String),
    }

    #[derive(Default)]
    struct MockState {
        start_failure: Option<MockStartFailure>,
        emitter: Option<mpsc::Sender<ProgressEvent>>,
        start_calls: Vec<PostOptions>,
        stop_calls: usize,
        deleted: Vec<String>,
        providers: Vec<ComputeProvider>,
        failing_benchmarks: HashSet<u32>,
    }

    /// Mock backend; tests drive progress through [`MockPostBackend::emitter`]
    #[derive(Default)]
    pub struct MockPostBackend {
        state: Mutex<MockState>,
    }

    impl MockPostBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_providers(providers: Vec<ComputeProvider>) -> Self {
            let backend = Self::default();
            backend.state.lock().unwrap().providers = providers;
            backend
        }

        pub fn cpu_provider(id: u32) -> ComputeProvider {
            ComputeProvider {
                id,
                model: format!("mock-cpu-{}", id),
                compute_api: ComputeApiClass::Cpu,
            }
        }

        pub fn fail_next_start(&self, failure: MockStartFailure) {
            self.state.lock().unwrap().start_failure = Some(failure);
        }

        pub fn fail_benchmark(&self, provider_id: u32) {
            self.state.lock().unwrap().failing_benchmarks.insert(provider_id);
        }

        /// Sender feeding the current session, if one is running
        pub fn emitter(&self) -> Option<mpsc::Sender<ProgressEvent>> {
            self.state.lock().unwrap().emitter.clone()
        }

        /// End the current session as if the backend finished on its own
        pub fn finish(&self) {
            self.state.lock().unwrap().emitter = None;
        }

        pub fn start_calls(&self) -> Vec<PostOptions> {
            self.state.lock().unwrap().start_calls.clone()
        }

        pub fn stop_calls(&self) -> usize {
            self.state.lock().unwrap().stop_calls
        }

        pub fn deleted(&self) -> Vec<String> {
            self.state.lock().unwrap().deleted.clone()
        }
    }

    #[async_trait]
    impl PostBackend for MockPostBackend {
        async fn start(&self, options: &PostOptions) -> Result<mpsc::Receiver<ProgressEvent>> {
            let mut state = self.state.lock().unwrap();
            if let Some(failure) = state.start_failure.take() {
                return Err(match failure {
                    MockStartFailure::InvalidArgument(msg) => AppError::InvalidArgument(msg),
                    MockStartFailure::Internal(msg) => AppError::Internal(msg),
                });
            }
            state.start_calls.push(options.clone());
            let (tx, rx) = mpsc::channel(MOCK_EVENT_BUFFER);
            state.emitter = Some(tx);
            Ok(rx)
        }

        async fn stop(&self) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.stop_calls += 1;
            state.emitter = None;
            Ok(())
        }

        async fn delete_data(&self, data_dir: &str) -> Result<()> {
            self.state.lock().unwrap().deleted.push(data_dir.to_string());
            Ok(())
        }

        async fn providers(&self) -> Result<Vec<ComputeProvider>> {
            Ok(self.state.lock().unwrap().providers.clone())
        }

        async fn benchmark(&self, provider: &ComputeProvider) -> Result<u64> {
            if self
                .state
                .lock()
                .unwrap()
                .failing_benchmarks
                .contains(&provider.id)
            {
                return Err(AppError::Internal(format!(
                    "benchmark failed on provider {}",
                    provider.id
                )));
            }
            Ok(1_000_000 * (provider.id as u64 + 1))
        }
    }
}
