// Async Job Controller for PoST data initialization
//
// Owns the single JobState of the gateway. Start/Stop are serialized by an
// async operation lock; Query only takes the short state lock, so it never
// waits on a Start/Stop in flight or on job progress.

pub mod progress;

pub use progress::{ProgressHub, ProgressSubscription, SubscriberId};

use crate::domain::{JobState, PostOptions, PostSetupStatus, ProgressEvent, ProviderBenchmark};
use crate::error::{AppError, Result};
use crate::port::PostBackend;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct JobSlot {
    state: JobState,
    /// Bumped on every successful start; stale pumps compare against it
    session: u64,
    last_progress: ProgressEvent,
    last_options: Option<PostOptions>,
}

fn lock(slot: &Mutex<JobSlot>) -> MutexGuard<'_, JobSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PostSetupController {
    backend: Arc<dyn PostBackend>,
    hub: ProgressHub,
    slot: Arc<Mutex<JobSlot>>,
    op_lock: tokio::sync::Mutex<()>,
}

impl PostSetupController {
    pub fn new(backend: Arc<dyn PostBackend>) -> Self {
        Self::with_hub(backend, ProgressHub::default())
    }

    pub fn with_hub(backend: Arc<dyn PostBackend>, hub: ProgressHub) -> Self {
        Self {
            backend,
            hub,
            slot: Arc::new(Mutex::new(JobSlot::default())),
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Start a data creation session
    ///
    /// # Errors
    /// - AppError::InvalidArgument for unusable options (checked first)
    /// - AppError::AlreadyRunning if a session is running; nothing changes
    /// - whatever the backend reports, with its kind preserved
    pub async fn start(&self, options: PostOptions) -> Result<()> {
        validate_options(&options)?;

        let _op = self.op_lock.lock().await;
        if lock(&self.slot).state == JobState::Running {
            return Err(AppError::AlreadyRunning(
                "PoST data creation session already in progress".to_string(),
            ));
        }

        let events = self.backend.start(&options).await?;

        let session = {
            let mut slot = lock(&self.slot);
            slot.session += 1;
            slot.state = JobState::Running;
            slot.last_progress = ProgressEvent::progress(0);
            slot.last_options = Some(options.clone());
            self.hub.open();
            slot.session
        };

        info!(
            session,
            data_dir = %options.data_dir,
            data_size = options.data_size,
            provider = options.compute_provider_id,
            "PoST data creation started"
        );

        tokio::spawn(pump_events(
            self.slot.clone(),
            self.hub.clone(),
            session,
            events,
        ));
        Ok(())
    }

    /// Stop the running session, optionally deleting its output
    ///
    /// Safe to call after the session already ended; then only the optional
    /// delete is performed.
    ///
    /// # Errors
    /// - AppError::NotRunning if no session was ever started
    pub async fn stop(&self, delete_files: bool) -> Result<()> {
        let _op = self.op_lock.lock().await;

        let (state, data_dir) = {
            let slot = lock(&self.slot);
            (
                slot.state,
                slot.last_options.as_ref().map(|o| o.data_dir.clone()),
            )
        };
        let Some(data_dir) = data_dir else {
            return Err(AppError::NotRunning(
                "no PoST data creation session was started".to_string(),
            ));
        };

        if state.is_terminal() {
            debug!(%state, "PoST data creation already ended, nothing to stop");
        } else {
            self.backend.stop().await?;
            let mut slot = lock(&self.slot);
            slot.state = JobState::Stopped;
            slot.last_progress.in_progress = false;
            self.hub.close();
            info!(session = slot.session, "PoST data creation stopped");
        }

        if delete_files {
            self.backend.delete_data(&data_dir).await?;
            info!(data_dir = %data_dir, "PoST data deleted");
        }
        Ok(())
    }

    /// Current state, last progress and last options
    pub fn status(&self) -> PostSetupStatus {
        let slot = lock(&self.slot);
        PostSetupStatus {
            state: slot.state,
            bytes_written: slot.last_progress.bytes_written,
            error_kind: slot.last_progress.error_kind,
            error_message: slot.last_progress.error_message.clone(),
            in_progress: slot.last_progress.in_progress,
            last_options: slot.last_options.clone(),
        }
    }

    /// Enumerate compute providers and benchmark each of them
    ///
    /// A single failing benchmark fails the whole call; callers pick a
    /// provider from this list, so a silently shortened list would mislead.
    pub async fn providers(&self) -> Result<Vec<ProviderBenchmark>> {
        let providers = self.backend.providers().await?;
        let mut benchmarks = Vec::with_capacity(providers.len());
        for provider in providers {
            let performance = self.backend.benchmark(&provider).await.map_err(|e| {
                warn!(provider = provider.id, error = %e, "Provider benchmark failed");
                e
            })?;
            benchmarks.push(ProviderBenchmark {
                provider,
                performance,
            });
        }
        Ok(benchmarks)
    }

    /// Join the live progress feed of the current session
    pub fn subscribe_progress(&self) -> ProgressSubscription {
        self.hub.subscribe()
    }

    pub fn progress_subscribers(&self) -> usize {
        self.hub.subscriber_count()
    }
}

fn validate_options(options: &PostOptions) -> Result<()> {
    if options.data_dir.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "`data_dir` must be provided".to_string(),
        ));
    }
    if options.data_size == 0 {
        return Err(AppError::InvalidArgument(
            "`data_size` must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Forward backend events into the slot and the hub until the source closes
async fn pump_events(
    slot: Arc<Mutex<JobSlot>>,
    hub: ProgressHub,
    session: u64,
    mut events: mpsc::Receiver<ProgressEvent>,
) {
    while let Some(event) = events.recv().await {
        let mut slot = lock(&slot);
        if slot.session != session || slot.state != JobState::Running {
            continue;
        }
        slot.last_progress = event.clone();
        hub.publish(&event);
    }

    let mut slot = lock(&slot);
    if slot.session != session || slot.state != JobState::Running {
        return;
    }
    slot.last_progress.in_progress = false;
    slot.state = if slot.last_progress.is_error() {
        JobState::Failed
    } else {
        JobState::Completed
    };
    hub.close();

    match slot.state {
        JobState::Failed => warn!(
            session,
            error = ?slot.last_progress.error_message,
            "PoST data creation failed"
        ),
        _ => info!(
            session,
            bytes_written = slot.last_progress.bytes_written,
            "PoST data creation completed"
        ),
    }
}

#[cfg(test)]
mod tests;
