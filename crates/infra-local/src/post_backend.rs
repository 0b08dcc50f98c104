// Local PoST backend
// reason: writes the data area on the local disk so the gateway can run stand-alone

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meshgate_core::domain::{
    ComputeApiClass, ComputeProvider, PostErrorKind, PostOptions, ProgressEvent,
};
use meshgate_core::error::{AppError, Result};
use meshgate_core::port::PostBackend;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sysinfo::System;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::disk::available_space;

pub const DATA_FILE_NAME: &str = "postdata_0.bin";
pub const METADATA_FILE_NAME: &str = "postdata_metadata.json";

/// The only provider this backend offers: the host CPU
const CPU_PROVIDER_ID: u32 = 0;

/// Tunables for the local backend
#[derive(Debug, Clone)]
pub struct LocalPostConfig {
    /// Bytes generated and written per step (one progress event per chunk)
    pub chunk_bytes: usize,
    /// Bytes generated when benchmarking
    pub benchmark_bytes: usize,
    /// Progress events buffered between writer and consumer
    pub progress_buffer: usize,
    /// Pause between chunks when a session is throttled
    pub throttle_delay: Duration,
    /// Seed mixed into every label chunk
    pub label_seed: u64,
}

impl Default for LocalPostConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 1024 * 1024,
            benchmark_bytes: 16 * 1024 * 1024,
            progress_buffer: 32,
            throttle_delay: Duration::from_millis(20),
            label_seed: 0x5eed,
        }
    }
}

/// Sidecar describing the data file, rewritten when a session ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub data_size: u64,
    pub bytes_written: u64,
    pub compute_provider_id: u32,
    pub label_seed: u64,
    pub updated_at: DateTime<Utc>,
}

struct Session {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Everything the writer task needs, captured at start
struct WriteJob {
    data_dir: PathBuf,
    start_offset: u64,
    data_size: u64,
    throttle: bool,
    provider_id: u32,
    config: LocalPostConfig,
}

/// PostBackend writing deterministic label chunks into `postdata_0.bin`
pub struct LocalPostBackend {
    config: LocalPostConfig,
    session: Mutex<Option<Session>>,
}

impl LocalPostBackend {
    pub fn new(config: LocalPostConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// Read the metadata sidecar of `data_dir`, if present
    pub async fn read_metadata(data_dir: impl AsRef<Path>) -> Result<Option<PostMetadata>> {
        let path = data_dir.as_ref().join(METADATA_FILE_NAME);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for LocalPostBackend {
    fn default() -> Self {
        Self::new(LocalPostConfig::default())
    }
}

#[async_trait]
impl PostBackend for LocalPostBackend {
    async fn start(&self, options: &PostOptions) -> Result<mpsc::Receiver<ProgressEvent>> {
        let mut session = self.session.lock().await;
        if let Some(running) = session.as_ref() {
            if !running.task.is_finished() {
                return Err(AppError::AlreadyRunning(
                    "local PoST session still writing".to_string(),
                ));
            }
        }

        if options.compute_provider_id != CPU_PROVIDER_ID {
            return Err(AppError::InvalidArgument(format!(
                "unknown compute provider: {}",
                options.compute_provider_id
            )));
        }

        let data_dir = PathBuf::from(&options.data_dir);
        tokio::fs::create_dir_all(&data_dir).await?;
        let data_path = data_dir.join(DATA_FILE_NAME);

        let existing = if options.append {
            match tokio::fs::metadata(&data_path).await {
                Ok(meta) => meta.len(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
                Err(e) => return Err(e.into()),
            }
        } else {
            0
        };
        if existing > options.data_size {
            return Err(AppError::InvalidArgument(format!(
                "existing data ({} bytes) exceeds requested size ({} bytes)",
                existing, options.data_size
            )));
        }

        let required = options.data_size - existing;
        let probe_dir = data_dir.clone();
        let available = tokio::task::spawn_blocking(move || available_space(&probe_dir))
            .await
            .map_err(|e| AppError::Internal(format!("disk space probe failed: {}", e)))?;
        match available {
            Some(free) if free < required => {
                return Err(AppError::InvalidArgument(format!(
                    "insufficient disk space: {} bytes required, {} available",
                    required, free
                )));
            }
            Some(_) => {}
            None => debug!(data_dir = %data_dir.display(), "Could not determine free disk space"),
        }

        let job = WriteJob {
            data_dir,
            start_offset: existing,
            data_size: options.data_size,
            throttle: options.throttle,
            provider_id: options.compute_provider_id,
            config: self.config.clone(),
        };

        let (events_tx, events_rx) = mpsc::channel(self.config.progress_buffer.max(1));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run_session(job, cancel_rx, events_tx));

        *session = Some(Session {
            cancel: cancel_tx,
            task,
        });
        Ok(events_rx)
    }

    async fn stop(&self) -> Result<()> {
        let Some(session) = self.session.lock().await.take() else {
            return Ok(());
        };
        let _ = session.cancel.send(true);
        session
            .task
            .await
            .map_err(|e| AppError::Internal(format!("PoST writer task failed: {}", e)))?;
        Ok(())
    }

    async fn delete_data(&self, data_dir: &str) -> Result<()> {
        let dir = Path::new(data_dir);
        for name in [DATA_FILE_NAME, METADATA_FILE_NAME] {
            match tokio::fs::remove_file(dir.join(name)).await {
                Ok(()) => debug!(file = name, data_dir, "Removed PoST file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn providers(&self) -> Result<Vec<ComputeProvider>> {
        let model = tokio::task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_cpu();
            system
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(|| "generic cpu".to_string())
        })
        .await
        .map_err(|e| AppError::Internal(format!("cpu probe failed: {}", e)))?;

        Ok(vec![ComputeProvider {
            id: CPU_PROVIDER_ID,
            model,
            compute_api: ComputeApiClass::Cpu,
        }])
    }

    async fn benchmark(&self, provider: &ComputeProvider) -> Result<u64> {
        if provider.id != CPU_PROVIDER_ID {
            return Err(AppError::InvalidArgument(format!(
                "unknown compute provider: {}",
                provider.id
            )));
        }

        let chunk_bytes = self.config.chunk_bytes.max(1);
        let total = self.config.benchmark_bytes.max(chunk_bytes);
        let seed = self.config.label_seed;

        let elapsed = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; chunk_bytes];
            let started = Instant::now();
            for index in 0..total.div_ceil(chunk_bytes) {
                fill_labels(seed, index as u64, &mut buf);
            }
            started.elapsed()
        })
        .await
        .map_err(|e| AppError::Internal(format!("benchmark task failed: {}", e)))?;

        let nanos = elapsed.as_nanos().max(1);
        let performance = (total as u128 * 1_000_000_000 / nanos) as u64;
        info!(provider = provider.id, performance, "Benchmark completed");
        Ok(performance)
    }
}

/// Deterministic labels for chunk `index`; resumed sessions regenerate the
/// exact same bytes.
fn fill_labels(seed: u64, index: u64, buf: &mut [u8]) {
    let mut rng = StdRng::seed_from_u64(seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    rng.fill_bytes(buf);
}

fn error_kind(err: &std::io::Error) -> PostErrorKind {
    match err.kind() {
        std::io::ErrorKind::NotFound => PostErrorKind::FileNotFound,
        _ => PostErrorKind::FileIo,
    }
}

async fn run_session(
    job: WriteJob,
    mut cancel: watch::Receiver<bool>,
    events: mpsc::Sender<ProgressEvent>,
) {
    let outcome = write_labels(&job, &mut cancel, &events).await;

    let written = match outcome {
        Ok(written) => written,
        Err((written, err)) => {
            warn!(error = %err, written, "PoST data creation failed");
            let _ = events
                .send(ProgressEvent::failure(written, error_kind(&err), err.to_string()))
                .await;
            written
        }
    };

    let metadata = PostMetadata {
        data_size: job.data_size,
        bytes_written: written,
        compute_provider_id: job.provider_id,
        label_seed: job.config.label_seed,
        updated_at: Utc::now(),
    };
    if let Err(e) = write_metadata(&job.data_dir, &metadata).await {
        warn!(error = %e, "Failed to persist PoST metadata");
    }

    if written == job.data_size {
        let _ = events
            .send(ProgressEvent {
                bytes_written: written,
                in_progress: false,
                ..Default::default()
            })
            .await;
    }
}

/// Write labels until the target size, cancellation, or an I/O error
///
/// Returns bytes present in the file when it stopped.
async fn write_labels(
    job: &WriteJob,
    cancel: &mut watch::Receiver<bool>,
    events: &mpsc::Sender<ProgressEvent>,
) -> std::result::Result<u64, (u64, std::io::Error)> {
    let chunk_bytes = job.config.chunk_bytes.max(1) as u64;
    let mut offset = job.start_offset;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(job.start_offset == 0)
        .open(job.data_dir.join(DATA_FILE_NAME))
        .await
        .map_err(|e| (offset, e))?;
    file.seek(SeekFrom::Start(offset))
        .await
        .map_err(|e| (offset, e))?;

    let mut buf = vec![0u8; chunk_bytes as usize];
    while offset < job.data_size {
        if *cancel.borrow() {
            debug!(offset, "PoST writer cancelled");
            break;
        }

        let index = offset / chunk_bytes;
        let within = (offset % chunk_bytes) as usize;
        let len = (chunk_bytes - within as u64).min(job.data_size - offset) as usize;
        fill_labels(job.config.label_seed, index, &mut buf);

        file.write_all(&buf[within..within + len])
            .await
            .map_err(|e| (offset, e))?;
        offset += len as u64;

        if events.send(ProgressEvent::progress(offset)).await.is_err() {
            debug!("Progress receiver dropped, stopping writer");
            break;
        }

        if job.throttle {
            tokio::select! {
                _ = tokio::time::sleep(job.config.throttle_delay) => {}
                _ = cancel.changed() => {}
            }
        }
    }

    file.sync_all().await.map_err(|e| (offset, e))?;
    Ok(offset)
}

async fn write_metadata(data_dir: &Path, metadata: &PostMetadata) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(metadata)?;
    tokio::fs::write(data_dir.join(METADATA_FILE_NAME), bytes).await?;
    Ok(())
}
