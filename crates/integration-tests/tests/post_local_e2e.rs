//! PoST End-to-End Tests on the local backend
//!
//! Real label files on disk, created and followed through the SDK.

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{post_options, TestGateway, STEP};
use meshgate_infra_local::post_backend::DATA_FILE_NAME;
use meshgate_infra_local::{LocalPostBackend, LocalPostConfig};
use tokio::time::timeout;

const CHUNK: usize = 4 * 1024;

fn local_gateway_backend(throttle_ms: u64) -> Arc<LocalPostBackend> {
    Arc::new(LocalPostBackend::new(LocalPostConfig {
        chunk_bytes: CHUNK,
        benchmark_bytes: 64 * 1024,
        throttle_delay: Duration::from_millis(throttle_ms),
        ..LocalPostConfig::default()
    }))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "meshgate-e2e-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn test_create_follow_and_delete_post_data() {
    let gateway = TestGateway::start(local_gateway_backend(20)).await;
    let client = gateway.client().await;
    let dir = scratch_dir("complete");
    let data_size = 16 * CHUNK as u64;

    let mut options = post_options(dir.to_str().unwrap(), data_size);
    options.throttle = true;
    client.create_post_data(options).await.unwrap();
    let mut progress = client.subscribe_post_progress().await.unwrap();

    let mut last = 0;
    let mut finished = false;
    while let Some(event) = timeout(STEP, progress.next()).await.unwrap() {
        let event = event.unwrap();
        assert!(event.error_kind.is_none());
        assert!(event.bytes_written >= last);
        last = event.bytes_written;
        finished = !event.in_progress;
    }
    assert_eq!(last, data_size);
    assert!(finished);

    let status = client.post_status().await.unwrap();
    assert_eq!(status.state, "COMPLETED");
    assert_eq!(status.bytes_written, data_size);

    let data_file = dir.join(DATA_FILE_NAME);
    assert_eq!(std::fs::metadata(&data_file).unwrap().len(), data_size);

    client.stop_post_data_creation_session(true).await.unwrap();
    assert!(!data_file.exists());
    assert_eq!(client.post_status().await.unwrap().state, "COMPLETED");

    let _ = std::fs::remove_dir_all(&dir);
    gateway.stop().await;
}

#[tokio::test]
async fn test_stop_interrupts_local_session() {
    let gateway = TestGateway::start(local_gateway_backend(50)).await;
    let client = gateway.client().await;
    let dir = scratch_dir("interrupted");
    let data_size = 1024 * CHUNK as u64;

    let mut options = post_options(dir.to_str().unwrap(), data_size);
    options.throttle = true;
    client.create_post_data(options).await.unwrap();
    let mut progress = client.subscribe_post_progress().await.unwrap();

    let first = timeout(STEP, progress.next()).await.unwrap().unwrap().unwrap();
    assert!(first.in_progress);

    client.stop_post_data_creation_session(false).await.unwrap();
    while timeout(STEP, progress.next()).await.unwrap().is_some() {}

    let status = client.post_status().await.unwrap();
    assert_eq!(status.state, "STOPPED");
    assert!(!status.in_progress);
    assert!(status.bytes_written < data_size);
    assert!(dir.join(DATA_FILE_NAME).exists());

    let _ = std::fs::remove_dir_all(&dir);
    gateway.stop().await;
}

#[tokio::test]
async fn test_local_cpu_provider_is_benchmarked() {
    let gateway = TestGateway::start(local_gateway_backend(0)).await;
    let client = gateway.client().await;

    let providers = client.post_compute_providers().await.unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].id, 0);
    assert_eq!(providers[0].compute_api, "CPU");
    assert!(providers[0].performance > 0);

    gateway.stop().await;
}

#[tokio::test]
async fn test_unknown_provider_is_invalid_argument() {
    let gateway = TestGateway::start(local_gateway_backend(0)).await;
    let client = gateway.client().await;
    let dir = scratch_dir("bad-provider");

    let mut options = post_options(dir.to_str().unwrap(), CHUNK as u64);
    options.compute_provider_id = 7;
    let err = client.create_post_data(options).await.unwrap_err();
    assert_eq!(err.kind(), Some("INVALID_ARGUMENT"));
    assert_eq!(client.post_status().await.unwrap().state, "IDLE");

    gateway.stop().await;
}
