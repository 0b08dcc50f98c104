//! Gateway End-to-End Tests
//!
//! A real server on ephemeral ports, driven through the SDK over WebSocket
//! and through a plain HTTP client on the JSON gateway.

mod common;

use std::sync::Arc;

use common::{eventually, post_options, TestGateway, STEP};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::HttpClientBuilder;
use jsonrpsee::ws_client::WsClientBuilder;
use meshgate_core::domain::ProgressEvent;
use meshgate_core::port::post::mocks::MockPostBackend;
use meshgate_sdk::NodeStatus;
use tokio::time::timeout;

async fn mock_gateway() -> (TestGateway, Arc<MockPostBackend>) {
    let backend = Arc::new(MockPostBackend::with_providers(vec![
        MockPostBackend::cpu_provider(0),
        MockPostBackend::cpu_provider(1),
    ]));
    (TestGateway::start(backend.clone()).await, backend)
}

#[tokio::test]
async fn test_node_service_over_websocket() {
    let (gateway, _) = mock_gateway().await;
    let client = gateway.client().await;

    assert_eq!(client.echo("ping").await.unwrap(), "ping");
    assert_eq!(client.version().await.unwrap(), meshgate_core::VERSION);
    assert_eq!(client.build().await.unwrap(), meshgate_core::BUILD_COMMIT);
    assert_eq!(
        client.status().await.unwrap(),
        NodeStatus {
            connected_peers: 3,
            is_synced: true,
            synced_layer: 100,
            top_layer: 101,
            verified_layer: 98,
        }
    );

    client.sync_start().await.unwrap();
    assert_eq!(gateway.syncer.start_calls(), 1);

    client.shutdown().await.unwrap();
    assert_eq!(gateway.process.shutdown_requests(), 1);

    gateway.stop().await;
}

#[tokio::test]
async fn test_mesh_service_reports_clock() {
    let (gateway, _) = mock_gateway().await;
    let client = gateway.client().await;

    let mesh = client.mesh_info().await.unwrap();
    assert_eq!(mesh.genesis_time, 0);
    assert_eq!(mesh.current_layer, 101);
    assert_eq!(mesh.current_epoch, 10);
    assert_eq!(mesh.layer_duration_secs, 30);
    assert_eq!(mesh.layers_per_epoch, 10);

    gateway.stop().await;
}

#[tokio::test]
async fn test_json_gateway_serves_plain_http() {
    let (gateway, _) = mock_gateway().await;
    let http = HttpClientBuilder::default()
        .build(gateway.gateway_url())
        .unwrap();

    let mut params = ObjectParams::new();
    params.insert("msg", "over http").unwrap();
    let response: serde_json::Value = http.request("node.echo.v1", params).await.unwrap();
    assert_eq!(response["msg"], "over http");

    let err = http
        .request::<serde_json::Value, _>("node.echo.v1", ObjectParams::new())
        .await
        .unwrap_err();
    match err {
        ClientError::Call(call) => {
            assert_eq!(call.code(), 4000);
            assert!(call.message().contains("msg"));
        }
        other => panic!("unexpected error: {other}"),
    }

    gateway.stop().await;
}

#[tokio::test]
async fn test_json_gateway_refuses_websocket() {
    let (gateway, _) = mock_gateway().await;
    let ws_on_gateway = gateway.gateway_url().replacen("http://", "ws://", 1);

    let result = WsClientBuilder::default().build(ws_on_gateway).await;
    assert!(result.is_err());

    gateway.stop().await;
}

#[tokio::test]
async fn test_min_gas_is_unimplemented() {
    let (gateway, _) = mock_gateway().await;
    let client = gateway.client().await;

    let err = client.min_gas().await.unwrap_err();
    assert_eq!(err.kind(), Some("UNIMPLEMENTED"));
    let err = client.set_min_gas(10).await.unwrap_err();
    assert_eq!(err.kind(), Some("UNIMPLEMENTED"));

    gateway.stop().await;
}

#[tokio::test]
async fn test_smeshing_and_coinbase() {
    let (gateway, _) = mock_gateway().await;
    let client = gateway.client().await;
    let coinbase = format!("0x{}", "11".repeat(20));

    assert!(!client.is_smeshing().await.unwrap());
    assert_eq!(client.smesher_id().await.unwrap(), "0xdead");

    client.start_smeshing(coinbase.clone()).await.unwrap();
    assert!(client.is_smeshing().await.unwrap());
    assert_eq!(client.coinbase().await.unwrap(), coinbase);

    let err = client.start_smeshing(coinbase).await.unwrap_err();
    assert_eq!(err.kind(), Some("ALREADY_RUNNING"));

    client.stop_smeshing().await.unwrap();
    let err = client.stop_smeshing().await.unwrap_err();
    assert_eq!(err.kind(), Some("NOT_RUNNING"));

    let err = client.set_coinbase("not-hex").await.unwrap_err();
    assert_eq!(err.kind(), Some("INVALID_ARGUMENT"));

    gateway.stop().await;
}

#[tokio::test]
async fn test_status_and_error_streams_end_empty() {
    let (gateway, _) = mock_gateway().await;
    let client = gateway.client().await;

    let mut status = client.subscribe_status().await.unwrap();
    assert!(timeout(STEP, status.next()).await.unwrap().is_none());

    let mut errors = client.subscribe_errors().await.unwrap();
    assert!(timeout(STEP, errors.next()).await.unwrap().is_none());

    // The connection stays usable afterwards
    assert_eq!(client.echo("still here").await.unwrap(), "still here");

    gateway.stop().await;
}

#[tokio::test]
async fn test_compute_providers_are_benchmarked() {
    let (gateway, backend) = mock_gateway().await;
    let client = gateway.client().await;

    let providers = client.post_compute_providers().await.unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].id, 0);
    assert_eq!(providers[0].compute_api, "CPU");
    assert_eq!(providers[1].performance, 2_000_000);

    backend.fail_benchmark(1);
    let err = client.post_compute_providers().await.unwrap_err();
    assert_eq!(err.kind(), Some("INTERNAL"));

    gateway.stop().await;
}

#[tokio::test]
async fn test_progress_stream_follows_session_to_completion() {
    let (gateway, backend) = mock_gateway().await;
    let client = gateway.client().await;

    client
        .create_post_data(post_options("/tmp/meshgate-e2e-mock", 1024))
        .await
        .unwrap();
    let mut progress = client.subscribe_post_progress().await.unwrap();

    let emitter = backend.emitter().unwrap();
    emitter.send(ProgressEvent::progress(256)).await.unwrap();
    emitter.send(ProgressEvent::progress(1024)).await.unwrap();

    let first = timeout(STEP, progress.next()).await.unwrap().unwrap().unwrap();
    let second = timeout(STEP, progress.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(first.bytes_written, 256);
    assert_eq!(second.bytes_written, 1024);
    assert!(second.in_progress);

    drop(emitter);
    backend.finish();
    assert!(timeout(STEP, progress.next()).await.unwrap().is_none());

    let status = client.post_status().await.unwrap();
    assert_eq!(status.state, "COMPLETED");
    assert_eq!(status.bytes_written, 1024);
    assert!(!status.in_progress);
    assert_eq!(status.opts.unwrap().data_dir, "/tmp/meshgate-e2e-mock");

    gateway.stop().await;
}

#[tokio::test]
async fn test_second_create_is_rejected_while_running() {
    let (gateway, backend) = mock_gateway().await;
    let client = gateway.client().await;

    client
        .create_post_data(post_options("/tmp/meshgate-e2e-a", 1024))
        .await
        .unwrap();
    let err = client
        .create_post_data(post_options("/tmp/meshgate-e2e-b", 2048))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some("ALREADY_RUNNING"));
    assert_eq!(backend.start_calls().len(), 1);

    let status = client.post_status().await.unwrap();
    assert_eq!(status.state, "RUNNING");
    assert_eq!(status.opts.unwrap().data_dir, "/tmp/meshgate-e2e-a");

    gateway.stop().await;
}

#[tokio::test]
async fn test_stop_ends_stream_and_deletes_files() {
    let (gateway, backend) = mock_gateway().await;
    let client = gateway.client().await;

    let err = client
        .stop_post_data_creation_session(false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some("NOT_RUNNING"));

    client
        .create_post_data(post_options("/tmp/meshgate-e2e-stop", 4096))
        .await
        .unwrap();
    let mut progress = client.subscribe_post_progress().await.unwrap();

    client.stop_post_data_creation_session(true).await.unwrap();
    assert!(timeout(STEP, progress.next()).await.unwrap().is_none());

    assert_eq!(backend.stop_calls(), 1);
    assert_eq!(backend.deleted(), vec!["/tmp/meshgate-e2e-stop".to_string()]);
    assert_eq!(client.post_status().await.unwrap().state, "STOPPED");

    gateway.stop().await;
}

#[tokio::test]
async fn test_stream_after_session_ended_finishes_immediately() {
    let (gateway, backend) = mock_gateway().await;
    let client = gateway.client().await;

    client
        .create_post_data(post_options("/tmp/meshgate-e2e-late", 512))
        .await
        .unwrap();
    backend.finish();
    assert!(eventually(|| !gateway.post.status().in_progress).await);

    let mut progress = client.subscribe_post_progress().await.unwrap();
    assert!(timeout(STEP, progress.next()).await.unwrap().is_none());

    gateway.stop().await;
}

#[tokio::test]
async fn test_disconnect_releases_progress_subscriber() {
    let (gateway, _backend) = mock_gateway().await;

    let client = gateway.client().await;
    client
        .create_post_data(post_options("/tmp/meshgate-e2e-disconnect", 1024))
        .await
        .unwrap();

    let watcher = gateway.client().await;
    let progress = watcher.subscribe_post_progress().await.unwrap();
    let other = client.subscribe_post_progress().await.unwrap();
    assert_eq!(gateway.post.progress_subscribers(), 2);

    progress.unsubscribe().await.unwrap();
    assert!(eventually(|| gateway.post.progress_subscribers() == 1).await);

    drop(other);
    drop(client);
    assert!(eventually(|| gateway.post.progress_subscribers() == 0).await);

    gateway.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_progress_streams() {
    let (gateway, _backend) = mock_gateway().await;
    let client = gateway.client().await;

    client
        .create_post_data(post_options("/tmp/meshgate-e2e-shutdown", 1024))
        .await
        .unwrap();
    let mut progress = client.subscribe_post_progress().await.unwrap();

    gateway.signal_shutdown();
    assert!(timeout(STEP, progress.next()).await.unwrap().is_none());
    assert!(eventually(|| gateway.post.progress_subscribers() == 0).await);

    gateway.stop().await;
}

#[tokio::test]
async fn test_fan_out_survives_subscriber_leaving_mid_sequence() {
    let (gateway, backend) = mock_gateway().await;
    let client = gateway.client().await;

    client
        .create_post_data(post_options("/tmp/meshgate-e2e-fanout", 4096))
        .await
        .unwrap();
    let mut leaving = client.subscribe_post_progress().await.unwrap();
    let mut first = client.subscribe_post_progress().await.unwrap();
    let other_client = gateway.client().await;
    let mut second = other_client.subscribe_post_progress().await.unwrap();

    let emitter = backend.emitter().unwrap();
    for step in 1..=2 {
        emitter.send(ProgressEvent::progress(step * 1024)).await.unwrap();
    }
    for _ in 1..=2 {
        timeout(STEP, leaving.next()).await.unwrap().unwrap().unwrap();
    }
    leaving.unsubscribe().await.unwrap();

    for step in 3..=4 {
        emitter.send(ProgressEvent::progress(step * 1024)).await.unwrap();
    }
    drop(emitter);
    backend.finish();

    for subscription in [&mut first, &mut second] {
        let mut seen = Vec::new();
        while let Some(event) = timeout(STEP, subscription.next()).await.unwrap() {
            seen.push(event.unwrap().bytes_written);
        }
        assert_eq!(seen, vec![1024, 2048, 3072, 4096]);
    }

    gateway.stop().await;
}
