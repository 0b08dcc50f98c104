// PostSetupController behavior against the mock backend

use super::*;
use crate::domain::PostErrorKind;
use crate::error::ErrorKind;
use crate::port::post::mocks::{MockPostBackend, MockStartFailure};
use std::time::Duration;

fn options(dir: &str) -> PostOptions {
    PostOptions {
        data_dir: dir.to_string(),
        data_size: 4096,
        append: false,
        throttle: false,
        compute_provider_id: 0,
    }
}

fn controller() -> (Arc<MockPostBackend>, PostSetupController) {
    let backend = Arc::new(MockPostBackend::with_providers(vec![
        MockPostBackend::cpu_provider(0),
        MockPostBackend::cpu_provider(1),
    ]));
    let controller = PostSetupController::new(backend.clone());
    (backend, controller)
}

/// Poll until the controller leaves Running (the pump runs on its own task)
async fn wait_for_state(controller: &PostSetupController, want: JobState) {
    for _ in 0..100 {
        if controller.status().state == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("state never became {}", want);
}

#[tokio::test]
async fn test_initial_state_is_idle() {
    let (_, controller) = controller();
    let status = controller.status();
    assert_eq!(status.state, JobState::Idle);
    assert!(status.last_options.is_none());
    assert!(!status.in_progress);
}

#[tokio::test]
async fn test_start_records_options_and_runs() {
    let (backend, controller) = controller();
    controller.start(options("/data/a")).await.unwrap();

    let status = controller.status();
    assert_eq!(status.state, JobState::Running);
    assert!(status.in_progress);
    assert_eq!(status.last_options, Some(options("/data/a")));
    assert_eq!(backend.start_calls(), vec![options("/data/a")]);
}

#[tokio::test]
async fn test_missing_data_dir_is_invalid_argument_before_backend() {
    let (backend, controller) = controller();
    let err = controller.start(options("  ")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut zero = options("/data/a");
    zero.data_size = 0;
    let err = controller.start(zero).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert!(backend.start_calls().is_empty());
    assert_eq!(controller.status().state, JobState::Idle);
}

#[tokio::test]
async fn test_start_while_running_fails_and_keeps_previous_job() {
    let (backend, controller) = controller();
    controller.start(options("/data/first")).await.unwrap();

    let err = controller.start(options("/data/second")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyRunning);

    let status = controller.status();
    assert_eq!(status.state, JobState::Running);
    assert_eq!(status.last_options, Some(options("/data/first")));
    assert_eq!(backend.start_calls().len(), 1);
}

#[tokio::test]
async fn test_concurrent_starts_admit_exactly_one() {
    let (backend, controller) = controller();
    let controller = Arc::new(controller);

    let mut handles = vec![];
    for i in 0..8 {
        let controller = controller.clone();
        handles.push(tokio::spawn(async move {
            controller.start(options(&format!("/data/{}", i))).await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::AlreadyRunning),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(backend.start_calls().len(), 1);
}

#[tokio::test]
async fn test_backend_start_failure_keeps_kind_and_state() {
    let (backend, controller) = controller();
    backend.fail_next_start(MockStartFailure::InvalidArgument("no such provider".into()));

    let err = controller.start(options("/data/a")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(controller.status().state, JobState::Idle);
    assert!(controller.status().last_options.is_none());

    backend.fail_next_start(MockStartFailure::Internal("gpu lost".into()));
    let err = controller.start(options("/data/a")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("gpu lost"));
}

#[tokio::test]
async fn test_stop_before_any_start_is_not_running() {
    let (backend, controller) = controller();
    let err = controller.stop(true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotRunning);
    assert!(backend.deleted().is_empty());
    assert_eq!(backend.stop_calls(), 0);
}

#[tokio::test]
async fn test_stop_running_job_deletes_exactly_last_options_path() {
    let (backend, controller) = controller();
    controller.start(options("/data/plot-1")).await.unwrap();

    controller.stop(true).await.unwrap();

    assert_eq!(controller.status().state, JobState::Stopped);
    assert!(!controller.status().in_progress);
    assert_eq!(backend.stop_calls(), 1);
    assert_eq!(backend.deleted(), vec!["/data/plot-1".to_string()]);
}

#[tokio::test]
async fn test_stop_without_delete_keeps_data() {
    let (backend, controller) = controller();
    controller.start(options("/data/plot-1")).await.unwrap();
    controller.stop(false).await.unwrap();

    assert_eq!(controller.status().state, JobState::Stopped);
    assert!(backend.deleted().is_empty());
}

#[tokio::test]
async fn test_stop_after_stop_is_noop_safe() {
    let (backend, controller) = controller();
    controller.start(options("/data/plot-1")).await.unwrap();
    controller.stop(false).await.unwrap();
    controller.stop(false).await.unwrap();

    assert_eq!(backend.stop_calls(), 1);
    assert_eq!(controller.status().state, JobState::Stopped);
}

#[tokio::test]
async fn test_natural_completion_and_restart() {
    let (backend, controller) = controller();
    controller.start(options("/data/a")).await.unwrap();

    let emitter = backend.emitter().unwrap();
    emitter.send(ProgressEvent::progress(2048)).await.unwrap();
    emitter.send(ProgressEvent::progress(4096)).await.unwrap();
    drop(emitter);
    backend.finish();

    wait_for_state(&controller, JobState::Completed).await;
    let status = controller.status();
    assert_eq!(status.bytes_written, 4096);
    assert!(!status.in_progress);
    assert_eq!(status.last_options, Some(options("/data/a")));

    controller.start(options("/data/b")).await.unwrap();
    assert_eq!(controller.status().state, JobState::Running);
    assert_eq!(controller.status().bytes_written, 0);
}

#[tokio::test]
async fn test_stop_after_completion_only_deletes() {
    let (backend, controller) = controller();
    controller.start(options("/data/a")).await.unwrap();
    drop(backend.emitter().unwrap());
    backend.finish();
    wait_for_state(&controller, JobState::Completed).await;

    controller.stop(true).await.unwrap();

    assert_eq!(backend.stop_calls(), 0);
    assert_eq!(controller.status().state, JobState::Completed);
    assert_eq!(backend.deleted(), vec!["/data/a".to_string()]);
}

#[tokio::test]
async fn test_error_event_ends_in_failed() {
    let (backend, controller) = controller();
    controller.start(options("/data/a")).await.unwrap();

    let emitter = backend.emitter().unwrap();
    emitter
        .send(ProgressEvent::failure(1024, PostErrorKind::FileIo, "disk full"))
        .await
        .unwrap();
    drop(emitter);
    backend.finish();

    wait_for_state(&controller, JobState::Failed).await;
    let status = controller.status();
    assert_eq!(status.error_kind, Some(PostErrorKind::FileIo));
    assert_eq!(status.error_message.as_deref(), Some("disk full"));
}

#[tokio::test]
async fn test_subscribers_receive_events_until_completion() {
    let (backend, controller) = controller();
    controller.start(options("/data/a")).await.unwrap();

    let mut subs: Vec<_> = (0..3).map(|_| controller.subscribe_progress()).collect();
    assert_eq!(controller.progress_subscribers(), 3);

    let sequence: Vec<_> = (1..=5).map(|i| ProgressEvent::progress(i * 512)).collect();
    let emitter = backend.emitter().unwrap();
    for event in &sequence {
        emitter.send(event.clone()).await.unwrap();
    }
    drop(emitter);
    backend.finish();

    for sub in subs.iter_mut() {
        let mut seen = vec![];
        while let Some(event) = tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .unwrap()
        {
            seen.push(event);
        }
        assert_eq!(seen, sequence);
    }
    assert_eq!(controller.progress_subscribers(), 0);
}

#[tokio::test]
async fn test_stop_ends_open_subscriptions() {
    let (_, controller) = controller();
    controller.start(options("/data/a")).await.unwrap();
    let mut sub = controller.subscribe_progress();

    controller.stop(false).await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(1), sub.next())
        .await
        .unwrap();
    assert!(next.is_none());
    assert_eq!(controller.progress_subscribers(), 0);
}

#[tokio::test]
async fn test_providers_are_benchmarked() {
    let (_, controller) = controller();
    let providers = controller.providers().await.unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].provider.id, 0);
    assert_eq!(providers[0].performance, 1_000_000);
    assert_eq!(providers[1].performance, 2_000_000);
}

#[tokio::test]
async fn test_one_failing_benchmark_fails_enumeration() {
    let (backend, controller) = controller();
    backend.fail_benchmark(1);

    let err = controller.providers().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("provider 1"));
}
