use futures::StreamExt;
use inapp_update::config::{UpdateFlowConfig, UpdateMode};
use inapp_update::lifecycle::StatusCallback;
use inapp_update::orchestrator::{FlowOutcome, UpdateOrchestrator, UpdateServices};
use inapp_update::platform::{TargetPlatform, UpdateAvailability};
use inapp_update::presentation::PromptDecision;
use inapp_update::status::{InstallStatus, PlatformInstallStatus};
use inapp_update::store::FixedInstalledVersion;
use inapp_update::test_utils::{
    FakeUpdateService, RecordingLauncher, RecordingPrompt, init_test_logging,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn orchestrator(service: Arc<FakeUpdateService>) -> UpdateOrchestrator {
    init_test_logging(None);
    UpdateOrchestrator::new(UpdateServices {
        platform: service,
        installed: Arc::new(FixedInstalledVersion::new("1.0.0")),
        metadata: None,
        prompt: Arc::new(RecordingPrompt::answering(PromptDecision::Dismiss)),
        launcher: Arc::new(RecordingLauncher::new(false)),
    })
}

fn flexible_update() -> FakeUpdateService {
    FakeUpdateService::new().with_availability(UpdateAvailability {
        available: true,
        immediate_permitted: false,
        flexible_permitted: true,
    })
}

fn recording_callback() -> (StatusCallback, mpsc::UnboundedReceiver<InstallStatus>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback = StatusCallback::new(move |status| {
        tx.send(status)?;
        Ok(())
    });
    (callback, rx)
}

#[tokio::test]
async fn test_flexible_update_reports_progress_and_completes() {
    let service = Arc::new(flexible_update());
    let orchestrator = orchestrator(service.clone());
    let (callback, mut rx) = recording_callback();
    let config = UpdateFlowConfig::new(UpdateMode::Flexible)
        .with_auto_complete(true)
        .with_on_status(callback);

    let outcome = orchestrator.run(TargetPlatform::Android, config).await;
    assert_eq!(outcome, FlowOutcome::FlexibleStarted);
    assert_eq!(service.start_calls(), 1);
    assert!(orchestrator.is_tracking());

    service.emit(PlatformInstallStatus::Pending);
    service.emit(PlatformInstallStatus::Downloading);
    service.emit(PlatformInstallStatus::Downloaded);

    let mut received = Vec::new();
    for _ in 0..3 {
        received.push(rx.recv().await.unwrap());
    }
    assert_eq!(
        received,
        vec![InstallStatus::Pending, InstallStatus::Downloading, InstallStatus::Downloaded]
    );

    service.wait_for_complete_calls(1, Duration::from_secs(2)).await;
    assert_eq!(service.complete_calls(), 1);
}

#[tokio::test]
async fn test_panicking_callback_still_auto_completes() {
    let service = Arc::new(flexible_update());
    let orchestrator = orchestrator(service.clone());
    let config = UpdateFlowConfig::new(UpdateMode::Flexible)
        .with_auto_complete(true)
        .with_on_status(StatusCallback::new(|_| panic!("callback bug")));

    let outcome = orchestrator.run(TargetPlatform::Android, config).await;
    assert_eq!(outcome, FlowOutcome::FlexibleStarted);

    service.emit(PlatformInstallStatus::Downloading);
    service.emit(PlatformInstallStatus::Downloaded);

    service.wait_for_complete_calls(1, Duration::from_secs(2)).await;
    assert_eq!(service.complete_calls(), 1);
}

#[tokio::test]
async fn test_stop_tracking_ends_callbacks() {
    let service = Arc::new(flexible_update());
    let orchestrator = orchestrator(service.clone());
    let (callback, mut rx) = recording_callback();
    let config = UpdateFlowConfig::new(UpdateMode::Flexible).with_on_status(callback);

    orchestrator.run(TargetPlatform::Android, config).await;
    service.emit(PlatformInstallStatus::Pending);
    assert_eq!(rx.recv().await, Some(InstallStatus::Pending));

    orchestrator.stop_tracking();
    orchestrator.stop_tracking();
    assert!(!orchestrator.is_tracking());

    // The aborted task drops the callback and with it the sender.
    assert_eq!(rx.recv().await, None);
    assert_eq!(service.complete_calls(), 0);
}

#[tokio::test]
async fn test_status_stream_is_independent_of_tracking() {
    let service = Arc::new(flexible_update());
    let orchestrator = orchestrator(service.clone());
    let mut statuses = orchestrator.status_stream();

    service.emit(PlatformInstallStatus::Installing);
    service.emit(PlatformInstallStatus::Failed);

    assert_eq!(statuses.next().await, Some(InstallStatus::Installing));
    assert_eq!(statuses.next().await, Some(InstallStatus::Failed));
    assert!(!orchestrator.is_tracking());
}

#[tokio::test]
async fn test_running_twice_keeps_one_subscription() {
    let service = Arc::new(flexible_update());
    let orchestrator = orchestrator(service.clone());
    let (first, mut first_rx) = recording_callback();
    let (second, mut second_rx) = recording_callback();

    orchestrator
        .run(TargetPlatform::Android, UpdateFlowConfig::new(UpdateMode::Flexible).with_on_status(first))
        .await;
    orchestrator
        .run(TargetPlatform::Android, UpdateFlowConfig::new(UpdateMode::Flexible).with_on_status(second))
        .await;

    service.emit(PlatformInstallStatus::Downloading);
    assert_eq!(second_rx.recv().await, Some(InstallStatus::Downloading));
    assert_eq!(first_rx.recv().await, None);
}

#[tokio::test]
async fn test_rerun_without_callback_completes_once() {
    let service = Arc::new(flexible_update());
    let orchestrator = orchestrator(service.clone());
    let (callback, mut rx) = recording_callback();

    let with_callback = UpdateFlowConfig::new(UpdateMode::Flexible)
        .with_auto_complete(true)
        .with_on_status(callback);
    let without_callback = UpdateFlowConfig::new(UpdateMode::Flexible).with_auto_complete(true);
    orchestrator.run(TargetPlatform::Android, with_callback).await;
    orchestrator.run(TargetPlatform::Android, without_callback).await;

    // The callback subscription is gone before any status arrives.
    assert_eq!(rx.recv().await, None);
    assert!(!orchestrator.is_tracking());

    service.emit(PlatformInstallStatus::Downloaded);
    service.wait_for_complete_calls(1, Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(service.complete_calls(), 1);
    assert_eq!(service.subscriber_count(), 0);
}
