use inapp_update::config::{UpdateFlowConfig, UpdateMode};
use inapp_update::core::FailureKind;
use inapp_update::orchestrator::{FlowOutcome, UpdateOrchestrator, UpdateServices};
use inapp_update::platform::TargetPlatform;
use inapp_update::presentation::{PromptDecision, StorefrontTarget};
use inapp_update::store::FixedInstalledVersion;
use inapp_update::test_utils::{
    FakeUpdateService, RecordingLauncher, RecordingPrompt, init_test_logging,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Flow {
    prompt: Arc<RecordingPrompt>,
    launcher: Arc<RecordingLauncher>,
    orchestrator: UpdateOrchestrator,
}

fn flow(installed: &str, decision: PromptDecision, launcher: RecordingLauncher) -> Flow {
    init_test_logging(None);
    let prompt = Arc::new(RecordingPrompt::answering(decision));
    let launcher = Arc::new(launcher);
    let orchestrator = UpdateOrchestrator::new(UpdateServices {
        platform: Arc::new(FakeUpdateService::new()),
        installed: Arc::new(FixedInstalledVersion::new(installed)),
        metadata: None,
        prompt: prompt.clone(),
        launcher: launcher.clone(),
    });
    Flow {
        prompt,
        launcher,
        orchestrator,
    }
}

async fn store_publishing(version: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultCount": 1,
            "results": [{ "version": version }]
        })))
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> UpdateFlowConfig {
    let mut config = UpdateFlowConfig::new(UpdateMode::RemoteCheck).with_app_id("284882215");
    config.lookup_endpoint = format!("{}/lookup?id={{id}}", server.uri());
    config
}

#[tokio::test]
async fn test_newer_store_version_prompts_and_opens_store() {
    let server = store_publishing("2.2.0").await;
    let f = flow("2.1.0", PromptDecision::Proceed, RecordingLauncher::new(true));

    let outcome = f.orchestrator.run(TargetPlatform::Ios, config_for(&server)).await;

    let deep_link = "itms-apps://itunes.apple.com/app/id284882215".to_string();
    assert_eq!(outcome, FlowOutcome::StorefrontOpened(StorefrontTarget::DeepLink(deep_link.clone())));
    let requests = f.prompt.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].installed_version, "2.1.0");
    assert_eq!(requests[0].store_version, "2.2.0");
    assert!(requests[0].update_available);
    assert_eq!(f.launcher.opened(), vec![deep_link]);
}

#[tokio::test]
async fn test_falls_back_to_web_page_without_deep_link_support() {
    let server = store_publishing("3.0").await;
    let f = flow("2.9.9", PromptDecision::Proceed, RecordingLauncher::new(false));

    let outcome = f.orchestrator.run(TargetPlatform::Ios, config_for(&server)).await;

    let web = "https://apps.apple.com/app/id284882215".to_string();
    assert_eq!(outcome, FlowOutcome::StorefrontOpened(StorefrontTarget::Web(web.clone())));
    assert_eq!(f.launcher.opened(), vec![web]);
}

#[tokio::test]
async fn test_same_version_does_not_prompt() {
    let server = store_publishing("2.1.0").await;
    let f = flow("2.1.0", PromptDecision::Proceed, RecordingLauncher::new(true));

    let outcome = f.orchestrator.run(TargetPlatform::Ios, config_for(&server)).await;

    assert_eq!(outcome, FlowOutcome::NoUpdate);
    assert!(f.prompt.requests().is_empty());
    assert!(f.launcher.opened().is_empty());
}

#[tokio::test]
async fn test_dismissed_prompt_opens_nothing() {
    let server = store_publishing("2.2.0").await;
    let f = flow("2.1.0", PromptDecision::Dismiss, RecordingLauncher::new(true));

    let outcome = f.orchestrator.run(TargetPlatform::Ios, config_for(&server)).await;

    assert_eq!(outcome, FlowOutcome::Declined);
    assert!(f.launcher.opened().is_empty());
}

#[tokio::test]
async fn test_unreachable_store_is_treated_as_no_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let f = flow("1.0.0", PromptDecision::Proceed, RecordingLauncher::new(true));

    let outcome = f.orchestrator.run(TargetPlatform::Ios, config_for(&server)).await;

    assert_eq!(outcome, FlowOutcome::Failed(FailureKind::TransientIo));
    assert!(f.prompt.requests().is_empty());
}

#[tokio::test]
async fn test_lookup_timeout_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "results": [{ "version": "9.0" }] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    let f = flow("1.0.0", PromptDecision::Proceed, RecordingLauncher::new(true));
    let config = config_for(&server).with_lookup_timeout(Duration::from_secs(1));

    let started = std::time::Instant::now();
    let outcome = f.orchestrator.run(TargetPlatform::Ios, config).await;

    assert_eq!(outcome, FlowOutcome::Failed(FailureKind::TransientIo));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(f.prompt.requests().is_empty());
}

#[tokio::test]
async fn test_missing_app_id_skips_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let f = flow("1.0.0", PromptDecision::Proceed, RecordingLauncher::new(true));
    let mut config = UpdateFlowConfig::new(UpdateMode::RemoteCheck);
    config.lookup_endpoint = format!("{}/lookup?id={{id}}", server.uri());

    let outcome = f.orchestrator.run(TargetPlatform::Ios, config).await;

    assert_eq!(outcome, FlowOutcome::Skipped);
}
