//! Scriptable stand-ins for the update collaborators.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};

use crate::core::{UpdateError, UpdateResult};
use crate::platform::{FlexibleStart, PlatformUpdateService, UpdateAvailability, broadcast_feed};
use crate::presentation::{PromptDecision, PromptRequest, UpdatePrompt, UrlLauncher};
use crate::status::PlatformInstallStatus;
use crate::store::MetadataSource;

/// Platform update service driven by the test.
///
/// Statuses pushed with [`emit`](Self::emit) reach every open feed
/// subscription in order. Every service call is counted.
pub struct FakeUpdateService {
    availability: UpdateAvailability,
    flexible_start: FlexibleStart,
    fail_check: bool,
    fail_start: bool,
    fail_complete: bool,
    complete_delay: Option<Duration>,
    events: broadcast::Sender<PlatformInstallStatus>,
    check_calls: AtomicUsize,
    immediate_calls: AtomicUsize,
    start_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    finished_completes: AtomicUsize,
    completed: Notify,
}

impl FakeUpdateService {
    /// A service reporting no update.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            availability: UpdateAvailability::none(),
            flexible_start: FlexibleStart::Started,
            fail_check: false,
            fail_start: false,
            fail_complete: false,
            complete_delay: None,
            events,
            check_calls: AtomicUsize::new(0),
            immediate_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            finished_completes: AtomicUsize::new(0),
            completed: Notify::new(),
        }
    }

    pub fn with_availability(mut self, availability: UpdateAvailability) -> Self {
        self.availability = availability;
        self
    }

    pub fn denying_flexible(mut self) -> Self {
        self.flexible_start = FlexibleStart::Denied;
        self
    }

    pub fn failing_check(mut self) -> Self {
        self.fail_check = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_complete(mut self) -> Self {
        self.fail_complete = true;
        self
    }

    /// Make `complete_install` take `delay` before it returns.
    pub fn with_complete_delay(mut self, delay: Duration) -> Self {
        self.complete_delay = Some(delay);
        self
    }

    /// Push a status to every open feed subscription.
    pub fn emit(&self, status: PlatformInstallStatus) {
        let _ = self.events.send(status);
    }

    /// Number of open feed subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn immediate_calls(&self) -> usize {
        self.immediate_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    /// Number of `complete_install` calls that ran to the end.
    pub fn finished_complete_calls(&self) -> usize {
        self.finished_completes.load(Ordering::SeqCst)
    }

    /// Wait until `complete_install` has been called at least `count` times.
    ///
    /// # Panics
    ///
    /// Panics if that does not happen within `timeout`.
    pub async fn wait_for_complete_calls(&self, count: usize, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.completed.notified();
            if self.complete_calls() >= count {
                return;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                panic!(
                    "expected {count} complete calls within {timeout:?}, saw {}",
                    self.complete_calls()
                );
            }
        }
    }
}

impl Default for FakeUpdateService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformUpdateService for FakeUpdateService {
    async fn check_availability(&self) -> UpdateResult<UpdateAvailability> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_check {
            return Err(UpdateError::platform("check", "service unavailable"));
        }
        Ok(self.availability)
    }

    async fn perform_immediate(&self) -> UpdateResult<()> {
        self.immediate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start_flexible(&self) -> UpdateResult<FlexibleStart> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(UpdateError::platform("start flexible", "activity not attached"));
        }
        Ok(self.flexible_start)
    }

    async fn complete_install(&self) -> UpdateResult<()> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.completed.notify_waiters();
        if let Some(delay) = self.complete_delay {
            tokio::time::sleep(delay).await;
        }
        self.finished_completes.fetch_add(1, Ordering::SeqCst);
        if self.fail_complete {
            return Err(UpdateError::platform("complete", "nothing downloaded"));
        }
        Ok(())
    }

    fn install_events(&self) -> BoxStream<'static, PlatformInstallStatus> {
        broadcast_feed(self.events.subscribe())
    }
}

/// Store version source with a canned answer.
pub struct FakeMetadataSource {
    answer: Result<String, u16>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeMetadataSource {
    /// Answers with `version`.
    pub fn version(version: impl Into<String>) -> Self {
        Self::with_answer(Ok(version.into()))
    }

    /// Answers with a response that carries no version.
    pub fn missing() -> Self {
        Self::with_answer(Ok(String::new()))
    }

    /// Fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self::with_answer(Err(status))
    }

    fn with_answer(answer: Result<String, u16>) -> Self {
        Self {
            answer,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for FakeMetadataSource {
    async fn fetch_store_version(&self, _app_id: &str, _timeout: Duration) -> UpdateResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.answer {
            Ok(version) if version.is_empty() => {
                Err(UpdateError::MalformedMetadata("no version in first result".into()))
            }
            Ok(version) => Ok(version.clone()),
            Err(status) => Err(UpdateError::LookupStatus(*status)),
        }
    }
}

/// Prompt that records every request and answers with a fixed decision.
pub struct RecordingPrompt {
    decision: PromptDecision,
    fail_next: AtomicBool,
    requests: Mutex<Vec<PromptRequest>>,
}

impl RecordingPrompt {
    pub fn answering(decision: PromptDecision) -> Self {
        Self {
            decision,
            fail_next: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make the next `ask` fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdatePrompt for RecordingPrompt {
    async fn ask(&self, request: PromptRequest) -> UpdateResult<PromptDecision> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(UpdateError::Presentation("no window to attach to".into()));
        }
        self.requests.lock().unwrap().push(request);
        Ok(self.decision)
    }
}

/// URL launcher that records what it opened.
pub struct RecordingLauncher {
    deep_links_supported: bool,
    fail_deep_links: bool,
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    /// `deep_links_supported` decides what `can_open` answers for
    /// non-http(s) URLs.
    pub fn new(deep_links_supported: bool) -> Self {
        Self {
            deep_links_supported,
            fail_deep_links: false,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Report deep links as openable but fail to open them.
    pub fn failing_deep_links(mut self) -> Self {
        self.fail_deep_links = true;
        self
    }

    /// URLs successfully opened, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

fn is_web(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[async_trait]
impl UrlLauncher for RecordingLauncher {
    async fn can_open(&self, url: &str) -> bool {
        is_web(url) || self.deep_links_supported
    }

    async fn open(&self, url: &str) -> UpdateResult<()> {
        if !is_web(url) && (self.fail_deep_links || !self.deep_links_supported) {
            return Err(UpdateError::Launch {
                url: url.to_string(),
                reason: "no handler".into(),
            });
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
