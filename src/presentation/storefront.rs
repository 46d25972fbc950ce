//! Opening the application's store page.
//!
//! The native deep link is tried first; when no handler can open it (or
//! opening it fails), the web page for the same listing is opened instead.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::UpdateResult;

/// Host-provided URL opener.
#[async_trait]
pub trait UrlLauncher: Send + Sync {
    /// Whether something on this device can handle `url`.
    async fn can_open(&self, url: &str) -> bool;

    async fn open(&self, url: &str) -> UpdateResult<()>;
}

/// Which URL ended up being opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorefrontTarget {
    DeepLink(String),
    Web(String),
}

/// Store detail page of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storefront {
    app_id: String,
}

impl Storefront {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self { app_id: app_id.into() }
    }

    pub fn deep_link(&self) -> String {
        format!("itms-apps://itunes.apple.com/app/id{}", self.app_id)
    }

    pub fn web_url(&self) -> String {
        format!("https://apps.apple.com/app/id{}", self.app_id)
    }

    /// Open the store page, preferring the native deep link.
    ///
    /// # Errors
    ///
    /// Returns the launcher's error if the web fallback cannot be opened
    /// either.
    pub async fn open(&self, launcher: &dyn UrlLauncher) -> UpdateResult<StorefrontTarget> {
        let deep_link = self.deep_link();
        if launcher.can_open(&deep_link).await {
            match launcher.open(&deep_link).await {
                Ok(()) => return Ok(StorefrontTarget::DeepLink(deep_link)),
                Err(error) => warn!(%error, "Deep link failed, falling back to web page"),
            }
        } else {
            debug!(url = %deep_link, "No handler for store deep link");
        }

        let web_url = self.web_url();
        launcher.open(&web_url).await?;
        Ok(StorefrontTarget::Web(web_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingLauncher;

    #[test]
    fn test_urls() {
        let storefront = Storefront::new("1234");
        assert_eq!(storefront.deep_link(), "itms-apps://itunes.apple.com/app/id1234");
        assert_eq!(storefront.web_url(), "https://apps.apple.com/app/id1234");
    }

    #[tokio::test]
    async fn test_prefers_deep_link() {
        let launcher = RecordingLauncher::new(true);
        let target = Storefront::new("1").open(&launcher).await.unwrap();

        assert_eq!(target, StorefrontTarget::DeepLink("itms-apps://itunes.apple.com/app/id1".into()));
        assert_eq!(launcher.opened(), vec!["itms-apps://itunes.apple.com/app/id1".to_string()]);
    }

    #[tokio::test]
    async fn test_falls_back_to_web() {
        let launcher = RecordingLauncher::new(false);
        let target = Storefront::new("1").open(&launcher).await.unwrap();

        assert_eq!(target, StorefrontTarget::Web("https://apps.apple.com/app/id1".into()));
        assert_eq!(launcher.opened(), vec!["https://apps.apple.com/app/id1".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_deep_link_falls_back_to_web() {
        let launcher = RecordingLauncher::new(true).failing_deep_links();
        let target = Storefront::new("9").open(&launcher).await.unwrap();

        assert_eq!(target, StorefrontTarget::Web("https://apps.apple.com/app/id9".into()));
    }
}
