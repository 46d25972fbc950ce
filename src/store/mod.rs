//! Version sources for the remote-check flow.
//!
//! The remote-check flow compares two versions: the one installed on this
//! device ([`InstalledVersionSource`], answered locally) and the one
//! published in the store ([`MetadataSource`], answered over the network).
//! [`AppStoreLookup`] is the HTTP implementation of the latter.

pub mod lookup;

use async_trait::async_trait;
use std::time::Duration;

use crate::core::UpdateResult;
pub use lookup::{AppStoreLookup, DEFAULT_LOOKUP_ENDPOINT, LookupResponse, LookupResult};

/// Source of the version currently published in the store.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the published version for `app_id`, giving up after `timeout`.
    ///
    /// Any response that does not carry a version is an
    /// [`UpdateError::MalformedMetadata`](crate::core::UpdateError::MalformedMetadata).
    async fn fetch_store_version(&self, app_id: &str, timeout: Duration) -> UpdateResult<String>;
}

/// Source of the installed application's version. Never touches the network.
#[async_trait]
pub trait InstalledVersionSource: Send + Sync {
    async fn installed_version(&self) -> UpdateResult<String>;
}

/// An installed version known up front, e.g. passed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInstalledVersion(pub String);

impl FixedInstalledVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }
}

#[async_trait]
impl InstalledVersionSource for FixedInstalledVersion {
    async fn installed_version(&self) -> UpdateResult<String> {
        Ok(self.0.clone())
    }
}
