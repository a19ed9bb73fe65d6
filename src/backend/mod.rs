//! Backend persistence of spreadsheet files
//!
//! One saved file exists per (activity, user) pair. A missing file is an
//! ordinary outcome, not an error: the caller starts from an empty widget.

pub mod config;
mod http;

pub use config::BackendConfig;
pub use http::HttpStore;

use async_trait::async_trait;

use crate::error::BridgeResult;

/// Identifies the saved spreadsheet of one user in one activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityKey {
    pub activity_id: String,
    pub user_id: String,
}

impl ActivityKey {
    pub fn new(activity_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Result of looking up a saved file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The saved `.xlsx` bytes
    Found(Vec<u8>),
    NotFound,
    /// The backend could not be reached at all
    Unreachable(String),
}

/// Transport for saved spreadsheet files
#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    /// Fetch the saved file for `key`.
    ///
    /// Status codes other than success and not-found are `BackendFailure`.
    async fn fetch(&self, key: &ActivityKey) -> BridgeResult<FetchOutcome>;

    /// Upload a file for `key`, returning the backend's response body
    async fn upload(&self, key: &ActivityKey, bytes: Vec<u8>) -> BridgeResult<String>;
}
