use serde::{Deserialize, Serialize};

/// Default backend origin
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Endpoint serving both the saved-file lookup and uploads
pub const DEFAULT_SAVE_PATH: &str = "/activity/spreadsheets/save";

/// Where the backend lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub save_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            save_path: DEFAULT_SAVE_PATH.to_string(),
        }
    }
}

impl BackendConfig {
    /// Default endpoint path on another origin
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Absolute URL of the save endpoint
    pub fn save_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.save_path.trim_start_matches('/')
        )
    }
}
