use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No data to export")]
    NoData,

    #[error("No range selected")]
    NoSelection,

    #[error("Malformed range: {0}")]
    MalformedRange(String),

    #[error("Invalid sheet: {0}")]
    InvalidSheet(String),

    #[error("Activity ID and User ID are required")]
    MissingIdentifiers,

    #[error("Backend failure{}: {message}", status_suffix(.status))]
    BackendFailure {
        status: Option<u16>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl BridgeError {
    /// True for errors that come from the caller's data rather than the environment.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BridgeError::NoData
                | BridgeError::NoSelection
                | BridgeError::MalformedRange(_)
                | BridgeError::MissingIdentifiers
        )
    }
}

impl From<rust_xlsxwriter::XlsxError> for BridgeError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        BridgeError::Serialization(e.to_string())
    }
}

impl From<calamine::XlsxError> for BridgeError {
    fn from(e: calamine::XlsxError) -> Self {
        BridgeError::Serialization(e.to_string())
    }
}
