//! reqwest-backed store

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::backend::{ActivityKey, BackendConfig, FetchOutcome, SpreadsheetStore};
use crate::error::{BridgeError, BridgeResult};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const UPLOAD_FIELD: &str = "excelFile";
const UPLOAD_FILE_NAME: &str = "spreadsheet.xlsx";

/// HTTP client for the save endpoint
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    config: BackendConfig,
}

impl HttpStore {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[async_trait]
impl SpreadsheetStore for HttpStore {
    async fn fetch(&self, key: &ActivityKey) -> BridgeResult<FetchOutcome> {
        let url = self.config.save_url();
        debug!(%url, activity = %key.activity_id, user = %key.user_id, "fetching saved spreadsheet");

        let result = self
            .client
            .get(&url)
            .query(&[
                ("activityId", key.activity_id.as_str()),
                ("userId", key.user_id.as_str()),
            ])
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                warn!(%url, error = %e, "backend unreachable");
                return Ok(FetchOutcome::Unreachable(e.to_string()));
            }
            Err(e) => return Err(transport_failure(e)),
        };

        match response.status() {
            StatusCode::NOT_FOUND => Ok(FetchOutcome::NotFound),
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(transport_failure)?;
                debug!(bytes = bytes.len(), "fetched saved spreadsheet");
                Ok(FetchOutcome::Found(bytes.to_vec()))
            }
            _ => Err(failure_from_response(response).await),
        }
    }

    async fn upload(&self, key: &ActivityKey, bytes: Vec<u8>) -> BridgeResult<String> {
        let url = self.config.save_url();
        debug!(%url, bytes = bytes.len(), "uploading spreadsheet");

        let part = Part::bytes(bytes)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(XLSX_MIME)
            .map_err(transport_failure)?;
        let form = Form::new()
            .text("activityId", key.activity_id.clone())
            .text("userId", key.user_id.clone())
            .part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        response.text().await.map_err(transport_failure)
    }
}

fn transport_failure(e: reqwest::Error) -> BridgeError {
    BridgeError::BackendFailure {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

/// Error status → failure carrying the body's `error` field, else the reason phrase
async fn failure_from_response(response: Response) -> BridgeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BridgeError::BackendFailure {
        status: Some(status.as_u16()),
        message: error_message(status, &body),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string()
        })
}
