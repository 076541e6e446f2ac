//! Sequential submission of prepared rows to the creation endpoint

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::import::report::{ImportOutcome, ImportReport};
use crate::import::transform::{PreparedRow, TransformedRecord};

/// Message used when the server rejects a row without a readable reason
pub const DEFAULT_REJECTION_MESSAGE: &str = "导入失败";

/// Why one create request did not succeed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The API answered with a non-2xx status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No response was received
    #[error("网络错误: {0}")]
    Network(String),
}

/// Something that can create one record at an endpoint
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn create(&self, endpoint: &str, record: &TransformedRecord) -> Result<(), SubmitError>;
}

/// Posts records as JSON to the achievement API
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSubmitter {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn create(&self, endpoint: &str, record: &TransformedRecord) -> Result<(), SubmitError> {
        let mut request = self.client.post(self.url(endpoint)).json(record);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body),
        })
    }
}

/// Extract the server's reason from an error body
///
/// The API reports errors as `{"detail": ...}`. String details are used
/// verbatim, structured ones (validation error lists) are shown as compact
/// JSON.
pub fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => match obj.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(Value::Null) | Some(Value::String(_)) | None => {
                DEFAULT_REJECTION_MESSAGE.to_string()
            }
            Some(other) => other.to_string(),
        },
        _ => DEFAULT_REJECTION_MESSAGE.to_string(),
    }
}

/// Submits prepared rows one at a time and tallies the outcomes
pub struct Driver<S> {
    submitter: S,
}

impl<S: Submitter> Driver<S> {
    pub fn new(submitter: S) -> Self {
        Self { submitter }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub async fn run(
        &self,
        endpoint: &str,
        rows: &[PreparedRow],
        cancel: &CancellationToken,
    ) -> ImportReport {
        self.run_with(endpoint, rows, cancel, |_, _| {}).await
    }

    /// Like [`Driver::run`], calling `on_outcome` after each attempted row
    ///
    /// Each request completes before the next starts. A failed row never
    /// stops the run; only `cancel` does, and only between rows.
    pub async fn run_with<F>(
        &self,
        endpoint: &str,
        rows: &[PreparedRow],
        cancel: &CancellationToken,
        mut on_outcome: F,
    ) -> ImportReport
    where
        F: FnMut(usize, &ImportOutcome),
    {
        let mut report = ImportReport::default();

        for (idx, row) in rows.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(remaining = rows.len() - idx, "import cancelled");
                report.mark_cancelled(rows.len() - idx);
                break;
            }

            let outcome = self.submit_row(endpoint, row).await;
            on_outcome(row.row_number, &outcome);
            report.record(&outcome);
        }

        report
    }

    async fn submit_row(&self, endpoint: &str, row: &PreparedRow) -> ImportOutcome {
        let result = match &row.payload {
            Ok(record) => self
                .submitter
                .create(endpoint, record)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => {
                debug!(row = row.row_number, endpoint, "row imported");
                ImportOutcome::Success
            }
            Err(message) => {
                warn!(row = row.row_number, error = %message, "row failed");
                ImportOutcome::Failure(format!("第{}行: {}", row.row_number, message))
            }
        }
    }
}
