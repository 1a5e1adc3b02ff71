use crate::config::ScopeConfig;
use crate::error::ReportError;
use crate::payload::{self, ServerRecord};
use chrono::{DateTime, Local};
use reqwest::{Client, Url};
use std::time::Instant;
use tracing::debug;

/// A decoded record plus when it arrived.
#[derive(Debug, Clone)]
pub struct FetchedReport {
    pub server_id: String,
    pub record: ServerRecord,
    pub fetched_at: DateTime<Local>,
}

/// Issues one GET per call against `{api_base_url}/server-data/{id}`.
/// No retries and no timeout.
#[derive(Clone)]
pub struct ServerDataClient {
    base_url: String,
    client: Client,
}

impl ServerDataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ScopeConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL. The id is trimmed, must be non-empty, and is
    /// percent-encoded as a single path segment.
    pub fn server_url(&self, server_id: &str) -> Result<Url, ReportError> {
        let server_id = normalize_server_id(server_id)?;

        let mut url = Url::parse(self.base_url.trim_end_matches('/')).map_err(|e| {
            ReportError::FetchFailed(format!("invalid API URL {:?}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ReportError::FetchFailed(format!("API URL {:?} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push("server-data")
            .push(server_id);
        Ok(url)
    }

    pub async fn fetch_record(&self, server_id: &str) -> Result<ServerRecord, ReportError> {
        let url = self.server_url(server_id)?;
        let start_time = Instant::now();
        debug!(%url, "fetching server data");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ReportError::FetchFailed(e.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReportError::FetchFailed(format!(
                "API error: {} - Body: {}",
                status,
                error_text.trim()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ReportError::FetchFailed(e.to_string()))?;
        debug!(
            %url,
            %status,
            bytes = text.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "server data received"
        );

        payload::parse_response(&text)
    }

    pub async fn fetch_report(&self, server_id: &str) -> Result<FetchedReport, ReportError> {
        let record = self.fetch_record(server_id).await?;
        Ok(FetchedReport {
            server_id: server_id.trim().to_string(),
            record,
            fetched_at: Local::now(),
        })
    }
}

pub fn normalize_server_id(server_id: &str) -> Result<&str, ReportError> {
    let trimmed = server_id.trim();
    if trimmed.is_empty() {
        Err(ReportError::MissingServerId)
    } else {
        Ok(trimmed)
    }
}
