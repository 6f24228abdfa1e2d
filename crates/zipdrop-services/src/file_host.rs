//! One-time-link file host client.
//!
//! The host answers with JSON on success but may answer with HTML (or
//! anything else) on failure, so the body is always read as text first and
//! decoded second.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use zipdrop_core::UpstreamFailure;

const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Destination for finished archives.
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Upload `archive` as `file_name` and return the download link.
    async fn upload(&self, archive: Vec<u8>, file_name: &str) -> Result<String, UpstreamFailure>;
}

/// Client for file.io and hosts speaking the same protocol.
#[derive(Debug, Clone)]
pub struct FileIoClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl FileIoClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for file host")?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl FileHost for FileIoClient {
    async fn upload(&self, archive: Vec<u8>, file_name: &str) -> Result<String, UpstreamFailure> {
        let archive_bytes = archive.len();
        let part = reqwest::multipart::Part::bytes(archive)
            .file_name(file_name.to_string())
            .mime_str(ARCHIVE_CONTENT_TYPE)
            .map_err(|e| {
                UpstreamFailure::new("Failed to build file host request").with_details(e.to_string())
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::debug!(endpoint = %self.endpoint, archive_bytes, "Uploading archive to file host");

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                UpstreamFailure::new("Failed to reach file host").with_details(e.to_string())
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            UpstreamFailure::new("Failed to read file host response")
                .with_status(status)
                .with_content_type(content_type.clone())
                .with_details(e.to_string())
        })?;

        interpret_response(status, content_type, &body)
    }
}

/// Usable link at `link` or `data.link`.
fn extract_link(value: &Value) -> Option<&str> {
    let top_level = value.get("link");
    let nested = value.get("data").and_then(|data| data.get("link"));

    [top_level, nested]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|link| !link.is_empty())
}

/// Turn a raw file host response into a link or a diagnosable failure.
pub fn interpret_response(
    status: u16,
    content_type: Option<String>,
    body: &str,
) -> Result<String, UpstreamFailure> {
    let decoded = serde_json::from_str::<Value>(body).ok();

    if !(200..300).contains(&status) {
        let mut failure = UpstreamFailure::new("File host upload failed")
            .with_status(status)
            .with_content_type(content_type)
            .with_body_preview(body);
        if let Some(raw) = decoded {
            failure = failure.with_raw(raw);
        }
        return Err(failure);
    }

    let Some(decoded) = decoded else {
        return Err(UpstreamFailure::new("File host returned a non-JSON response")
            .with_status(status)
            .with_content_type(content_type)
            .with_body_preview(body));
    };

    match extract_link(&decoded) {
        Some(link) => Ok(link.to_string()),
        None => Err(UpstreamFailure::new("File host response did not include a link")
            .with_status(status)
            .with_content_type(content_type)
            .with_body_preview(body)
            .with_raw(decoded)),
    }
}
