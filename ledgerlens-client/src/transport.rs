//! Transport for the remote analysis operation.
//!
//! `AnalysisTransport` is the seam between the controller and the network so
//! the life-cycle can be driven by a mock in tests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use ledgerlens_core::CandidateFile;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every document goes into the form under this one repeated field.
pub const FILES_FIELD: &str = "files";

/// Status and body of an analysis call, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The request never produced a response (connect, TLS, body read...).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Send the whole batch as one request and return the raw response.
    async fn analyze(&self, files: &[CandidateFile]) -> Result<RawResponse, TransportError>;
}

/// Where the analysis service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub analyze_path: String,
    pub health_path: String,
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            analyze_path: "/api/analyze".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

impl ServiceEndpoint {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn analyze_url(&self) -> String {
        self.url(&self.analyze_path)
    }

    pub fn health_url(&self) -> String {
        self.url(&self.health_path)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Production transport: multipart POST with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: ServiceEndpoint,
}

impl ReqwestTransport {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Use a preconfigured client (proxy, TLS, default headers).
    pub fn with_client(client: reqwest::Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    /// Ask the service's health route whether it is up.
    pub async fn health(&self, timeout: Duration) -> Result<HealthStatus> {
        let url = self.endpoint.health_url();
        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("health check failed: {status} {txt}");
        }
        resp.json().await.context("parse health response")
    }
}

/// The document's bytes as a request body, sharing the buffer instead of copying it.
fn shared_body(f: &CandidateFile) -> Bytes {
    Bytes::from_owner(Arc::clone(f.contents()))
}

/// One part per document, all under `FILES_FIELD`, in batch order.
pub fn build_form(files: &[CandidateFile]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for f in files {
        let part = Part::stream_with_length(shared_body(f), f.size())
            .file_name(f.name().to_string())
            .mime_str(f.media_type())
            .map_err(|e| TransportError(format!("invalid media type for {}: {e}", f.name())))?;
        form = form.part(FILES_FIELD, part);
    }
    Ok(form)
}

#[async_trait]
impl AnalysisTransport for ReqwestTransport {
    #[tracing::instrument(skip(self, files), fields(files = files.len()))]
    async fn analyze(&self, files: &[CandidateFile]) -> Result<RawResponse, TransportError> {
        let url = self.endpoint.analyze_url();
        let bytes: u64 = files.iter().map(|f| f.size()).sum();
        tracing::debug!(url = %url, bytes, "posting analysis request");

        let form = build_form(files)?;
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "analysis request failed");
                TransportError::from(e)
            })?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        tracing::info!(status, response_len = body.len(), "analysis request completed");
        Ok(RawResponse { status, body })
    }
}
