//! Backend transport. The only module that talks HTTP.
//!
//! `ResumeBackend` is the seam: the controller holds an `Arc<dyn ResumeBackend>`
//! so tests can script replies, while `HttpBackend` speaks to the real server.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart::Form, Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::download::FileType;
use crate::errors::ClientError;
use crate::models::Submission;

const UNKNOWN_FAILURE: &str = "Unknown error";

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Raw answer to the create request, before the body is parsed.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Bytes,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON body of the create endpoint.
///
/// Only `success`, `message` and `timestamp` are interpreted here; `files`,
/// `analysis` and anything else are passed through to the results display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubmitResponse {
    /// Parses a reply body. The backend answers failures with a JSON body and
    /// a 4xx/5xx status, so the status only matters when the body is not JSON.
    pub fn from_reply(reply: &Reply) -> Result<Self, ClientError> {
        match serde_json::from_slice::<SubmitResponse>(&reply.body) {
            Ok(response) => Ok(response),
            Err(_) if !reply.is_success() => Err(ClientError::Status {
                status: reply.status,
                message: String::from_utf8_lossy(&reply.body).trim().to_string(),
            }),
            Err(e) => Err(ClientError::Parse(e)),
        }
    }

    /// `Ok(self)` on `success: true`, otherwise the backend's message as an error.
    pub fn into_result(self) -> Result<Self, ClientError> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .message
            .or(self.error)
            .unwrap_or_else(|| UNKNOWN_FAILURE.to_string());
        Err(ClientError::Rejected(message))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeBackend: Send + Sync {
    /// Sends the full field mapping. Resolves as soon as a response arrives.
    async fn create_resume(&self, submission: &Submission) -> Result<Reply, ClientError>;

    /// Fetches one generated file. Non-2xx statuses are errors.
    async fn fetch_file(&self, timestamp: &str, file_type: FileType) -> Result<Bytes, ClientError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HttpBackend
// ────────────────────────────────────────────────────────────────────────────

/// reqwest-backed transport. No timeout beyond reqwest's defaults.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    submit_path: Vec<String>,
}

impl HttpBackend {
    /// `submit_path` is `/create_resume` or `/generate` depending on deployment.
    pub fn new(base_url: &str, submit_path: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::builder().build()?,
            base_url: parsed,
            submit_path: submit_path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.api_url, &config.submit_path)
    }

    /// Appends path segments to the base URL, keeping any base path prefix.
    fn endpoint<I>(&self, segments: I) -> Result<Url, ClientError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

#[async_trait]
impl ResumeBackend for HttpBackend {
    async fn create_resume(&self, submission: &Submission) -> Result<Reply, ClientError> {
        let url = self.endpoint(&self.submit_path)?;

        let form = submission
            .form_pairs()
            .fold(Form::new(), |form, (key, value)| form.text(key, value.to_string()));

        debug!(%url, "posting resume submission");
        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "create response received");

        Ok(Reply { status, body })
    }

    async fn fetch_file(&self, timestamp: &str, file_type: FileType) -> Result<Bytes, ClientError> {
        let url = self.endpoint(["download", timestamp, file_type.token()])?;

        debug!(%url, "requesting download");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("download of {file_type} for {timestamp} returned {status}");
            let message = match body.trim() {
                "" => "Download failed".to_string(),
                text => text.to_string(),
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}
