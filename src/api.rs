use anyhow::{anyhow, bail, Context};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BackendConfig;

pub const UPLOAD_FAILED: &str = "Upload failed";
pub const CHAT_FAILED: &str = "Chat request failed";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Citation {
    pub filename: String,
    pub page: u32,
    pub text_snippet: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    General,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub intent: Intent,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
    pub message: String,
    pub chunks_processed: u64,
    #[allow(dead_code)]
    #[serde(default)]
    pub doc_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// A document on disk, described well enough to show before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub path: PathBuf,
}

impl DocumentFile {
    pub fn from_path(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if !metadata.is_file() {
            bail!("{} is not a file", path.display());
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
        let mime_type = mime_guess::from_path(&path).first_or_octet_stream().to_string();

        Ok(DocumentFile {
            name,
            size: metadata.len(),
            mime_type,
            path,
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("no document to upload")]
    EmptyFile,
    #[error("message is empty")]
    EmptyMessage,
    #[error("invalid mime type {0}")]
    MimeType(String),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },
    #[error("rejected ({status}): {detail}")]
    Validation { status: u16, detail: String },
    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },
    #[error("backend unreachable: {0}")]
    Network(Arc<reqwest::Error>),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable reason reported by the backend, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Validation { detail, .. } | ApiError::Server { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(Arc::new(e))
    }
}

/// Pulls `detail` out of an error body. FastAPI sends either a string or a
/// list of validation records with a `msg` each.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()));
    }

    let detail = extract_detail(&body).unwrap_or_else(|| fallback.to_string());
    tracing::warn!(status = status.as_u16(), %detail, "backend returned an error");

    if status.is_client_error() {
        Err(ApiError::Validation {
            status: status.as_u16(),
            detail,
        })
    } else {
        Err(ApiError::Server {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Stateless client for the two backend operations. Cloning is cheap and
/// clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    api_root: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(api_root: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            api_root: api_root.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn with_config(config: &BackendConfig) -> reqwest::Result<Self> {
        Self::new(config.api_root(), config.timeout())
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub async fn submit_document(&self, file: &DocumentFile) -> Result<UploadReceipt, ApiError> {
        if file.size == 0 {
            return Err(ApiError::EmptyFile);
        }

        let bytes = tokio::fs::read(&file.path).await.map_err(|e| ApiError::Io {
            path: file.path.clone(),
            source: Arc::new(e),
        })?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyFile);
        }

        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|_| ApiError::MimeType(file.mime_type.clone()))?;
        let form = Form::new().part("file", part);

        let url = format!("{}/documents/upload", self.api_root);
        tracing::debug!(%url, name = %file.name, size = file.size, "uploading document");

        let response = self.client.post(&url).multipart(form).send().await?;
        read_json(response, UPLOAD_FAILED).await
    }

    pub async fn submit_message(&self, text: &str) -> Result<ChatReply, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::EmptyMessage);
        }

        let url = format!("{}/chat/", self.api_root);
        tracing::debug!(%url, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message: text })
            .send()
            .await?;
        read_json(response, CHAT_FAILED).await
    }
}
