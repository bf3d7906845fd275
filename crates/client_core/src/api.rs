//! HTTP boundary to the resume question answering backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ErrorBody,
    protocol::{
        AckResponse, ChatRequest, ChatResponse, SampleQuestionsResponse, SystemStatus,
        UploadResponse, CHAT_PATH, INITIALIZE_PATH, RESET_PATH, SAMPLE_QUESTIONS_PATH,
        STATUS_PATH, UPLOAD_FIELD, UPLOAD_PATH,
    },
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

const PDF_MIME: &str = "application/pdf";

#[async_trait]
pub trait ResumeApi: Send + Sync {
    async fn status(&self) -> Result<SystemStatus, ClientError>;
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ClientError>;
    async fn initialize(&self, force_reload: bool) -> Result<AckResponse, ClientError>;
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, ClientError>;
    async fn reset(&self) -> Result<AckResponse, ClientError>;
    async fn sample_questions(&self) -> Result<Vec<String>, ClientError>;
}

#[derive(Debug, Clone)]
enum UploadSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A document picked by the user for upload.
///
/// Path-backed files are read lazily, so a rejected file is never touched on disk.
#[derive(Debug, Clone)]
pub struct UploadFile {
    file_name: String,
    source: UploadSource,
}

impl UploadFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source: UploadSource::Bytes(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            file_name,
            source: UploadSource::Path(path),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            UploadSource::Path(path) => Some(path),
            UploadSource::Bytes(_) => None,
        }
    }

    /// Case-insensitive `.pdf` suffix check on the file name.
    pub fn is_pdf(&self) -> bool {
        self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_raw()
            .unwrap_or(PDF_MIME)
            .to_string()
    }

    async fn into_bytes(self) -> Result<Vec<u8>, ClientError> {
        match self.source {
            UploadSource::Bytes(bytes) => Ok(bytes),
            UploadSource::Path(path) => tokio::fs::read(&path).await.map_err(|err| {
                ClientError::Validation(format!("Could not read {}: {err}", path.display()))
            }),
        }
    }
}

pub struct HttpResumeApi {
    http: Client,
    base_url: String,
}

impl HttpResumeApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ClientError::Validation(format!("invalid API base URL: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Validation(format!(
                "unsupported API base URL scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Decode a JSON body, or turn a non-2xx answer into a [`ClientError`].
///
/// Error bodies with a `detail` become [`ClientError::Backend`]; anything else is
/// reported as a transport failure described by `describe_status`.
async fn decode<T: DeserializeOwned>(
    response: Response,
    describe_status: impl FnOnce(u16) -> String,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.bytes().await.unwrap_or_default();
    match ErrorBody::from_slice(&body).and_then(|body| body.message()) {
        Some(message) => Err(ClientError::backend(Some(status.as_u16()), message)),
        None => Err(ClientError::Transport(describe_status(status.as_u16()))),
    }
}

fn api_error(code: u16) -> String {
    format!("API Error: {code}")
}

#[async_trait]
impl ResumeApi for HttpResumeApi {
    async fn status(&self) -> Result<SystemStatus, ClientError> {
        let response = self.http.get(self.endpoint(STATUS_PATH)).send().await?;
        decode(response, api_error).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ClientError> {
        debug!(
            context_chunks = request.context_chunks,
            chars = request.message.len(),
            "posting chat message"
        );
        let response = self
            .http
            .post(self.endpoint(CHAT_PATH))
            .json(&request)
            .send()
            .await?;
        decode(response, api_error).await
    }

    async fn initialize(&self, force_reload: bool) -> Result<AckResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint(INITIALIZE_PATH))
            .query(&[("force_reload", force_reload)])
            .send()
            .await?;
        decode(response, api_error).await
    }

    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, ClientError> {
        let file_name = file.file_name().to_string();
        let mime = file.mime_type();
        let bytes = file.into_bytes().await?;
        debug!(file = %file_name, bytes = bytes.len(), "uploading resume");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);
        let response = self
            .http
            .post(self.endpoint(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;
        decode(response, |code| format!("Upload failed: {code}")).await
    }

    async fn reset(&self) -> Result<AckResponse, ClientError> {
        let response = self.http.delete(self.endpoint(RESET_PATH)).send().await?;
        decode(response, api_error).await
    }

    async fn sample_questions(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(SAMPLE_QUESTIONS_PATH))
            .send()
            .await?;
        let questions: SampleQuestionsResponse = decode(response, api_error).await?;
        Ok(questions.into_questions())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
