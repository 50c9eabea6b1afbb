//! Relay wire contract and HTTP client.
//!
//! DESIGN
//! ======
//! The relay server deserializes these bodies; the CLI and the protocol
//! server send them through [`RelayClient`]. JSON field names are camelCase.
//! Missing optional fields take the same defaults the relay applies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::paper::{
    DEFAULT_CHAT_TEMPERATURE, DEFAULT_TEMPERATURE, GenerationRequest, PaperMetadata, QuestionRequest, StyleFlags,
    WritingStyle,
};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:8080";
pub const API_KEY_HEADER: &str = "X-API-Key";
pub const SERVICE_NAME: &str = "obsixiv-agent";
pub const DEFAULT_PDF_FILENAME: &str = "document.pdf";

/// Generation can take a while on slow providers; leave headroom over the
/// relay's own provider timeout.
const RELAY_TIMEOUT_SECS: u64 = 180;

// =============================================================================
// WIRE TYPES
// =============================================================================

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_chat_temperature() -> f64 {
    DEFAULT_CHAT_TEMPERATURE
}

fn default_true() -> bool {
    true
}

fn default_pdf_filename() -> String {
    DEFAULT_PDF_FILENAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub pdf_content: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_true")]
    pub include_emojis: bool,
    #[serde(default = "default_true")]
    pub include_humor: bool,
    #[serde(default)]
    pub custom_prompt: String,
    #[serde(default)]
    pub writing_style: WritingStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_metadata: Option<PaperMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracted_images: Vec<String>,
}

impl From<GenerateBody> for GenerationRequest {
    fn from(body: GenerateBody) -> Self {
        Self {
            paper_text: body.pdf_content,
            temperature: body.temperature,
            flags: StyleFlags { include_emojis: body.include_emojis, include_humor: body.include_humor },
            custom_prompt: body.custom_prompt,
            writing_style: body.writing_style,
            figures: body.extracted_images,
            metadata: body.arxiv_metadata,
        }
    }
}

impl From<&GenerationRequest> for GenerateBody {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            pdf_content: request.paper_text.clone(),
            temperature: request.temperature,
            include_emojis: request.flags.include_emojis,
            include_humor: request.flags.include_humor,
            custom_prompt: request.custom_prompt.clone(),
            writing_style: request.writing_style,
            arxiv_metadata: request.metadata.clone(),
            extracted_images: request.figures.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub blog_post: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub pdf_content: String,
    pub question: String,
    #[serde(default = "default_chat_temperature")]
    pub temperature: f64,
}

impl From<ChatBody> for QuestionRequest {
    fn from(body: ChatBody) -> Self {
        Self { pdf_content: body.pdf_content, question: body.question, temperature: body.temperature }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPdfBody {
    pub pdf_base64: String,
    #[serde(default = "default_pdf_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractPdfResponse {
    pub text: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `{error, success:false}` body of a failed relay call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Request(String),
    /// The relay answered with an error body.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("relay returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("relay response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

pub struct RelayClient {
    http: reqwest::Client,
    base: String,
}

impl RelayClient {
    /// Client for the relay at `base` (e.g. `http://localhost:8080`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base: &str) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(RELAY_TIMEOUT_SECS))
            .build()
            .map_err(|e| RelayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base: base.trim_end_matches('/').to_string() })
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `POST /api/v1/generate`.
    ///
    /// # Errors
    ///
    /// Transport failures and relay error bodies.
    pub async fn generate(&self, api_key: &str, body: &GenerateBody) -> Result<String, RelayError> {
        let response: GenerateResponse = self.post("/api/v1/generate", Some(api_key), body).await?;
        Ok(response.blog_post)
    }

    /// `POST /api/v1/chat`.
    ///
    /// # Errors
    ///
    /// Transport failures and relay error bodies.
    pub async fn chat(&self, api_key: &str, body: &ChatBody) -> Result<String, RelayError> {
        let response: ChatResponse = self.post("/api/v1/chat", Some(api_key), body).await?;
        Ok(response.answer)
    }

    /// `POST /api/v1/extract-pdf`.
    ///
    /// # Errors
    ///
    /// Transport failures and relay error bodies.
    pub async fn extract_pdf(&self, body: &ExtractPdfBody) -> Result<String, RelayError> {
        let response: ExtractPdfResponse = self.post("/api/v1/extract-pdf", None, body).await?;
        Ok(response.text)
    }

    /// `GET /api/v1/health`.
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses.
    pub async fn health(&self) -> Result<HealthResponse, RelayError> {
        let response = self
            .http
            .get(format!("{}/api/v1/health", self.base))
            .send()
            .await
            .map_err(|e| RelayError::Request(e.to_string()))?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, api_key: Option<&str>, body: &B) -> Result<T, RelayError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let mut request = self.http.post(format!("{}{path}", self.base)).json(body);
        if let Some(key) = api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request.send().await.map_err(|e| RelayError::Request(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, RelayError> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(|e| RelayError::Request(e.to_string()))?;
    if !(200..300).contains(&status) {
        return Err(failure(status, text));
    }
    serde_json::from_str(&text).map_err(|e| RelayError::Parse(e.to_string()))
}

fn failure(status: u16, body: String) -> RelayError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => RelayError::Rejected { status, message: err.error },
        Err(_) => RelayError::Status { status, body },
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
