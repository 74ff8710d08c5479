//! Transport to the hosted generative model.
//!
//! [`GenerativeClient`] is the seam between the plan service and the
//! network. [`GeminiClient`] maps a [`GenerationRequest`] onto the Gemini
//! REST `generateContent` call; tests substitute their own implementation.

use std::borrow::Cow;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plan::request::{Contents, GenerationRequest, Part};

/// Base URL of the public Gemini API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Errors raised by a transport. Propagated to callers unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generative API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response from generative API: {0}")]
    InvalidResponse(String),
}

/// Issues one generation request and returns the model's text, if any.
///
/// Implementations must perform exactly one remote call per invocation and
/// must not retry. `Ok(None)` means the call succeeded but carried no text.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, ClientError>;
}

// ---------------------------------------------------------------------------
// Gemini REST wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<WireContent<'a>>,
    system_instruction: WireContent<'a>,
    generation_config: WireGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Cow<'a, Part>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        let parts = match &request.contents {
            Contents::Text(text) => vec![Cow::Owned(Part::Text(text.clone()))],
            Contents::Parts { parts } => parts.iter().map(Cow::Borrowed).collect(),
        };
        Self {
            contents: vec![WireContent {
                role: Some("user"),
                parts,
            }],
            system_instruction: WireContent {
                role: None,
                parts: vec![Cow::Owned(Part::Text(
                    request.config.system_instruction.clone(),
                ))],
            },
            generation_config: WireGenerationConfig {
                response_mime_type: &request.config.response_mime_type,
                response_schema: &request.config.response_schema,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` when it has none.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

// ---------------------------------------------------------------------------
// Gemini client
// ---------------------------------------------------------------------------

/// REST client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GeminiClient {
    /// Create a client against `endpoint` (scheme + host, no trailing path).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        )
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, ClientError> {
        let url = self.url_for(&request.model);
        let body = GenerateContentBody::from_request(request);

        tracing::debug!(url = %url, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, credential)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(error = %e, "failed to read error response body");
                    format!("<unreadable body: {e}>")
                }
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(parsed.text())
    }
}
