/// Generation client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: no other module may call the generation service
/// directly. All resume text MUST come through this module.
///
/// One outbound request per `generate` call: no retry, no caching, no
/// deduplication of identical prompts. Every failure is terminal for the
/// attempt; recovery is caller-initiated.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for resume generation.
pub const MODEL: &str = "gemini-2.0-flash";
/// Stands in for a successful response that carries no extractable text.
/// This is valid content, not an error — callers must treat it as such.
pub const NO_RESPONSE_FALLBACK: &str = "No response from AI.";
const GENERIC_SERVICE_ERROR: &str = "Failed to generate resume";

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service accepted the request at the transport level but rejected it.
    #[error("generation service error: {message}")]
    Service { message: String },

    /// Network failure, timeout, or an undecodable response body.
    #[error("generation transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response envelope. Every field on the extraction path is optional; any
/// missing link resolves to `NO_RESPONSE_FALLBACK` rather than an error.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, verbatim — no trimming,
    /// no markup conversion. Falls back when any link in the path is absent.
    pub fn resume_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
}

/// Seam between the session controller and the generation service, so the
/// controller can be exercised without the network.
#[async_trait]
pub trait ResumeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// The single generation client used by the resume workflow.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl ResumeGenerator for GeminiClient {
    /// Makes exactly one call to the generation endpoint.
    ///
    /// The API key travels as a URL query parameter — that is the service's
    /// authentication contract, not ours to validate or rotate.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!(
            "{GEMINI_API_BASE}/{MODEL}:generateContent?key={}",
            self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| GENERIC_SERVICE_ERROR.to_string());
            return Err(GenerationError::Service { message });
        }

        let envelope: GenerateContentResponse = response.json().await?;
        let text = envelope.resume_text();

        debug!("Generation call succeeded: {} chars", text.len());

        Ok(text)
    }
}
