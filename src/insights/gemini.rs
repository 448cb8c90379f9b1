//! Gemini insight generator using the `generateContent` API with a response
//! schema, so the reply is structured JSON rather than free text.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{InsightError, InsightGenerator};
use crate::http::check_http_response;
use crate::participant::{AiInsight, Participant};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used for insights.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// `generateContent` request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns.
    pub contents: Vec<GeminiContent>,
    /// Output constraints.
    pub generation_config: GenerationConfig,
}

/// One conversation turn.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Author role.
    #[serde(default)]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A content part; only text is used.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text payload.
    #[serde(default)]
    pub text: Option<String>,
}

/// Structured-output settings.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Always `application/json`.
    pub response_mime_type: String,
    /// Schema the reply must satisfy.
    pub response_schema: Value,
}

/// `generateContent` response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// A generated candidate.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// Candidate content.
    pub content: Option<GeminiContent>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Insight generator backed by Gemini.
#[derive(Clone)]
pub struct GeminiInsightGenerator {
    /// Model name.
    #[doc(hidden)]
    pub model: String,
    /// Base URL for the API.
    #[doc(hidden)]
    pub base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiInsightGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiInsightGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiInsightGenerator {
    /// Create a generator for `model` against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Request`] if the HTTP client cannot be built.
    pub fn new(
        model: String,
        base_url: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            client,
        })
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Schema requiring exactly the three insight string fields.
#[doc(hidden)]
pub fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "funnyFact": { "type": "STRING" },
            "recommendation": { "type": "STRING" }
        },
        "required": ["summary", "funnyFact", "recommendation"]
    })
}

/// Build the request carrying the serialized participant list.
///
/// # Errors
///
/// Returns [`InsightError::Parse`] if the participants cannot be serialized.
#[doc(hidden)]
pub fn build_request(participants: &[Participant]) -> Result<GeminiRequest, InsightError> {
    let roster =
        serde_json::to_string(participants).map_err(|e| InsightError::Parse(e.to_string()))?;
    let prompt = format!(
        "Analyze this Secret Friend group and its draws: {roster}. \
         Provide a creative summary, one funny fact based on the data, and a recommendation."
    );

    Ok(GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_owned()),
            parts: vec![GeminiPart { text: Some(prompt) }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_owned(),
            response_schema: insight_schema(),
        },
    })
}

/// Parse a `generateContent` response into an insight.
///
/// # Errors
///
/// Returns [`InsightError::Parse`] when there is no candidate text or the
/// text is not a JSON object with all three fields.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<AiInsight, InsightError> {
    let resp: GeminiResponse =
        serde_json::from_str(body).map_err(|e| InsightError::Parse(e.to_string()))?;

    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .ok_or_else(|| InsightError::Parse("response has no candidates".to_owned()))?;

    serde_json::from_str(text.trim()).map_err(|e| InsightError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl InsightGenerator for GeminiInsightGenerator {
    async fn generate(&self, participants: &[Participant]) -> Result<AiInsight, InsightError> {
        let api_request = build_request(participants)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }
}
