//! Insight generation about the group's state.
//!
//! Defines the [`InsightGenerator`] trait and the best-effort [`summarize`]
//! entry point used by the draw workflow. Insights are cosmetic: every
//! failure becomes "no insight" and never blocks a draw.
//!
//! Implementations:
//! - [`gemini::GeminiInsightGenerator`]: Google `generateContent` API
//! - [`DisabledInsights`]: always unavailable

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::http::HttpError;
use crate::participant::{AiInsight, Participant};

pub mod gemini;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an insight could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// HTTP transport failure.
    #[error("insight request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Upstream responded with an error status.
    #[error("insight service returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Response did not match the insight schema.
    #[error("insight response parse error: {0}")]
    Parse(String),
    /// The generator is not configured.
    #[error("insights unavailable: {0}")]
    Unavailable(String),
}

impl From<HttpError> for InsightError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => Self::Request(e),
            HttpError::Status { status, body } => Self::HttpStatus { status, body },
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// External service that summarizes the group.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Produce an insight for `participants`.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError`] on network, status, or schema failure.
    async fn generate(&self, participants: &[Participant]) -> Result<AiInsight, InsightError>;
}

/// Generator used when insights are switched off or lack credentials.
#[derive(Debug, Clone, Default)]
pub struct DisabledInsights;

#[async_trait]
impl InsightGenerator for DisabledInsights {
    async fn generate(&self, _participants: &[Participant]) -> Result<AiInsight, InsightError> {
        Err(InsightError::Unavailable("insights are disabled".to_owned()))
    }
}

/// Best-effort insight for `participants`.
///
/// Returns `None` for an empty group without calling the generator, and
/// `None` on any generator failure.
pub async fn summarize(
    generator: &dyn InsightGenerator,
    participants: &[Participant],
) -> Option<AiInsight> {
    if participants.is_empty() {
        debug!("no participants, skipping insight generation");
        return None;
    }

    match generator.generate(participants).await {
        Ok(insight) => Some(insight),
        Err(e) => {
            warn!(error = %e, "insight generation failed");
            None
        }
    }
}
