//! Participant store contract.
//!
//! Defines the [`ParticipantStore`] trait consumed by the draw workflow and
//! the shared [`StoreError`] type.
//!
//! Two stores are implemented:
//! - [`rest::RestStore`]: PostgREST table over HTTP
//! - [`memory::InMemoryStore`]: process-local table, used offline and in tests
//!
//! Column-name aliases are resolved once, in [`row`].

use async_trait::async_trait;

use crate::http::HttpError;
use crate::participant::Participant;

pub mod memory;
pub mod rest;
pub mod row;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by participant stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("participant store unreachable: {0}")]
    Network(#[from] reqwest::Error),
    /// The store answered with an error status.
    #[error("participant store returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// The store answered with data we could not read.
    #[error("participant store response parse error: {0}")]
    Parse(String),
    /// The store refused the assignment write.
    #[error("assignment write rejected: {0}")]
    WriteRejected(String),
    /// Another participant already claims this recipient.
    #[error("recipient {0:?} is already assigned to another participant")]
    RecipientTaken(String),
}

impl StoreError {
    /// Whether the store refused a write, as opposed to failing to answer.
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::WriteRejected(_) | Self::RecipientTaken(_))
    }
}

impl From<HttpError> for StoreError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => Self::Network(e),
            HttpError::Status { status, body } => Self::HttpStatus { status, body },
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Remote table of participants.
///
/// Implementations must be `Send + Sync` so one store can be shared by the
/// draw workflow and background refreshes.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Fetch every participant row, normalized to the canonical shape.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unreachable or the rows
    /// cannot be read.
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError>;

    /// Record that `participant_id` drew `recipient_name`.
    ///
    /// Sets the recipient and the drawn flag together. Retrying an already
    /// applied `(participant_id, recipient_name)` pair succeeds without
    /// further effect.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecipientTaken`] when another row already claims
    /// the recipient, or another [`StoreError`] when the write is rejected or
    /// the store is unreachable.
    async fn record_assignment(
        &self,
        participant_id: i64,
        recipient_name: &str,
    ) -> Result<(), StoreError>;
}
