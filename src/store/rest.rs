//! PostgREST participant table, as exposed by Supabase at `/rest/v1/{table}`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::row::parse_rows;
use super::{ParticipantStore, StoreError};
use crate::http::{check_http_response, HttpError};
use crate::participant::Participant;

/// Default request timeout for store calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Column names used when writing an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteColumns {
    /// Identifier columns to filter on, tried in order.
    pub id_columns: Vec<String>,
    /// Column receiving the recipient name.
    pub recipient: String,
    /// Column receiving the drawn flag.
    pub drawn: String,
}

impl Default for WriteColumns {
    fn default() -> Self {
        Self {
            id_columns: vec!["Id".to_owned(), "id".to_owned()],
            recipient: "segredo".to_owned(),
            drawn: "temsegredo".to_owned(),
        }
    }
}

/// PostgREST-backed participant store.
#[derive(Clone)]
pub struct RestStore {
    /// Project base URL, without a trailing slash.
    #[doc(hidden)]
    pub base_url: String,
    /// Table name.
    #[doc(hidden)]
    pub table: String,
    /// Write column names.
    #[doc(hidden)]
    pub columns: WriteColumns,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl RestStore {
    /// Create a store for `table` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Network`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        table: &str,
        api_key: String,
        columns: WriteColumns,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            table: table.to_owned(),
            columns,
            api_key,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

// ---------------------------------------------------------------------------
// Request builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Body that sets the recipient and the drawn flag in one write.
#[doc(hidden)]
pub fn assignment_payload(columns: &WriteColumns, recipient_name: &str) -> Value {
    let mut payload = Map::new();
    payload.insert(
        columns.recipient.clone(),
        Value::String(recipient_name.to_owned()),
    );
    payload.insert(columns.drawn.clone(), Value::Bool(true));
    Value::Object(payload)
}

/// `or` filter that matches a row only while it is free to take this write.
///
/// A row that has not drawn yet matches, and so does a row that already
/// holds exactly this recipient, which keeps retries idempotent.
#[doc(hidden)]
pub fn conditional_filter(columns: &WriteColumns, recipient_name: &str) -> String {
    let quoted = recipient_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "({drawn}.not.is.true,{recipient}.eq.\"{quoted}\")",
        drawn = columns.drawn,
        recipient = columns.recipient,
    )
}

/// Interpret the `return=representation` body of an assignment write.
///
/// # Errors
///
/// Returns [`StoreError::WriteRejected`] when the body is blank or no row
/// matched the filter, and [`StoreError::Parse`] when the body is not a JSON
/// array.
#[doc(hidden)]
pub fn check_rows_updated(body: &str, participant_id: i64) -> Result<(), StoreError> {
    if body.trim().is_empty() {
        return Err(StoreError::WriteRejected(format!(
            "store returned no representation for participant {participant_id}"
        )));
    }
    let rows: Vec<Value> =
        serde_json::from_str(body).map_err(|e| StoreError::Parse(e.to_string()))?;
    if rows.is_empty() {
        return Err(StoreError::WriteRejected(format!(
            "participant {participant_id} not found or already drew someone else"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait]
impl ParticipantStore for RestStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "*")])
            .send()
            .await?;

        let body = check_http_response(response).await?;
        let participants = parse_rows(&body)?;
        debug!(count = participants.len(), "participants fetched");
        Ok(participants)
    }

    async fn record_assignment(
        &self,
        participant_id: i64,
        recipient_name: &str,
    ) -> Result<(), StoreError> {
        let payload = assignment_payload(&self.columns, recipient_name);
        let filter = conditional_filter(&self.columns, recipient_name);

        let mut id_columns = self.columns.id_columns.iter().peekable();
        while let Some(id_column) = id_columns.next() {
            let response = self
                .authorized(self.client.patch(self.table_url()))
                .header("Prefer", "return=representation")
                .query(&[
                    (id_column.as_str(), format!("eq.{participant_id}")),
                    ("or", filter.clone()),
                ])
                .json(&payload)
                .send()
                .await?;

            match check_http_response(response).await {
                Ok(body) => {
                    check_rows_updated(&body, participant_id)?;
                    info!(participant_id, id_column = %id_column, "assignment recorded");
                    return Ok(());
                }
                Err(HttpError::Status { status: 409, body }) => {
                    warn!(participant_id, body = %body, "recipient claimed by another row");
                    return Err(StoreError::RecipientTaken(recipient_name.to_owned()));
                }
                Err(HttpError::Status { status, body })
                    if matches!(status, 400 | 404) && id_columns.peek().is_some() =>
                {
                    warn!(
                        participant_id,
                        status,
                        id_column = %id_column,
                        body = %body,
                        "assignment write failed, retrying with next id column"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StoreError::WriteRejected(
            "no id columns configured for assignment writes".to_owned(),
        ))
    }
}
