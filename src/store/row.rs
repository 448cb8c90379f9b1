//! Store-boundary normalization of participant rows.
//!
//! The backing table's column casing is not under our control, so each
//! field may arrive under one of several names. This is the only place that
//! knows about those aliases.

use serde::Deserialize;
use tracing::warn;

use super::StoreError;
use crate::participant::Participant;

/// A participant row exactly as the store returned it.
///
/// Every known alias is a separate field so that rows carrying two casings
/// of the same column still deserialize.
#[doc(hidden)]
#[derive(Debug, Default, Deserialize)]
pub struct RawParticipantRow {
    /// `Id` column.
    #[serde(rename = "Id")]
    pub id_pascal: Option<i64>,
    /// `id` column.
    pub id: Option<i64>,

    /// `Nome` column.
    #[serde(rename = "Nome")]
    pub nome_pascal: Option<String>,
    /// `nome` column.
    pub nome: Option<String>,
    /// `Name` column.
    #[serde(rename = "Name")]
    pub name_pascal: Option<String>,
    /// `name` column.
    pub name: Option<String>,

    /// `Segredo` column.
    #[serde(rename = "Segredo")]
    pub segredo_pascal: Option<String>,
    /// `segredo` column.
    pub segredo: Option<String>,
    /// `assignedRecipientName` column.
    #[serde(rename = "assignedRecipientName")]
    pub assigned_recipient_name: Option<String>,
    /// `recipient` column.
    pub recipient: Option<String>,

    /// `TemSegredo` column.
    #[serde(rename = "TemSegredo")]
    pub tem_segredo_pascal: Option<bool>,
    /// `temsegredo` column.
    pub temsegredo: Option<bool>,
    /// `tem_segredo` column.
    pub tem_segredo: Option<bool>,
    /// `hasDrawn` column.
    #[serde(rename = "hasDrawn")]
    pub has_drawn: Option<bool>,
}

impl RawParticipantRow {
    fn id(&self) -> Option<i64> {
        self.id_pascal.or(self.id)
    }

    fn name(&self) -> Option<&str> {
        first_text([&self.nome_pascal, &self.nome, &self.name_pascal, &self.name])
    }

    fn recipient(&self) -> Option<&str> {
        first_text([
            &self.segredo_pascal,
            &self.segredo,
            &self.assigned_recipient_name,
            &self.recipient,
        ])
    }

    fn drawn_flag(&self) -> Option<bool> {
        self.tem_segredo_pascal
            .or(self.temsegredo)
            .or(self.tem_segredo)
            .or(self.has_drawn)
    }

    /// Map the row to the canonical shape.
    ///
    /// Returns `None` for rows without an id or a non-blank name, and for
    /// rows flagged as drawn that hold no recipient.
    pub fn normalize(&self) -> Option<Participant> {
        let Some(id) = self.id() else {
            warn!("skipping participant row without an id");
            return None;
        };
        let Some(name) = self.name() else {
            warn!(participant_id = id, "skipping participant row without a name");
            return None;
        };

        let recipient = self.recipient().map(str::to_owned);
        match (self.drawn_flag(), &recipient) {
            (Some(true), None) => {
                warn!(
                    participant_id = id,
                    "skipping participant row marked drawn without a recipient"
                );
                return None;
            }
            (Some(false), Some(_)) => warn!(
                participant_id = id,
                "drawn flag unset but recipient present, trusting recipient"
            ),
            _ => {}
        }

        Some(Participant {
            id,
            name: name.to_owned(),
            assigned_recipient_name: recipient,
        })
    }
}

/// First alias holding non-blank text, trimmed.
fn first_text<const N: usize>(candidates: [&Option<String>; N]) -> Option<&str> {
    candidates
        .into_iter()
        .filter_map(|value| value.as_deref())
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Parse a JSON array of raw rows into canonical participants.
///
/// Unusable rows are skipped; see [`RawParticipantRow::normalize`].
///
/// # Errors
///
/// Returns [`StoreError::Parse`] if the body is not an array of row objects.
pub fn parse_rows(body: &str) -> Result<Vec<Participant>, StoreError> {
    let rows: Vec<RawParticipantRow> =
        serde_json::from_str(body).map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(rows.iter().filter_map(RawParticipantRow::normalize).collect())
}
