//! Canonical in-memory participant shape.
//!
//! Everything past the store boundary works with [`Participant`]. Column
//! casing variants are resolved in [`crate::store::row`] and never leak here.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// One entrant in the gift exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    /// Stable row identifier.
    pub id: i64,
    /// Display name, assumed unique within the group.
    pub name: String,
    /// Name of the participant this person has drawn, set exactly once.
    pub assigned_recipient_name: Option<String>,
}

impl Participant {
    /// Create a participant that has not drawn yet.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            assigned_recipient_name: None,
        }
    }

    /// Create a participant that already drew `recipient`.
    pub fn drawn(id: i64, name: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            assigned_recipient_name: Some(recipient.into()),
        }
    }

    /// Whether this participant already has a recorded recipient.
    ///
    /// Derived from [`Participant::assigned_recipient_name`], so the flag and
    /// the recipient can never disagree in memory.
    pub fn has_drawn(&self) -> bool {
        self.assigned_recipient_name.is_some()
    }
}

impl Serialize for Participant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Participant", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("assignedRecipientName", &self.assigned_recipient_name)?;
        state.serialize_field("hasDrawn", &self.has_drawn())?;
        state.end()
    }
}

/// Structured summary of the group's state from the insight service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    /// Creative summary of the group.
    pub summary: String,
    /// One light-hearted fact drawn from the data.
    pub funny_fact: String,
    /// A recommendation for the group.
    pub recommendation: String,
}
