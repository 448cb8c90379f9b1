//! Process-local participant table.
//!
//! Enforces the race-free conditional write that a hosted table gets from a
//! unique constraint: a recipient can be claimed by one row only.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::{ParticipantStore, StoreError};
use crate::participant::Participant;

/// Participant store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<Participant>>,
}

impl InMemoryStore {
    /// Create a store seeded with `participants`.
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            rows: Mutex::new(participants),
        }
    }

    /// Copy of the current rows.
    pub fn snapshot(&self) -> Vec<Participant> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ParticipantStore for InMemoryStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.snapshot())
    }

    async fn record_assignment(
        &self,
        participant_id: i64,
        recipient_name: &str,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);

        let claimed_elsewhere = rows.iter().any(|p| {
            p.id != participant_id && p.assigned_recipient_name.as_deref() == Some(recipient_name)
        });

        let row = rows
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| {
                StoreError::WriteRejected(format!("no participant with id {participant_id}"))
            })?;

        if row.name == recipient_name {
            return Err(StoreError::WriteRejected(format!(
                "participant {participant_id} cannot draw themself"
            )));
        }

        match row.assigned_recipient_name.as_deref() {
            Some(existing) if existing == recipient_name => {
                debug!(participant_id, "assignment already recorded");
                return Ok(());
            }
            Some(_) => {
                return Err(StoreError::WriteRejected(format!(
                    "participant {participant_id} already drew someone else"
                )));
            }
            None => {}
        }

        if claimed_elsewhere {
            return Err(StoreError::RecipientTaken(recipient_name.to_owned()));
        }

        row.assigned_recipient_name = Some(recipient_name.to_owned());
        debug!(participant_id, "assignment recorded");
        Ok(())
    }
}
