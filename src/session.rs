//! Per-login draw session.
//!
//! A session moves `NotDrawn -> PendingReveal -> Confirmed` and never back.
//! Logging out drops the session without touching the store.

use crate::participant::Participant;

/// Where the logged-in participant is in their draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawState {
    /// Nothing drawn yet.
    NotDrawn,
    /// A recipient was drawn but is not persisted and stays hidden.
    PendingReveal {
        /// The drawn, unconfirmed recipient.
        candidate: Participant,
    },
    /// The recipient is persisted and may be shown.
    Confirmed {
        /// The persisted recipient.
        recipient: Participant,
    },
}

/// Ephemeral state for one logged-in participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSession {
    current_user: Participant,
    state: DrawState,
}

impl DrawSession {
    /// Start a session for `current_user`.
    pub fn new(current_user: Participant) -> Self {
        Self {
            current_user,
            state: DrawState::NotDrawn,
        }
    }

    /// The logged-in participant.
    pub fn current_user(&self) -> &Participant {
        &self.current_user
    }

    /// Current draw state.
    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Whether the recipient has been persisted and may be shown.
    pub fn revealed(&self) -> bool {
        matches!(self.state, DrawState::Confirmed { .. })
    }

    /// Pending or confirmed recipient, if any.
    pub fn candidate(&self) -> Option<&Participant> {
        match &self.state {
            DrawState::NotDrawn => None,
            DrawState::PendingReveal { candidate } => Some(candidate),
            DrawState::Confirmed { recipient } => Some(recipient),
        }
    }

    /// Record a freshly drawn candidate.
    ///
    /// Only moves out of `NotDrawn`; in any later state the existing
    /// candidate is kept and `false` is returned.
    pub fn begin_reveal(&mut self, candidate: Participant) -> bool {
        if !matches!(self.state, DrawState::NotDrawn) {
            return false;
        }
        self.state = DrawState::PendingReveal { candidate };
        true
    }

    /// Swap the hidden candidate after it became unavailable.
    ///
    /// Returns `false` unless the session is pending.
    pub fn replace_candidate(&mut self, candidate: Participant) -> bool {
        match &mut self.state {
            DrawState::PendingReveal { candidate: current } => {
                *current = candidate;
                true
            }
            _ => false,
        }
    }

    /// Mark the pending candidate as persisted.
    ///
    /// Returns the confirmed recipient, or `None` if nothing was pending and
    /// nothing had been confirmed before.
    pub fn confirm(&mut self) -> Option<&Participant> {
        if let DrawState::PendingReveal { candidate } = &self.state {
            self.state = DrawState::Confirmed {
                recipient: candidate.clone(),
            };
        }
        match &self.state {
            DrawState::Confirmed { recipient } => Some(recipient),
            _ => None,
        }
    }
}
