//! Draw workflow: login, draw, confirm-and-persist, logout.
//!
//! [`DrawService`] owns the latest participant snapshot and at most one
//! [`DrawSession`]. The store and the insight generator are injected so
//! either can be replaced by a test double.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::engine::{self, DrawError};
use crate::insights::{summarize, InsightGenerator};
use crate::participant::{AiInsight, Participant};
use crate::session::{DrawSession, DrawState};
use crate::store::{ParticipantStore, StoreError};

/// Default number of redraws after losing a recipient to a concurrent draw.
pub const DEFAULT_MAX_REDRAW_ATTEMPTS: u32 = 3;

/// Errors surfaced by the draw workflow.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No participant is logged in.
    #[error("no participant is logged in")]
    NotLoggedIn,
    /// The requested participant is not in the current snapshot.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),
    /// The participant already has a recorded recipient.
    #[error("participant {0:?} has already drawn")]
    AlreadyDrawn(String),
    /// Confirm was requested before a draw.
    #[error("nothing drawn to confirm")]
    NothingToConfirm,
    /// The draw found nobody valid.
    #[error(transparent)]
    Draw(#[from] DrawError),
    /// Reading the participant snapshot failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Saving the assignment failed; the draw is still pending.
    #[error("failed to save draw: {0}")]
    Save(StoreError),
}

impl SessionError {
    /// Short status text suitable for showing to the participant.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "Select your name first.",
            Self::UnknownParticipant(_) => "That name is not part of this group.",
            Self::AlreadyDrawn(_) => "You have already drawn your secret friend.",
            Self::NothingToConfirm => "Draw a secret friend before confirming.",
            Self::Draw(DrawError::NoEligibleTargets) => {
                "No friends available: everyone was already drawn or only you are left."
            }
            Self::Save(StoreError::RecipientTaken(_)) => {
                "Your secret friend was just drawn by someone else. Please try again."
            }
            Self::Save(_) => "Could not save your draw. Please try again.",
            Self::Store(_) => "Could not load the participants. Please try again.",
        }
    }
}

/// Orchestrates the draw workflow over an injected store.
pub struct DrawService {
    store: Arc<dyn ParticipantStore>,
    insights: Arc<dyn InsightGenerator>,
    rng: StdRng,
    max_redraw_attempts: u32,
    participants: Vec<Participant>,
    session: Option<DrawSession>,
}

impl DrawService {
    /// Create a service with an entropy-seeded random source.
    pub fn new(store: Arc<dyn ParticipantStore>, insights: Arc<dyn InsightGenerator>) -> Self {
        Self {
            store,
            insights,
            rng: StdRng::from_entropy(),
            max_redraw_attempts: DEFAULT_MAX_REDRAW_ATTEMPTS,
            participants: Vec::new(),
            session: None,
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Set how many redraws a confirm may perform.
    pub fn with_max_redraw_attempts(mut self, attempts: u32) -> Self {
        self.max_redraw_attempts = attempts;
        self
    }

    /// Latest participant snapshot.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Current session, if someone is logged in.
    pub fn session(&self) -> Option<&DrawSession> {
        self.session.as_ref()
    }

    /// Re-fetch the participant snapshot.
    ///
    /// On failure the snapshot degrades to empty.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the store read fails.
    pub async fn refresh(&mut self) -> Result<&[Participant], SessionError> {
        match self.store.list_participants().await {
            Ok(participants) => {
                debug!(count = participants.len(), "participant snapshot refreshed");
                self.participants = participants;
                Ok(&self.participants)
            }
            Err(e) => {
                warn!(error = %e, "failed to load participants");
                self.participants.clear();
                Err(e.into())
            }
        }
    }

    /// Participants who can still log in.
    pub fn login_candidates(&self) -> Vec<&Participant> {
        engine::eligible_login_users(&self.participants)
    }

    /// Log in as the participant with `participant_id`.
    ///
    /// Replaces any existing session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownParticipant`] if the id is not in the
    /// snapshot and [`SessionError::AlreadyDrawn`] if they already drew.
    pub fn login(&mut self, participant_id: i64) -> Result<&DrawSession, SessionError> {
        let participant = self
            .participants
            .iter()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| SessionError::UnknownParticipant(participant_id.to_string()))?;
        self.start_session(participant.clone())
    }

    /// Log in by display name, exact match first, then case-insensitive.
    ///
    /// # Errors
    ///
    /// Same as [`DrawService::login`].
    pub fn login_by_name(&mut self, name: &str) -> Result<&DrawSession, SessionError> {
        let wanted = name.trim();
        let participant = self
            .participants
            .iter()
            .find(|p| p.name == wanted)
            .or_else(|| {
                let lowered = wanted.to_lowercase();
                self.participants
                    .iter()
                    .find(|p| p.name.to_lowercase() == lowered)
            })
            .ok_or_else(|| SessionError::UnknownParticipant(wanted.to_owned()))?;
        self.start_session(participant.clone())
    }

    fn start_session(&mut self, participant: Participant) -> Result<&DrawSession, SessionError> {
        if participant.has_drawn() {
            return Err(SessionError::AlreadyDrawn(participant.name));
        }
        if let Some(previous) = self.session.take() {
            debug!(participant_id = previous.current_user().id, "replacing session");
        }
        info!(participant_id = participant.id, "participant logged in");
        Ok(self.session.insert(DrawSession::new(participant)))
    }

    /// Discard the session without touching the store.
    pub fn logout(&mut self) -> Option<DrawSession> {
        let session = self.session.take();
        if let Some(s) = &session {
            info!(participant_id = s.current_user().id, "participant logged out");
        }
        session
    }

    /// Draw a hidden candidate for the logged-in participant.
    ///
    /// Once drawn, the same candidate is returned until logout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotLoggedIn`] without a session and
    /// [`SessionError::Draw`] when nobody is eligible.
    pub fn draw(&mut self) -> Result<&Participant, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotLoggedIn)?;

        if session.candidate().is_none() {
            let candidate =
                engine::draw(session.current_user(), &self.participants, &mut self.rng)?.clone();
            session.begin_reveal(candidate);
            info!(participant_id = session.current_user().id, "candidate drawn");
        }

        session.candidate().ok_or(SessionError::NothingToConfirm)
    }

    /// Persist the pending candidate and reveal it.
    ///
    /// If another participant claimed the candidate first, the snapshot is
    /// re-fetched and a new hidden candidate drawn, up to the configured
    /// number of redraws. On success the snapshot is re-fetched from the
    /// store. On failure the session stays pending so the caller can retry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotLoggedIn`], [`SessionError::NothingToConfirm`],
    /// [`SessionError::Draw`] if a redraw finds nobody,
    /// [`SessionError::Save`] for write failures, or [`SessionError::Store`]
    /// if the re-fetch before a redraw fails.
    pub async fn confirm(&mut self) -> Result<&Participant, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotLoggedIn)?;
        let user = session.current_user().clone();
        let pending = match session.state() {
            DrawState::NotDrawn => return Err(SessionError::NothingToConfirm),
            DrawState::PendingReveal { candidate } => Some(candidate.clone()),
            DrawState::Confirmed { .. } => None,
        };

        if let Some(candidate) = pending {
            self.persist_with_redraw(&user, candidate).await?;
            if let Some(session) = self.session.as_mut() {
                session.confirm();
            }
            info!(participant_id = user.id, "draw confirmed");

            if let Err(e) = self.refresh().await {
                warn!(error = %e, "assignment saved but snapshot refresh failed");
            }
        }

        self.session
            .as_ref()
            .and_then(DrawSession::candidate)
            .ok_or(SessionError::NotLoggedIn)
    }

    async fn persist_with_redraw(
        &mut self,
        user: &Participant,
        mut candidate: Participant,
    ) -> Result<(), SessionError> {
        let mut redraws = 0_u32;
        loop {
            match self.store.record_assignment(user.id, &candidate.name).await {
                Ok(()) => return Ok(()),
                Err(StoreError::RecipientTaken(_)) if redraws < self.max_redraw_attempts => {
                    redraws = redraws.saturating_add(1);
                    warn!(
                        participant_id = user.id,
                        attempt = redraws,
                        "candidate claimed concurrently, redrawing"
                    );
                    self.refresh().await?;
                    let next = engine::draw(user, &self.participants, &mut self.rng)?.clone();
                    if let Some(session) = self.session.as_mut() {
                        session.replace_candidate(next.clone());
                    }
                    candidate = next;
                }
                Err(e) => {
                    warn!(participant_id = user.id, error = %e, "assignment write failed");
                    return Err(SessionError::Save(e));
                }
            }
        }
    }

    /// Best-effort insight about the current snapshot.
    pub async fn insights(&self) -> Option<AiInsight> {
        summarize(self.insights.as_ref(), &self.participants).await
    }
}
