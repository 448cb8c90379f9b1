//! Assignment engine: who may log in, who is still available, and the draw.
//!
//! Every function here is pure over a point-in-time snapshot of the group.
//! The exclusion computed from that snapshot is advisory; the store's
//! conditional write is what keeps concurrent clients from claiming the same
//! recipient.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::participant::Participant;

/// Errors returned by the draw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// Everyone else is already taken, or only the caller remains.
    #[error("no eligible recipients left to draw")]
    NoEligibleTargets,
}

/// Participants who can still log in to perform their draw.
pub fn eligible_login_users(participants: &[Participant]) -> Vec<&Participant> {
    participants.iter().filter(|p| !p.has_drawn()).collect()
}

/// Names already recorded as someone's recipient.
pub fn taken_names(participants: &[Participant]) -> HashSet<&str> {
    participants
        .iter()
        .filter_map(|p| p.assigned_recipient_name.as_deref())
        .collect()
}

/// Participants `current` may still draw: not themself and not taken.
pub fn eligible_targets<'a>(
    current: &Participant,
    participants: &'a [Participant],
) -> Vec<&'a Participant> {
    let taken = taken_names(participants);
    participants
        .iter()
        .filter(|p| p.id != current.id && p.name != current.name)
        .filter(|p| !taken.contains(p.name.as_str()))
        .collect()
}

/// Draw a recipient for `current`, uniformly among the eligible targets.
///
/// # Errors
///
/// Returns [`DrawError::NoEligibleTargets`] when nobody valid remains.
pub fn draw<'a, R: Rng + ?Sized>(
    current: &Participant,
    participants: &'a [Participant],
    rng: &mut R,
) -> Result<&'a Participant, DrawError> {
    let duplicates = find_duplicate_names(participants);
    if !duplicates.is_empty() {
        warn!(?duplicates, "duplicate participant names share one availability slot");
    }

    let eligible = eligible_targets(current, participants);
    debug!(
        participant_id = current.id,
        eligible = eligible.len(),
        "computed eligible targets"
    );

    eligible
        .choose(rng)
        .copied()
        .ok_or(DrawError::NoEligibleTargets)
}

/// Names that appear on more than one participant, sorted.
pub fn find_duplicate_names(participants: &[Participant]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for p in participants {
        if !seen.insert(p.name.as_str()) {
            duplicates.insert(p.name.clone());
        }
    }
    duplicates.into_iter().collect()
}
