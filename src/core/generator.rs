use crate::domain::model::{Assignments, ParticipantId};
use crate::utils::error::{DrawError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Builds a giver to recipient mapping with no self-assignments.
///
/// The participants are shuffled uniformly and then linked into a single
/// cycle: everyone gives to the person after them, the last gives to the first.
/// A cycle over two or more people never has a fixed point, so there is no
/// retry loop.
pub fn generate(participants: &[ParticipantId]) -> Result<Assignments> {
    generate_with_rng(participants, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    participants: &[ParticipantId],
    rng: &mut R,
) -> Result<Assignments> {
    if participants.len() < 2 {
        return Err(DrawError::InvalidParticipantCount {
            count: participants.len(),
            reason: "at least 2 participants are needed".to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(DrawError::DuplicateParticipant {
                participant_id: id.to_string(),
            });
        }
    }

    let mut order = participants.to_vec();
    order.shuffle(rng);

    let n = order.len();
    Ok((0..n).map(|i| (order[i], order[(i + 1) % n])).collect())
}
