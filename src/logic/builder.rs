//! Bracket builder: bracket size, round count, seeding and the first round.
//!
//! All functions here are pure apart from id/timestamp generation and may run
//! concurrently without coordination.

use crate::models::{BracketError, BracketMatch, Participant, TournamentId};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How participants are ordered before seeding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Registration order is seed order.
    #[default]
    Standard,
    /// Uniform random draw, then positional seeding.
    Random,
}

impl SeedingPolicy {
    /// Order participants for `build_first_round` according to this policy.
    pub fn apply(self, mut participants: Vec<Participant>) -> Vec<Participant> {
        if self == SeedingPolicy::Random {
            shuffle_participants(&mut participants);
        }
        participants
    }
}

/// Fisher–Yates shuffle for an unseeded random draw.
pub fn shuffle_participants(participants: &mut [Participant]) {
    participants.shuffle(&mut rand::thread_rng());
}

/// Smallest power of two that fits `participant_count` seats.
pub fn bracket_size(participant_count: usize) -> usize {
    participant_count.max(1).next_power_of_two()
}

/// Number of rounds needed to reach a champion: ceil(log2(n)), 0 for n < 2.
pub fn round_count(participant_count: usize) -> u32 {
    if participant_count < 2 {
        return 0;
    }
    bracket_size(participant_count).trailing_zeros()
}

/// Standard pairing of 1-based seeds: seed i meets seed (size + 1 - i).
pub fn seed_pairs(bracket_size: usize) -> Vec<(usize, usize)> {
    (1..=bracket_size / 2)
        .map(|seed| (seed, bracket_size + 1 - seed))
        .collect()
}

/// Build round 1 from participants in seed order.
///
/// Seats past the end of `participants` are empty, so the top seeds receive the
/// byes: for n participants exactly `bracket_size(n) - n` matches are byes, each
/// already won by its only seated team.
pub fn build_first_round(
    tournament_id: TournamentId,
    participants: &[Participant],
) -> Result<Vec<BracketMatch>, BracketError> {
    if participants.len() < 2 {
        return Err(BracketError::InsufficientParticipants {
            count: participants.len(),
        });
    }

    let size = bracket_size(participants.len());
    let seat = |seed: usize| participants.get(seed - 1).cloned();

    let matches = seed_pairs(size)
        .into_iter()
        .zip(0u32..)
        .filter_map(|((high, low), position)| match (seat(high), seat(low)) {
            (Some(a), Some(b)) => Some(BracketMatch::scheduled(tournament_id, 1, position, a, b)),
            (Some(a), None) | (None, Some(a)) => Some(BracketMatch::bye(tournament_id, 1, position, a)),
            // The high seed is always within the participant count, since n > size / 2.
            (None, None) => None,
        })
        .collect();

    Ok(matches)
}
