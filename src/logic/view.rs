//! Bracket view reconstructed from the flat match list on every read.

use crate::logic::builder::round_count;
use crate::models::{BracketMatch, MatchStatus, Participant, Slot};
use serde::Serialize;
use std::collections::BTreeMap;

/// Rounds in order, each sorted by position.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Bracket {
    pub rounds: Vec<Vec<BracketMatch>>,
    /// Rounds needed for a champion given the participant count.
    pub total_rounds: u32,
    /// Number of rounds that have any matches.
    pub current_round: u32,
    pub champion: Option<Participant>,
}

/// A match that does not exist yet, for drawing the rest of the tree.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchPreview {
    pub round: u32,
    pub position: u32,
    pub slot_a: Slot,
    pub slot_b: Slot,
}

/// True when every match of the round has a winner.
pub fn is_round_closed(round: &[BracketMatch]) -> bool {
    !round.is_empty() && round.iter().all(BracketMatch::is_decided)
}

/// Group a flat match list by round number; each round sorted by position.
pub fn group_by_round(matches: &[BracketMatch]) -> Vec<Vec<BracketMatch>> {
    let mut by_round: BTreeMap<u32, Vec<BracketMatch>> = BTreeMap::new();
    for m in matches {
        by_round.entry(m.round).or_default().push(m.clone());
    }
    by_round
        .into_values()
        .map(|mut round| {
            round.sort_by_key(|m| m.position);
            round
        })
        .collect()
}

/// Build the bracket view. Never fails; partial match sets give fewer rounds.
pub fn reconstruct_bracket_view(matches: &[BracketMatch], participant_count: usize) -> Bracket {
    let rounds = group_by_round(matches);
    let total_rounds = round_count(participant_count);
    // Only the single match of the final round crowns a champion.
    let champion = match rounds.last().map(Vec::as_slice) {
        Some([final_match]) if final_match.round == total_rounds && final_match.is_decided() => {
            final_match.winner.clone()
        }
        _ => None,
    };
    Bracket {
        total_rounds,
        current_round: rounds.len() as u32,
        rounds,
        champion,
    }
}

/// Display name of a round: Final, Semi Final, Quarter Final, else "Round N".
pub fn round_name(round: u32, total_rounds: u32) -> String {
    match total_rounds.checked_sub(round) {
        Some(0) => "Final".to_string(),
        Some(1) => "Semi Final".to_string(),
        Some(2) => "Quarter Final".to_string(),
        _ => format!("Round {}", round),
    }
}

impl Bracket {
    pub fn round(&self, number: u32) -> Option<&[BracketMatch]> {
        self.rounds
            .iter()
            .find(|r| r.first().is_some_and(|m| m.round == number))
            .map(Vec::as_slice)
    }

    pub fn matches(&self) -> impl Iterator<Item = &BracketMatch> {
        self.rounds.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Percentage of created matches that are decided, rounded.
    pub fn progress(&self) -> u8 {
        let total = self.matches().count();
        if total == 0 {
            return 0;
        }
        let decided = self
            .matches()
            .filter(|m| matches!(m.status, MatchStatus::Completed | MatchStatus::Bye))
            .count();
        (decided as f64 / total as f64 * 100.0).round() as u8
    }

    /// Placeholder matches for the rounds not created yet, up to `total_rounds`.
    ///
    /// Seats fed by a decided match show its winner, seats fed by an undecided
    /// match are `Tbd`, and a pairing without a second feeder gets `Empty`.
    pub fn projected_rounds(&self) -> Vec<Vec<MatchPreview>> {
        let Some(last) = self.rounds.last() else {
            return Vec::new();
        };
        if self.champion.is_some() {
            return Vec::new();
        }

        let mut feeders: Vec<Slot> = last
            .iter()
            .map(|m| m.winner.clone().map_or(Slot::Tbd, Slot::Team))
            .collect();
        let mut projected = Vec::new();
        let first_round = last.first().map_or(1, |m| m.round) + 1;

        for round in first_round..=self.total_rounds {
            if feeders.len() < 2 {
                break;
            }
            let previews: Vec<MatchPreview> = feeders
                .chunks(2)
                .zip(0u32..)
                .map(|(pair, position)| MatchPreview {
                    round,
                    position,
                    slot_a: pair[0].clone(),
                    slot_b: pair.get(1).cloned().unwrap_or(Slot::Empty),
                })
                .collect();
            feeders = previews
                .iter()
                .map(|p| match p.slot_b {
                    Slot::Empty => p.slot_a.clone(),
                    _ => Slot::Tbd,
                })
                .collect();
            projected.push(previews);
        }

        projected
    }
}
