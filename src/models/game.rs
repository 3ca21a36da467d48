//! BracketMatch and MatchStatus: one pairing in one round of the bracket.

use crate::models::participant::{Participant, ParticipantId, Slot};
use crate::models::tournament::{BracketError, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a match. `Bye` and `Completed` are terminal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Bye,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Bye => "bye",
            MatchStatus::Completed => "completed",
        }
    }
}

/// Final score of a decided match, slot A first.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub a: u32,
    pub b: u32,
}

impl MatchScore {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn is_draw(&self) -> bool {
        self.a == self.b
    }
}

/// A match stored flat, keyed by (tournament, round, position).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-based, increasing toward the final.
    pub round: u32,
    /// 0-based order within the round; feeds position / 2 of the next round.
    pub position: u32,
    pub slot_a: Slot,
    pub slot_b: Slot,
    /// Set if and only if status is `Bye` or `Completed`.
    pub winner: Option<Participant>,
    /// Points of slot A and slot B, when the result was entered with a score.
    #[serde(default)]
    pub score_a: Option<u32>,
    #[serde(default)]
    pub score_b: Option<u32>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl BracketMatch {
    /// A match between two seated teams, waiting for a winner.
    pub fn scheduled(
        tournament_id: TournamentId,
        round: u32,
        position: u32,
        team_a: Participant,
        team_b: Participant,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            position,
            slot_a: Slot::Team(team_a),
            slot_b: Slot::Team(team_b),
            winner: None,
            score_a: None,
            score_b: None,
            status: MatchStatus::Scheduled,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    /// A match with one seated team that advances immediately.
    pub fn bye(tournament_id: TournamentId, round: u32, position: u32, team: Participant) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            position,
            slot_a: Slot::Team(team.clone()),
            slot_b: Slot::Empty,
            winner: Some(team),
            score_a: None,
            score_b: None,
            status: MatchStatus::Bye,
            created_at: now,
            decided_at: Some(now),
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.status, MatchStatus::Bye | MatchStatus::Completed) && self.winner.is_some()
    }

    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Bye
    }

    /// The participant with this id if they sit in slot A or slot B.
    pub fn seated(&self, participant_id: ParticipantId) -> Option<&Participant> {
        [&self.slot_a, &self.slot_b]
            .into_iter()
            .filter_map(Slot::participant)
            .find(|p| p.id == participant_id)
    }

    pub fn score(&self) -> Option<MatchScore> {
        Some(MatchScore::new(self.score_a?, self.score_b?))
    }

    /// Check a score against the chosen winner: no draws, and the winner
    /// must be the side with more points.
    pub fn check_score(&self, winner_id: ParticipantId, score: MatchScore) -> Result<(), BracketError> {
        let a_won = self.slot_a.participant().is_some_and(|p| p.id == winner_id);
        let b_won = self.slot_b.participant().is_some_and(|p| p.id == winner_id);
        let consistent = match score.a.cmp(&score.b) {
            Ordering::Greater => a_won,
            Ordering::Less => b_won,
            Ordering::Equal => false,
        };
        if consistent {
            Ok(())
        } else {
            Err(BracketError::InvalidWinner(winner_id))
        }
    }

    /// Both seated participants (one for a bye).
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        [&self.slot_a, &self.slot_b]
            .into_iter()
            .filter_map(Slot::participant)
    }
}
