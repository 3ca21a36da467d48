//! Tournament, TournamentStatus and BracketError.

use crate::models::game::MatchId;
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during bracket and registration operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Fewer than 2 teams when building a bracket.
    InsufficientParticipants { count: usize },
    /// Match does not exist in this tournament, or is already decided.
    InvalidMatch(MatchId),
    /// Chosen winner is not seated in the match.
    InvalidWinner(ParticipantId),
    /// The next round was already created for this tournament.
    ConcurrentAdvanceConflict { round: u32 },
    TournamentNotFound(Uuid),
    TeamNotFound(ParticipantId),
    /// Empty team or tournament name.
    InvalidName,
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// Registration capacity reached.
    TournamentFull { capacity: usize },
    /// Capacity must allow at least 2 teams.
    InvalidCapacity,
    /// Teams cannot change while matches exist; reset the bracket first.
    BracketInProgress,
    /// Backing store or writer failure.
    Storage(String),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InsufficientParticipants { count } => {
                write!(f, "At least 2 teams required (have {})", count)
            }
            BracketError::InvalidMatch(id) => write!(f, "Match {} not found or already decided", id),
            BracketError::InvalidWinner(_) => write!(f, "Winner is not playing in this match or lost on the score"),
            BracketError::ConcurrentAdvanceConflict { round } => {
                write!(f, "Round {} already exists", round)
            }
            BracketError::TournamentNotFound(_) => write!(f, "Tournament not found"),
            BracketError::TeamNotFound(_) => write!(f, "Team not found"),
            BracketError::InvalidName => write!(f, "Name must not be empty"),
            BracketError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            BracketError::TournamentFull { capacity } => {
                write!(f, "Tournament is full ({} teams)", capacity)
            }
            BracketError::InvalidCapacity => write!(f, "Team count must be at least 2"),
            BracketError::BracketInProgress => {
                write!(f, "Teams cannot change once the tie sheet exists")
            }
            BracketError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for BracketError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Registering teams; no bracket yet.
    #[default]
    Upcoming,
    /// Bracket generated, final not decided.
    Active,
    /// Champion decided.
    Completed,
}

/// A tournament: registration settings and outcome. Teams and matches live in the store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub location: String,
    pub date: Option<NaiveDate>,
    /// Maximum number of teams that can register.
    pub team_count: usize,
    pub status: TournamentStatus,
    pub champion: Option<Participant>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new upcoming tournament. Name must be non-empty and capacity at least 2.
    pub fn new(name: impl Into<String>, team_count: usize) -> Result<Self, BracketError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(BracketError::InvalidName);
        }
        if team_count < 2 {
            return Err(BracketError::InvalidCapacity);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            location: String::new(),
            date: None,
            team_count,
            status: TournamentStatus::Upcoming,
            champion: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }
}
