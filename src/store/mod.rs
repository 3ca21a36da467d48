//! Persistence seam for the bracket engine.

mod memory;

pub use memory::{MemoryStore, TeamRoster};

use crate::models::{
    BracketError, BracketMatch, MatchId, MatchScore, MatchStatus, Participant, Tournament,
    TournamentId, TournamentStatus,
};
use std::time::Duration;

/// What the bracket engine needs from persistence.
///
/// Implementations must make `save_matches` all-or-nothing and reject a batch
/// when any (round, position) it contains already exists for the tournament,
/// with `BracketError::ConcurrentAdvanceConflict`.
pub trait MatchStore {
    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Tournament, BracketError>;

    /// Registered teams in registration order.
    fn load_participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, BracketError>;

    fn load_matches(&self, tournament_id: TournamentId) -> Result<Vec<BracketMatch>, BracketError>;

    fn save_matches(
        &self,
        tournament_id: TournamentId,
        matches: &[BracketMatch],
    ) -> Result<(), BracketError>;

    /// Record a decision on an undecided match and return the stored match.
    fn update_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner: Participant,
        score: Option<MatchScore>,
        status: MatchStatus,
    ) -> Result<BracketMatch, BracketError>;

    /// Remove every match of the tournament. Unknown tournaments are a no-op.
    fn delete_all_matches(&self, tournament_id: TournamentId) -> Result<(), BracketError>;

    /// Remove the tournament together with its teams and matches.
    fn delete_tournament(&self, tournament_id: TournamentId) -> Result<(), BracketError>;

    /// Drop tournaments not touched for `timeout` and return their ids.
    fn remove_inactive(&self, timeout: Duration) -> Result<Vec<TournamentId>, BracketError>;

    fn record_status(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
        champion: Option<Participant>,
    ) -> Result<(), BracketError>;
}
