//! Data structures for the bracket: participants, matches, tournaments.

mod game;
mod participant;
mod tournament;

pub use game::{BracketMatch, MatchId, MatchScore, MatchStatus};
pub use participant::{Participant, ParticipantId, Slot};
pub use tournament::{BracketError, Tournament, TournamentId, TournamentStatus};
