//! Knockout tournament organizer: library with models, bracket logic and storage.

pub mod logic;
pub mod models;
pub mod notify;
pub mod store;

pub use logic::{
    bracket_size, build_first_round, build_next_round, export_matches_csv, export_tournament_json,
    group_by_round, is_round_closed, reconstruct_bracket_view, round_count, round_name, seed_pairs,
    shuffle_participants, Advance, Bracket, BracketEngine, MatchPreview, SeedingPolicy,
    TournamentLocks, WinnerSelection,
};
pub use models::{
    BracketError, BracketMatch, MatchId, MatchScore, MatchStatus, Participant, ParticipantId, Slot,
    Tournament, TournamentId, TournamentStatus,
};
pub use notify::{BroadcastNotifier, MatchNotifier, NoopNotifier};
pub use store::{MatchStore, MemoryStore, TeamRoster};
