//! Bracket business logic: building, progression, views and export.

mod builder;
mod export;
mod locks;
mod progression;
mod view;

pub use builder::{
    bracket_size, build_first_round, round_count, seed_pairs, shuffle_participants, SeedingPolicy,
};
pub use export::{export_matches_csv, export_tournament_json};
pub use locks::TournamentLocks;
pub use progression::{build_next_round, Advance, BracketEngine, WinnerSelection};
pub use view::{
    group_by_round, is_round_closed, reconstruct_bracket_view, round_name, Bracket, MatchPreview,
};
