//! Bracket progression: winner selection, round closing, champion, reset.
//!
//! Every write for a tournament runs under that tournament's lock, so the
//! "round is closed, therefore create the next round" step cannot race.

use crate::logic::builder::{build_first_round, SeedingPolicy};
use crate::logic::locks::TournamentLocks;
use crate::logic::view::{group_by_round, is_round_closed, reconstruct_bracket_view, Bracket};
use crate::models::{
    BracketError, BracketMatch, MatchId, MatchScore, MatchStatus, Participant, ParticipantId,
    TournamentId, TournamentStatus,
};
use crate::notify::{MatchNotifier, NoopNotifier};
use crate::store::MatchStore;
use serde::Serialize;
use std::sync::PoisonError;
use std::time::Duration;

/// What a single advance step produced.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Advance {
    /// Matches created by this call (empty when no round closed).
    pub next_round: Vec<BracketMatch>,
    /// Set once the final is decided.
    pub champion: Option<Participant>,
}

/// Result of `select_winner`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct WinnerSelection {
    pub updated: BracketMatch,
    pub next_round: Vec<BracketMatch>,
    pub champion: Option<Participant>,
}

/// Build round `round` from the previous round's winners in position order.
///
/// Winners 2k and 2k+1 meet at position k; an odd last winner gets a bye.
pub fn build_next_round(
    tournament_id: TournamentId,
    round: u32,
    winners: &[Participant],
) -> Vec<BracketMatch> {
    winners
        .chunks(2)
        .zip(0u32..)
        .map(|(pair, position)| match pair {
            [a, b] => BracketMatch::scheduled(tournament_id, round, position, a.clone(), b.clone()),
            [a] => BracketMatch::bye(tournament_id, round, position, a.clone()),
            _ => unreachable!("chunks(2) yields one or two winners"),
        })
        .collect()
}

/// Single-elimination engine over a match store.
pub struct BracketEngine<S, N = NoopNotifier> {
    store: S,
    notifier: N,
    locks: TournamentLocks,
}

impl<S: MatchStore> BracketEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_notifier(store, NoopNotifier)
    }
}

impl<S: MatchStore, N: MatchNotifier> BracketEngine<S, N> {
    pub fn with_notifier(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            locks: TournamentLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn locks(&self) -> &TournamentLocks {
        &self.locks
    }

    /// Run `write` under the tournament's lock. The lock entry is released
    /// again when the tournament turns out not to exist.
    fn locked<T>(
        &self,
        tournament_id: TournamentId,
        write: impl FnOnce() -> Result<T, BracketError>,
    ) -> Result<T, BracketError> {
        let result = {
            let lock = self.locks.for_tournament(tournament_id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            write()
        };
        if matches!(result, Err(BracketError::TournamentNotFound(_))) {
            self.locks.release(tournament_id);
        }
        result
    }

    /// Build round 1 from the registered teams, replacing any previous bracket.
    pub fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        seeding: SeedingPolicy,
    ) -> Result<Vec<BracketMatch>, BracketError> {
        self.locked(tournament_id, || self.generate_locked(tournament_id, seeding))
    }

    fn generate_locked(
        &self,
        tournament_id: TournamentId,
        seeding: SeedingPolicy,
    ) -> Result<Vec<BracketMatch>, BracketError> {
        let participants = seeding.apply(self.store.load_participants(tournament_id)?);
        let first_round = build_first_round(tournament_id, &participants)?;

        self.store.delete_all_matches(tournament_id)?;
        self.store.save_matches(tournament_id, &first_round)?;
        self.store
            .record_status(tournament_id, TournamentStatus::Active, None)?;

        let byes = first_round.iter().filter(|m| m.is_bye()).count();
        log::info!(
            "Generated bracket for tournament {}: {} teams, {} matches, {} byes",
            tournament_id,
            participants.len(),
            first_round.len(),
            byes
        );
        for m in &first_round {
            self.notifier.notify_match_changed(m);
        }
        Ok(first_round)
    }

    /// Record the winner of a scheduled match and close its round if it is the last one open.
    pub fn select_winner(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: ParticipantId,
    ) -> Result<WinnerSelection, BracketError> {
        self.select_winner_with_score(tournament_id, match_id, winner_id, None)
    }

    /// Like `select_winner`, also storing the final score. A draw, or a score
    /// won by the other side, is rejected with `InvalidWinner` before any write.
    pub fn select_winner_with_score(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: ParticipantId,
        score: Option<MatchScore>,
    ) -> Result<WinnerSelection, BracketError> {
        self.locked(tournament_id, || {
            self.select_locked(tournament_id, match_id, winner_id, score)
        })
    }

    fn select_locked(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: ParticipantId,
        score: Option<MatchScore>,
    ) -> Result<WinnerSelection, BracketError> {
        let matches = self.store.load_matches(tournament_id)?;
        let target = matches
            .iter()
            .find(|m| m.id == match_id)
            .ok_or(BracketError::InvalidMatch(match_id))?;
        if target.status != MatchStatus::Scheduled {
            return Err(BracketError::InvalidMatch(match_id));
        }
        let winner = target
            .seated(winner_id)
            .cloned()
            .ok_or(BracketError::InvalidWinner(winner_id))?;
        if let Some(score) = score {
            target.check_score(winner_id, score)?;
        }

        let updated = self.store.update_match(
            tournament_id,
            match_id,
            winner,
            score,
            MatchStatus::Completed,
        )?;
        log::debug!(
            "Match {} (round {}, position {}) won by {}",
            updated.id,
            updated.round,
            updated.position,
            updated.winner.as_ref().map_or("?", |w| w.name.as_str())
        );
        self.notifier.notify_match_changed(&updated);

        let advance = self.advance_locked(tournament_id)?;
        Ok(WinnerSelection {
            updated,
            next_round: advance.next_round,
            champion: advance.champion,
        })
    }

    /// Create any next round that is due and record the champion when the final is decided.
    ///
    /// Idempotent: with nothing to do it returns no new matches.
    pub fn advance(&self, tournament_id: TournamentId) -> Result<Advance, BracketError> {
        self.locked(tournament_id, || self.advance_locked(tournament_id))
    }

    fn advance_locked(&self, tournament_id: TournamentId) -> Result<Advance, BracketError> {
        let mut advance = Advance::default();

        loop {
            let rounds = group_by_round(&self.store.load_matches(tournament_id)?);
            let Some(last) = rounds.last() else {
                return Ok(advance);
            };
            if !is_round_closed(last) {
                return Ok(advance);
            }

            if let [final_match] = last.as_slice() {
                let champion = final_match.winner.clone();
                self.record_champion(tournament_id, champion.clone())?;
                advance.champion = champion;
                return Ok(advance);
            }

            let winners: Vec<Participant> = last.iter().filter_map(|m| m.winner.clone()).collect();
            let round = last[0].round + 1;
            let next = build_next_round(tournament_id, round, &winners);

            match self.store.save_matches(tournament_id, &next) {
                Ok(()) => {
                    log::info!(
                        "Tournament {}: round {} started with {} matches",
                        tournament_id,
                        round,
                        next.len()
                    );
                    for m in &next {
                        self.notifier.notify_match_changed(m);
                    }
                    advance.next_round.extend(next);
                }
                Err(BracketError::ConcurrentAdvanceConflict { round }) => {
                    log::warn!(
                        "Tournament {}: round {} already exists, skipping creation",
                        tournament_id,
                        round
                    );
                    return Ok(advance);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn record_champion(
        &self,
        tournament_id: TournamentId,
        champion: Option<Participant>,
    ) -> Result<(), BracketError> {
        let tournament = self.store.load_tournament(tournament_id)?;
        if tournament.status == TournamentStatus::Completed && tournament.champion == champion {
            return Ok(());
        }
        if let Some(c) = &champion {
            log::info!("Tournament {}: {} is the champion", tournament_id, c.name);
        }
        self.store
            .record_status(tournament_id, TournamentStatus::Completed, champion)
    }

    /// Discard every match of the tournament. Always succeeds for unknown or empty tournaments.
    pub fn reset_bracket(&self, tournament_id: TournamentId) -> Result<(), BracketError> {
        let reset = self.locked(tournament_id, || {
            self.store.delete_all_matches(tournament_id)?;
            self.store
                .record_status(tournament_id, TournamentStatus::Upcoming, None)
        });
        match reset {
            Ok(()) => {
                log::info!("Tournament {}: bracket reset", tournament_id);
                Ok(())
            }
            Err(BracketError::TournamentNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove a tournament and its lock entry.
    pub fn delete_tournament(&self, tournament_id: TournamentId) -> Result<(), BracketError> {
        self.locked(tournament_id, || self.store.delete_tournament(tournament_id))?;
        self.locks.release(tournament_id);
        log::info!("Tournament {} deleted", tournament_id);
        Ok(())
    }

    /// Drop tournaments idle for `timeout` from the store and the lock table.
    pub fn remove_inactive(&self, timeout: Duration) -> Result<Vec<TournamentId>, BracketError> {
        let removed = self.store.remove_inactive(timeout)?;
        for id in &removed {
            if !self.locks.release(*id) {
                log::debug!("Tournament {} removed while a write was in flight", id);
            }
        }
        Ok(removed)
    }

    /// Current bracket view of the tournament.
    pub fn bracket(&self, tournament_id: TournamentId) -> Result<Bracket, BracketError> {
        let matches = self.store.load_matches(tournament_id)?;
        let participant_count = self.store.load_participants(tournament_id)?.len();
        Ok(reconstruct_bracket_view(&matches, participant_count))
    }
}
