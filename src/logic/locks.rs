//! Per-tournament mutual exclusion for bracket writes.

use crate::models::TournamentId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One mutex per tournament; writers of different tournaments never contend.
///
/// Entries are created on first use and dropped with `release` once the
/// tournament is gone, so the table tracks the live tournaments only.
#[derive(Debug, Default)]
pub struct TournamentLocks {
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<TournamentId, Arc<Mutex<()>>>> {
        // The map only holds unit mutexes, so a poisoned guard carries no broken state.
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The lock guarding this tournament's bracket, created on first use.
    pub fn for_tournament(&self, tournament_id: TournamentId) -> Arc<Mutex<()>> {
        self.table().entry(tournament_id).or_default().clone()
    }

    /// Drop the entry unless a writer still holds it. Returns true if it was removed.
    pub fn release(&self, tournament_id: TournamentId) -> bool {
        let mut locks = self.table();
        // Clones are only handed out under the table lock, so the count is stable here.
        let idle = locks
            .get(&tournament_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(&tournament_id);
        }
        idle
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}
