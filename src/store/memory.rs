//! In-memory store: tournaments, their teams and a match arena per tournament.

use crate::models::{
    BracketError, BracketMatch, MatchId, MatchScore, MatchStatus, Participant, ParticipantId,
    Tournament, TournamentId, TournamentStatus,
};
use crate::store::MatchStore;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    teams: Vec<Participant>,
    matches: HashMap<MatchId, BracketMatch>,
    last_activity: Instant,
}

impl TournamentEntry {
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Tournament plus its teams (for API responses).
#[derive(Clone, Debug, Serialize)]
pub struct TeamRoster {
    pub tournament: Tournament,
    pub teams: Vec<Participant>,
}

/// Many tournaments by id, guarded by one lock.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<TournamentId, TournamentEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<TournamentId, TournamentEntry>>, BracketError> {
        self.entries
            .read()
            .map_err(|_| BracketError::Storage("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<TournamentId, TournamentEntry>>, BracketError> {
        self.entries
            .write()
            .map_err(|_| BracketError::Storage("lock error".to_string()))
    }

    /// Insert a new tournament and return it.
    pub fn create_tournament(&self, tournament: Tournament) -> Result<Tournament, BracketError> {
        let mut g = self.write()?;
        g.insert(
            tournament.id,
            TournamentEntry {
                tournament: tournament.clone(),
                teams: Vec::new(),
                matches: HashMap::new(),
                last_activity: Instant::now(),
            },
        );
        Ok(tournament)
    }

    /// All tournaments, newest first.
    pub fn list_tournaments(&self) -> Result<Vec<Tournament>, BracketError> {
        let g = self.read()?;
        let mut tournaments: Vec<_> = g.values().map(|e| e.tournament.clone()).collect();
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tournaments)
    }

    /// Tournament with its teams. Touching it refreshes last_activity.
    pub fn roster(&self, tournament_id: TournamentId) -> Result<TeamRoster, BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        entry.touch();
        Ok(TeamRoster {
            tournament: entry.tournament.clone(),
            teams: entry.teams.clone(),
        })
    }

    /// Register a team. Names are trimmed and unique (case-insensitive); capacity is enforced.
    pub fn add_team(
        &self,
        tournament_id: TournamentId,
        name: impl Into<String>,
    ) -> Result<Participant, BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        entry.touch();
        if !entry.matches.is_empty() {
            return Err(BracketError::BracketInProgress);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(BracketError::InvalidName);
        }
        let is_duplicate = entry
            .teams
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(BracketError::DuplicateTeamName);
        }
        let capacity = entry.tournament.team_count;
        if entry.teams.len() >= capacity {
            return Err(BracketError::TournamentFull { capacity });
        }
        let team = Participant::new(name_trimmed);
        entry.teams.push(team.clone());
        Ok(team)
    }

    /// Remove a team by id (only while no bracket exists).
    pub fn remove_team(
        &self,
        tournament_id: TournamentId,
        team_id: ParticipantId,
    ) -> Result<(), BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        entry.touch();
        if !entry.matches.is_empty() {
            return Err(BracketError::BracketInProgress);
        }
        let idx = entry
            .teams
            .iter()
            .position(|p| p.id == team_id)
            .ok_or(BracketError::TeamNotFound(team_id))?;
        entry.teams.remove(idx);
        Ok(())
    }
}

impl MatchStore for MemoryStore {
    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Tournament, BracketError> {
        let g = self.read()?;
        g.get(&tournament_id)
            .map(|e| e.tournament.clone())
            .ok_or(BracketError::TournamentNotFound(tournament_id))
    }

    fn load_participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, BracketError> {
        let g = self.read()?;
        g.get(&tournament_id)
            .map(|e| e.teams.clone())
            .ok_or(BracketError::TournamentNotFound(tournament_id))
    }

    fn load_matches(&self, tournament_id: TournamentId) -> Result<Vec<BracketMatch>, BracketError> {
        let g = self.read()?;
        let entry = g
            .get(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        let mut matches: Vec<_> = entry.matches.values().cloned().collect();
        matches.sort_by_key(|m| (m.round, m.position));
        Ok(matches)
    }

    fn save_matches(
        &self,
        tournament_id: TournamentId,
        matches: &[BracketMatch],
    ) -> Result<(), BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        entry.touch();
        // Validate the whole batch before writing anything.
        if let Some(taken) = matches.iter().find(|new| {
            entry
                .matches
                .values()
                .any(|m| m.round == new.round && m.position == new.position)
        }) {
            return Err(BracketError::ConcurrentAdvanceConflict { round: taken.round });
        }
        for m in matches {
            entry.matches.insert(m.id, m.clone());
        }
        Ok(())
    }

    fn update_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner: Participant,
        score: Option<MatchScore>,
        status: MatchStatus,
    ) -> Result<BracketMatch, BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        entry.touch();
        let m = entry
            .matches
            .get_mut(&match_id)
            .ok_or(BracketError::InvalidMatch(match_id))?;
        // Winners are immutable once set.
        if m.winner.is_some() {
            return Err(BracketError::InvalidMatch(match_id));
        }
        m.winner = Some(winner);
        m.score_a = score.map(|s| s.a);
        m.score_b = score.map(|s| s.b);
        m.status = status;
        m.decided_at = Some(Utc::now());
        Ok(m.clone())
    }

    fn delete_all_matches(&self, tournament_id: TournamentId) -> Result<(), BracketError> {
        let mut g = self.write()?;
        if let Some(entry) = g.get_mut(&tournament_id) {
            entry.touch();
            entry.matches.clear();
        }
        Ok(())
    }

    fn delete_tournament(&self, tournament_id: TournamentId) -> Result<(), BracketError> {
        let mut g = self.write()?;
        g.remove(&tournament_id)
            .map(|_| ())
            .ok_or(BracketError::TournamentNotFound(tournament_id))
    }

    fn remove_inactive(&self, timeout: Duration) -> Result<Vec<TournamentId>, BracketError> {
        let mut g = self.write()?;
        let expired: Vec<TournamentId> = g
            .iter()
            .filter(|(_, entry)| entry.last_activity.elapsed() >= timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            g.remove(id);
        }
        Ok(expired)
    }

    fn record_status(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
        champion: Option<Participant>,
    ) -> Result<(), BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        entry.tournament.status = status;
        entry.tournament.champion = champion;
        Ok(())
    }
}
