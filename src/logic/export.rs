//! Tie sheet export: CSV match list and full JSON snapshot.

use crate::logic::view::{round_name, Bracket};
use crate::models::{BracketError, Participant, Tournament};
use chrono::{DateTime, Utc};
use serde::Serialize;

impl From<csv::Error> for BracketError {
    fn from(e: csv::Error) -> Self {
        BracketError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for BracketError {
    fn from(e: serde_json::Error) -> Self {
        BracketError::Storage(e.to_string())
    }
}

/// Matches as CSV: a title block, then one row per match in round/position order.
pub fn export_matches_csv(tournament: &Tournament, bracket: &Bracket) -> Result<String, BracketError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([format!("Tournament: {}", tournament.name)])?;
    if !tournament.location.is_empty() {
        writer.write_record([format!("Location: {}", tournament.location)])?;
    }
    if let Some(date) = tournament.date {
        writer.write_record([format!("Date: {}", date)])?;
    }
    writer.write_record([""])?;
    writer.write_record([
        "Round", "Match", "Team A", "Score A", "Team B", "Score B", "Winner", "Status",
    ])?;

    let score = |s: Option<u32>| s.map_or_else(|| "-".to_string(), |s| s.to_string());
    for m in bracket.matches() {
        let round = round_name(m.round, bracket.total_rounds);
        let number = (m.position + 1).to_string();
        let winner = m.winner.as_ref().map_or("-", |w| w.name.as_str());
        writer.write_record([
            round.as_str(),
            number.as_str(),
            m.slot_a.label(),
            score(m.score_a).as_str(),
            m.slot_b.label(),
            score(m.score_b).as_str(),
            winner,
            m.status.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BracketError::Storage(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BracketError::Storage(e.to_string()))
}

#[derive(Serialize)]
struct TournamentExport<'a> {
    tournament: &'a Tournament,
    teams: &'a [Participant],
    bracket: &'a Bracket,
    progress: u8,
    exported_at: DateTime<Utc>,
}

/// Tournament, teams and bracket as pretty-printed JSON.
pub fn export_tournament_json(
    tournament: &Tournament,
    teams: &[Participant],
    bracket: &Bracket,
) -> Result<String, BracketError> {
    let export = TournamentExport {
        tournament,
        teams,
        bracket,
        progress: bracket.progress(),
        exported_at: Utc::now(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
