//! Integration tests for team registration, the memory store and exports.

use knockout_bracket_web::{
    export_matches_csv, export_tournament_json, BracketEngine, BracketError, BroadcastNotifier,
    MatchNotifier, MatchScore, MatchStatus, MatchStore, MemoryStore, SeedingPolicy, Tournament,
};
use chrono::NaiveDate;
use std::time::Duration;
use uuid::Uuid;

#[test]
fn tournament_needs_a_name_and_room_for_two_teams() {
    assert_eq!(Tournament::new("  ", 8), Err(BracketError::InvalidName));
    assert_eq!(Tournament::new("Cup", 1), Err(BracketError::InvalidCapacity));
    let t = Tournament::new(" Cup ", 2).unwrap();
    assert_eq!(t.name, "Cup");
}

#[test]
fn add_team_validates_names_and_capacity() {
    let store = MemoryStore::new();
    let t = store.create_tournament(Tournament::new("Cup", 2).unwrap()).unwrap();

    store.add_team(t.id, "  Lions ").unwrap();
    assert_eq!(store.add_team(t.id, "lions"), Err(BracketError::DuplicateTeamName));
    assert_eq!(store.add_team(t.id, " "), Err(BracketError::InvalidName));
    store.add_team(t.id, "Tigers").unwrap();
    assert_eq!(
        store.add_team(t.id, "Bears"),
        Err(BracketError::TournamentFull { capacity: 2 })
    );

    let names: Vec<_> = store
        .load_participants(t.id)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Lions", "Tigers"]);
}

#[test]
fn teams_are_frozen_while_a_bracket_exists() {
    let engine = BracketEngine::new(MemoryStore::new());
    let store = engine.store();
    let t = store.create_tournament(Tournament::new("Cup", 4).unwrap()).unwrap();
    let lions = store.add_team(t.id, "Lions").unwrap();
    store.add_team(t.id, "Tigers").unwrap();

    engine.generate_bracket(t.id, SeedingPolicy::Standard).unwrap();
    assert_eq!(store.add_team(t.id, "Bears"), Err(BracketError::BracketInProgress));
    assert_eq!(store.remove_team(t.id, lions.id), Err(BracketError::BracketInProgress));

    engine.reset_bracket(t.id).unwrap();
    store.remove_team(t.id, lions.id).unwrap();
    assert_eq!(
        store.remove_team(t.id, lions.id),
        Err(BracketError::TeamNotFound(lions.id))
    );
    assert_eq!(store.roster(t.id).unwrap().teams.len(), 1);
}

#[test]
fn unknown_tournament_is_reported() {
    let store = MemoryStore::new();
    let missing = Uuid::new_v4();
    assert_eq!(
        store.load_matches(missing),
        Err(BracketError::TournamentNotFound(missing))
    );
    assert_eq!(
        store.add_team(missing, "Lions"),
        Err(BracketError::TournamentNotFound(missing))
    );
    assert_eq!(
        store.delete_tournament(missing),
        Err(BracketError::TournamentNotFound(missing))
    );
    store.delete_all_matches(missing).unwrap();
}

#[test]
fn decided_matches_cannot_be_updated_again() {
    let engine = BracketEngine::new(MemoryStore::new());
    let store = engine.store();
    let t = store.create_tournament(Tournament::new("Cup", 4).unwrap()).unwrap();
    for name in ["A", "B", "C"] {
        store.add_team(t.id, name).unwrap();
    }
    let round = engine.generate_bracket(t.id, SeedingPolicy::Standard).unwrap();
    let bye = round.iter().find(|m| m.is_bye()).unwrap();
    let team = bye.slot_a.participant().unwrap().clone();

    assert_eq!(
        store.update_match(t.id, bye.id, team, None, MatchStatus::Completed),
        Err(BracketError::InvalidMatch(bye.id))
    );
}

#[test]
fn inactive_tournaments_are_removed() {
    let store = MemoryStore::new();
    let t = store.create_tournament(Tournament::new("Cup", 4).unwrap()).unwrap();
    assert!(store.remove_inactive(Duration::from_secs(3600)).unwrap().is_empty());
    assert_eq!(store.remove_inactive(Duration::ZERO).unwrap(), vec![t.id]);
    assert!(store.list_tournaments().unwrap().is_empty());
}

#[test]
fn csv_export_lists_every_match() {
    let engine = BracketEngine::new(MemoryStore::new());
    let store = engine.store();
    let t = Tournament::new("Spring Cup", 4)
        .unwrap()
        .with_location("Hall 2")
        .with_date(NaiveDate::from_ymd_opt(2026, 4, 1));
    let t = store.create_tournament(t).unwrap();
    for name in ["Lions", "Tigers", "Bears"] {
        store.add_team(t.id, name).unwrap();
    }
    let round = engine.generate_bracket(t.id, SeedingPolicy::Standard).unwrap();
    let semi = &round[1];
    let bears = semi.slot_b.participant().unwrap().id;
    engine
        .select_winner_with_score(t.id, semi.id, bears, Some(MatchScore::new(1, 3)))
        .unwrap();

    let csv = export_matches_csv(&t, &engine.bracket(t.id).unwrap()).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Tournament: Spring Cup");
    assert_eq!(lines[1], "Location: Hall 2");
    assert_eq!(lines[2], "Date: 2026-04-01");
    assert_eq!(
        lines[4],
        "Round,Match,Team A,Score A,Team B,Score B,Winner,Status"
    );
    assert_eq!(lines[5], "Semi Final,1,Lions,-,BYE,-,Lions,bye");
    assert_eq!(lines[6], "Semi Final,2,Tigers,1,Bears,3,Bears,completed");
    assert_eq!(lines[7], "Final,1,Lions,-,Bears,-,-,scheduled");
    assert_eq!(lines.len(), 8);
}

#[test]
fn json_export_includes_bracket_and_progress() {
    let engine = BracketEngine::new(MemoryStore::new());
    let store = engine.store();
    let t = store.create_tournament(Tournament::new("Cup", 2).unwrap()).unwrap();
    store.add_team(t.id, "Lions").unwrap();
    store.add_team(t.id, "Tigers").unwrap();
    engine.generate_bracket(t.id, SeedingPolicy::Standard).unwrap();

    let roster = store.roster(t.id).unwrap();
    let json = export_tournament_json(&roster.tournament, &roster.teams, &engine.bracket(t.id).unwrap())
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["tournament"]["status"], "active");
    assert_eq!(value["teams"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["bracket"]["total_rounds"], 1);
    assert_eq!(value["bracket"]["rounds"][0][0]["slot_a"]["kind"], "team");
    assert_eq!(value["progress"], 0);
    assert!(value["exported_at"].is_string());
}

#[test]
fn broadcast_notifier_delivers_to_subscribers() {
    let notifier = BroadcastNotifier::new(8);
    let mut rx = notifier.subscribe();

    let engine = BracketEngine::with_notifier(MemoryStore::new(), notifier);
    let store = engine.store();
    let t = store.create_tournament(Tournament::new("Cup", 2).unwrap()).unwrap();
    store.add_team(t.id, "Lions").unwrap();
    store.add_team(t.id, "Tigers").unwrap();
    let round = engine.generate_bracket(t.id, SeedingPolicy::Standard).unwrap();

    let received = rx.try_recv().unwrap();
    assert_eq!(received.id, round[0].id);

    // Without subscribers, sending is silently dropped.
    drop(rx);
    engine.notifier().notify_match_changed(&round[0]);
}
