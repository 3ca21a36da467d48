//! Integration tests for the reconstructed bracket view.

use knockout_bracket_web::{
    build_first_round, build_next_round, reconstruct_bracket_view, round_name, BracketMatch,
    MatchStatus, Participant, Slot,
};
use uuid::Uuid;

fn teams(n: usize) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(format!("T{i}"))).collect()
}

fn decide(m: &mut BracketMatch, pick_a: bool) {
    let slot = if pick_a { &m.slot_a } else { &m.slot_b };
    m.winner = slot.participant().cloned();
    m.status = MatchStatus::Completed;
}

#[test]
fn empty_match_list_gives_an_empty_bracket() {
    let bracket = reconstruct_bracket_view(&[], 6);
    assert!(bracket.is_empty());
    assert_eq!(bracket.total_rounds, 3);
    assert_eq!(bracket.current_round, 0);
    assert!(bracket.champion.is_none());
    assert_eq!(bracket.progress(), 0);
    assert!(bracket.projected_rounds().is_empty());
}

#[test]
fn rounds_are_grouped_and_sorted_by_position() {
    let id = Uuid::new_v4();
    let mut matches = build_first_round(id, &teams(8)).unwrap();
    matches.reverse();

    let bracket = reconstruct_bracket_view(&matches, 8);
    assert_eq!(bracket.current_round, 1);
    assert_eq!(bracket.total_rounds, 3);
    let positions: Vec<_> = bracket.rounds[0].iter().map(|m| m.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
    assert_eq!(bracket.round(1).map(<[_]>::len), Some(4));
    assert!(bracket.round(2).is_none());
}

#[test]
fn partial_progress_is_tolerated() {
    let id = Uuid::new_v4();
    let t = teams(5);
    let mut matches = build_first_round(id, &t).unwrap();
    // 3 byes of 4 matches are decided.
    let bracket = reconstruct_bracket_view(&matches, t.len());
    assert_eq!(bracket.progress(), 75);
    assert!(bracket.champion.is_none());

    decide(&mut matches[3], true);
    let winners: Vec<_> = matches.iter().filter_map(|m| m.winner.clone()).collect();
    matches.extend(build_next_round(id, 2, &winners));

    let bracket = reconstruct_bracket_view(&matches, t.len());
    assert_eq!(bracket.current_round, 2);
    assert_eq!(bracket.total_rounds, 3);
    assert!(bracket.champion.is_none());
    assert_eq!(bracket.progress(), 67);
}

#[test]
fn champion_is_the_decided_final_winner() {
    let id = Uuid::new_v4();
    let t = teams(2);
    let mut matches = build_first_round(id, &t).unwrap();
    assert!(reconstruct_bracket_view(&matches, 2).champion.is_none());

    decide(&mut matches[0], false);
    let bracket = reconstruct_bracket_view(&matches, 2);
    assert_eq!(bracket.champion, Some(t[1].clone()));
    assert!(bracket.projected_rounds().is_empty());
}

#[test]
fn lone_decided_match_before_the_final_is_not_a_champion() {
    let id = Uuid::new_v4();
    let t = teams(2);
    let mut matches = build_first_round(id, &t).unwrap();
    decide(&mut matches[0], true);

    // Same single match, but the roster says three rounds are needed.
    let bracket = reconstruct_bracket_view(&matches, 5);
    assert_eq!(bracket.total_rounds, 3);
    assert!(bracket.champion.is_none());
}

#[test]
fn projected_rounds_fill_the_rest_of_the_tree() {
    let id = Uuid::new_v4();
    let t = teams(5);
    let matches = build_first_round(id, &t).unwrap();
    let bracket = reconstruct_bracket_view(&matches, t.len());

    let projected = bracket.projected_rounds();
    assert_eq!(projected.len(), 2);

    // Round 2: known bye winners, TBD where T4 vs T5 is pending.
    assert_eq!(projected[0].len(), 2);
    assert_eq!(projected[0][0].round, 2);
    assert_eq!(projected[0][0].slot_a, Slot::Team(t[0].clone()));
    assert_eq!(projected[0][0].slot_b, Slot::Team(t[1].clone()));
    assert_eq!(projected[0][1].slot_a, Slot::Team(t[2].clone()));
    assert_eq!(projected[0][1].slot_b, Slot::Tbd);

    // Final: both sides still open.
    assert_eq!(projected[1].len(), 1);
    assert_eq!(projected[1][0].round, 3);
    assert_eq!(projected[1][0].slot_a, Slot::Tbd);
    assert_eq!(projected[1][0].slot_b, Slot::Tbd);
}

#[test]
fn projected_round_with_odd_feeders_gets_an_empty_seat() {
    let id = Uuid::new_v4();
    let winners = teams(6);
    // Round 2 of 6 winners: 3 matches; the next round has an unpaired seat.
    let round_two = build_next_round(id, 2, &winners);
    let mut round_one = build_next_round(id, 1, &teams(12));
    for m in &mut round_one {
        decide(m, true);
    }
    let mut matches = round_one;
    matches.extend(round_two);

    let bracket = reconstruct_bracket_view(&matches, 12);
    let projected = bracket.projected_rounds();
    assert_eq!(bracket.total_rounds, 4);
    assert_eq!(projected.len(), 2);
    assert_eq!(projected[0].len(), 2);
    assert_eq!(projected[0][1].slot_a, Slot::Tbd);
    assert_eq!(projected[0][1].slot_b, Slot::Empty);
    assert_eq!(projected[1].len(), 1);
}

#[test]
fn round_names_count_back_from_the_final() {
    assert_eq!(round_name(4, 4), "Final");
    assert_eq!(round_name(3, 4), "Semi Final");
    assert_eq!(round_name(2, 4), "Quarter Final");
    assert_eq!(round_name(1, 4), "Round 1");
    assert_eq!(round_name(1, 1), "Final");
    assert_eq!(round_name(5, 4), "Round 5");
}
