//! Vacation mode: the time-shift reconciliation on resume.

mod common;

use chorequest::engine::vacation::{disable, enable};
use common::*;

#[test]
fn cooldowns_gain_exactly_the_paused_duration() {
    let t0 = monday();
    let mut state = household();
    {
        let alice = state.player_mut("alice").unwrap();
        // Still running when the vacation starts.
        alice.cooldowns.insert("dishes".to_string(), t0 + days(5));
        // Already expired before the vacation start: untouched.
        alice.cooldowns.insert("attic".to_string(), t0 - days(1));
    }
    state
        .player_mut("bob")
        .unwrap()
        .cooldowns
        .insert("dishes".to_string(), t0 + days(2));

    // Two-day pause: starts at T0+1d, ends at T0+3d.
    enable(&mut state, t0 + days(1)).unwrap();
    assert!(state.vacation_mode);
    assert_eq!(state.vacation_start_time, Some(t0 + days(1)));

    let summary = disable(&mut state, t0 + days(3)).unwrap();
    assert_eq!(summary.shifted, 2);

    let alice = state.player("alice").unwrap();
    assert_eq!(alice.cooldowns["dishes"], t0 + days(7));
    assert_eq!(alice.cooldowns["attic"], t0 - days(1));
    // Every player's running cooldowns shift, not just one roster slot.
    assert_eq!(state.player("bob").unwrap().cooldowns["dishes"], t0 + days(4));
    assert!(!state.vacation_mode);
    assert!(state.vacation_start_time.is_none());
}

#[test]
fn zero_elapsed_round_trip_is_identity() {
    let t0 = monday();
    let mut state = household();
    state
        .player_mut("alice")
        .unwrap()
        .cooldowns
        .insert("dishes".to_string(), t0 + days(5));

    enable(&mut state, t0).unwrap();
    let summary = disable(&mut state, t0).unwrap();

    assert_eq!(summary.shifted, 0);
    assert_eq!(state.player("alice").unwrap().cooldowns["dishes"], t0 + days(5));
}

#[test]
fn cooldowns_keep_ticking_while_paused() {
    // The pause is realized entirely at disable time: while active,
    // expiry checks still compare literal timestamps.
    let t0 = monday();
    let mut state = household();
    add_quest(
        &mut state,
        chorequest::engine::types::QuestRecord::new("dishes", "Do the dishes")
            .with_repeatable(true),
    );
    state
        .player_mut("alice")
        .unwrap()
        .cooldowns
        .insert("dishes".to_string(), t0 + days(1));

    enable(&mut state, t0).unwrap();
    let quest = state.quest("dishes").unwrap().clone();
    let alice = state.player("alice").unwrap();
    assert!(!chorequest::engine::is_quest_visible(&quest, alice, t0, cfg().tz));
    assert!(chorequest::engine::is_quest_visible(
        &quest,
        alice,
        t0 + days(2),
        cfg().tz
    ));
}
