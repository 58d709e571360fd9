//! The weekly goal window: one flat bonus per Sunday-anchored window,
//! fired exactly when progress hits the goal.

mod common;

use chorequest::engine::types::QuestRecord;
use chorequest::engine::{approve, submit};
use common::*;

fn state_with_goal(goal: u32) -> chorequest::engine::types::GameState {
    let mut state = household();
    state.weekly_goal = goal;
    add_quest(
        &mut state,
        QuestRecord::new("dishes", "Do the dishes")
            .with_xp(10)
            .with_repeatable(true)
            .with_cooldown_days(0),
    );
    state
}

#[test]
fn bonus_fires_exactly_once_per_window() {
    let mut state = state_with_goal(3);

    for round in 1..=4 {
        submit(&mut state, "alice", "dishes").unwrap();
        let outcome = approve(&mut state, "alice", "dishes", monday(), &cfg()).unwrap();
        match round {
            3 => {
                assert!(outcome.weekly_goal_met, "3rd approval hits the goal");
                assert_eq!(outcome.xp_awarded, 110);
            }
            _ => {
                assert!(!outcome.weekly_goal_met);
                assert_eq!(outcome.xp_awarded, 10);
            }
        }
    }
    // 4 quests x 10 XP + one 100 bonus.
    assert_eq!(state.player("alice").unwrap().total_xp, 140);
    assert_eq!(state.player("alice").unwrap().weekly_progress, 4);
}

#[test]
fn window_roll_resets_progress_and_rearms_the_bonus() {
    let mut state = state_with_goal(2);

    for _ in 0..2 {
        submit(&mut state, "bob", "dishes").unwrap();
        approve(&mut state, "bob", "dishes", monday(), &cfg()).unwrap();
    }
    assert_eq!(state.player("bob").unwrap().weekly_progress, 2);

    // The next Sunday opens a fresh window: progress restarts and the
    // bonus can fire again.
    let next_monday = monday() + days(7);
    submit(&mut state, "bob", "dishes").unwrap();
    let outcome = approve(&mut state, "bob", "dishes", next_monday, &cfg()).unwrap();
    assert!(!outcome.weekly_goal_met);
    assert_eq!(state.player("bob").unwrap().weekly_progress, 1);

    submit(&mut state, "bob", "dishes").unwrap();
    let outcome = approve(&mut state, "bob", "dishes", next_monday, &cfg()).unwrap();
    assert!(outcome.weekly_goal_met);
}

#[test]
fn progress_is_tracked_per_player() {
    let mut state = state_with_goal(2);

    submit(&mut state, "alice", "dishes").unwrap();
    approve(&mut state, "alice", "dishes", monday(), &cfg()).unwrap();
    submit(&mut state, "bob", "dishes").unwrap();
    let outcome = approve(&mut state, "bob", "dishes", monday(), &cfg()).unwrap();

    // Bob's first approval does not inherit Alice's progress.
    assert!(!outcome.weekly_goal_met);
    assert_eq!(state.player("alice").unwrap().weekly_progress, 1);
    assert_eq!(state.player("bob").unwrap().weekly_progress, 1);
}
