//! Shared fixtures for the integration scenarios.
//!
//! Everything is pinned to fixed instants so scenarios replay exactly.
//! 2026-01-05 is a Monday; the weekly window around it opened on Sunday
//! the 4th.

use chorequest::engine::types::{EngineConfig, GameState, PlayerRecord, QuestRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};

#[allow(dead_code)]
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn days(n: i64) -> Duration {
    Duration::days(n)
}

#[allow(dead_code)]
pub fn cfg() -> EngineConfig {
    EngineConfig::default()
}

/// A three-player household with an empty catalog, ready for scenario-
/// specific quests and rewards.
#[allow(dead_code)]
pub fn household() -> GameState {
    let mut state = chorequest::engine::seed_state(monday());
    state.users = vec![
        PlayerRecord::new("alice", "Alice"),
        PlayerRecord::new("bob", "Bob"),
        PlayerRecord::new("cleo", "Cleo"),
    ];
    state.quests.clear();
    state.rewards.clear();
    state
}

#[allow(dead_code)]
pub fn add_quest(state: &mut GameState, quest: QuestRecord) {
    state.quests.push(quest);
}

/// The level invariant every mutation must preserve.
#[allow(dead_code)]
pub fn assert_level_invariant(state: &GameState) {
    for player in &state.users {
        assert_eq!(
            player.level,
            (player.total_xp / 100) as u32 + 1,
            "level invariant broken for {}",
            player.id
        );
    }
}
