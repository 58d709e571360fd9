//! Snapshot store behavior: first-run absence, round-trips, stamping and
//! corruption handling.

mod common;

use chorequest::engine::seed_state;
use chorequest::store::{StateStore, StoreError};
use common::*;
use tempfile::tempdir;

#[tokio::test]
async fn missing_file_loads_none() {
    let tmp = tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn save_then_load_round_trips_and_stamps() {
    let tmp = tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("nested/dir/state.json"));

    let mut state = seed_state(monday());
    state.users[0].total_xp = 250;
    state.users[0].level = 3;
    state
        .users[0]
        .cooldowns
        .insert("sweep_dust_bunnies".to_string(), monday() + days(1));

    let saved_at = monday() + chrono::Duration::minutes(5);
    store.save(&mut state, saved_at).await.unwrap();
    assert_eq!(state.last_updated, saved_at);

    let loaded = store.load().await.unwrap().expect("snapshot present");
    assert_eq!(loaded, state);
    assert_eq!(loaded.last_updated, saved_at);
}

#[tokio::test]
async fn save_replaces_the_whole_document() {
    let tmp = tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));

    let mut first = seed_state(monday());
    store.save(&mut first, monday()).await.unwrap();

    let mut second = seed_state(monday());
    second.users[0].gems = 42;
    second.weekly_goal = 3;
    store.save(&mut second, monday() + days(1)).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.users[0].gems, 42);
    assert_eq!(loaded.weekly_goal, 3);
}

#[tokio::test]
async fn corrupt_file_is_an_error_not_a_reset() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("state.json");
    tokio::fs::write(&path, "{definitely not json").await.unwrap();

    let store = StateStore::new(path);
    assert!(matches!(
        store.load().await,
        Err(StoreError::Corrupt { .. })
    ));
}

#[tokio::test]
async fn no_stray_temp_files_after_save() {
    let tmp = tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    let mut state = seed_state(monday());
    store.save(&mut state, monday()).await.unwrap();
    store.save(&mut state, monday() + days(1)).await.unwrap();

    let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    assert_eq!(names, vec!["state.json".to_string()]);
}
