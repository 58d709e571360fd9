//! # Chorequest - a quest/reward economy engine for households
//!
//! Chorequest gamifies household task tracking: players complete quests for
//! XP and gems, XP drives levels and daily streaks, and gems buy rewards
//! from a two-tier shop. A parent approves or denies submissions, manages
//! the roster and catalog, and can pause the whole economy with vacation
//! mode.
//!
//! ## Features
//!
//! - **Deterministic rules core**: every operation takes one explicitly
//!   sampled instant, so any scenario can be replayed exactly in tests.
//! - **Quest lifecycle**: submit → pending → approve/deny, with per-quest
//!   cooldowns, weekday schedules, rotating assignment and loot drops.
//! - **Progression**: levels from XP, consecutive-day streaks, a Sunday-
//!   anchored weekly goal bonus and a once-daily login bonus.
//! - **Two-tier shop**: global stock shared by the household or personal
//!   stock per player, with purchase cooldowns and a daily cap.
//! - **Vacation mode**: pausing shifts every outstanding quest cooldown
//!   forward by the paused duration on resume.
//! - **Bulk exchange**: spreadsheet CSV for the catalogs and a full JSON
//!   backup, with permissive, reported import coercions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chorequest::engine::{self, Clock, SystemClock};
//! use chorequest::engine::types::EngineConfig;
//! use chorequest::store::StateStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let clock = SystemClock;
//!     let store = StateStore::new("data/state.json");
//!
//!     let now = clock.now();
//!     let mut state = store.load().await?.unwrap_or_else(|| engine::seed_state(now));
//!
//!     engine::submit(&mut state, "u1", "sweep_dust_bunnies")?;
//!     engine::approve(&mut state, "u1", "sweep_dust_bunnies", now, &EngineConfig::default())?;
//!
//!     store.save(&mut state, clock.now()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - the synchronous rules core: types, progression, quest
//!   scheduling, approval, shop, vacation mode and seeding
//! - [`store`] - the snapshot document store (load/save, last-write-wins)
//! - [`exchange`] - CSV catalog exchange and the full backup format
//! - [`config`] - TOML configuration
//! - [`validation`] - input validation for names, titles and passcodes

pub mod config;
pub mod engine;
pub mod exchange;
pub mod store;
pub mod validation;
