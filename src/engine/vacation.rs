//! Vacation mode: pause the quest clock without wiping anybody's progress.
//!
//! Enabling only records the start instant. All the work happens on
//! disable, when every quest cooldown that was still running at the start
//! gets pushed forward by the paused duration. Shop cooldowns and global
//! stock keep real time; a store discount should not outlive the trip.

use chrono::{DateTime, Duration, Utc};
use log::info;

use super::errors::EngineError;
use super::types::GameState;

/// What `disable` did, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacationSummary {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Quest cooldowns pushed forward across all players.
    pub shifted: usize,
}

pub fn enable(state: &mut GameState, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.vacation_mode {
        return Err(EngineError::VacationActive);
    }
    state.vacation_mode = true;
    state.vacation_start_time = Some(now);
    info!("vacation mode enabled");
    Ok(())
}

pub fn disable(state: &mut GameState, now: DateTime<Utc>) -> Result<VacationSummary, EngineError> {
    if !state.vacation_mode {
        return Err(EngineError::VacationNotActive);
    }
    // A missing start stamp means nothing to shift.
    let start = state.vacation_start_time.unwrap_or(now);
    let shift = (now - start).max(Duration::zero());

    let mut shifted = 0;
    if shift > Duration::zero() {
        for player in &mut state.users {
            for until in player.cooldowns.values_mut() {
                // Cooldowns already expired when the vacation began stay put.
                if *until > start {
                    *until += shift;
                    shifted += 1;
                }
            }
        }
    }

    state.vacation_mode = false;
    state.vacation_start_time = None;
    info!(
        "vacation mode disabled after {}h, {shifted} cooldowns shifted",
        shift.num_hours()
    );
    Ok(VacationSummary {
        started_at: start,
        ended_at: now,
        shifted,
    })
}
