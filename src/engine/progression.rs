//! Player progression: levels from XP, the once-daily login bonus, streak
//! continuity and the weekly goal window.
//!
//! Streak and weekly evaluation are pure helpers invoked from the approval
//! path; only the login bonus mutates state directly here.

use chrono::{DateTime, FixedOffset, Utc};
use log::debug;

use super::clock::{local_day, same_local_day, week_start};
use super::errors::EngineError;
use super::types::{
    EngineConfig, GameState, Notification, NotificationKind, PlayerRecord, LOGIN_BONUS_XP,
    WEEKLY_BONUS_XP, XP_PER_LEVEL,
};

/// `level = total_xp / 100 + 1`; never below 1.
pub fn level_for(total_xp: u64) -> u32 {
    (total_xp / XP_PER_LEVEL) as u32 + 1
}

/// Add XP and recompute the level. Returns true when the level rose.
pub(crate) fn grant_xp(player: &mut PlayerRecord, xp: u64) -> bool {
    player.total_xp += xp;
    let new_level = level_for(player.total_xp);
    let leveled_up = new_level > player.level;
    player.level = new_level;
    leveled_up
}

/// What `grant_login_bonus` did. `leveled_up` is the caller's celebration
/// cue; nothing is rendered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    pub granted: bool,
    pub leveled_up: bool,
    pub level: u32,
}

/// Once-daily activation bonus: +50 XP the first time a player shows up on
/// a household-local calendar day.
pub fn grant_login_bonus(
    state: &mut GameState,
    player_id: &str,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> Result<LoginOutcome, EngineError> {
    let player = state.require_player_mut(player_id)?;

    if let Some(last) = player.last_login_bonus_date {
        if same_local_day(last, now, cfg.tz) {
            return Ok(LoginOutcome {
                granted: false,
                leveled_up: false,
                level: player.level,
            });
        }
    }

    let leveled_up = grant_xp(player, LOGIN_BONUS_XP);
    player.last_login_bonus_date = Some(now);

    let mut batch = Vec::new();
    if leveled_up {
        batch.push(Notification::new(
            format!("LEVEL UP! You reached Level {}!", player.level),
            NotificationKind::Celebration,
            now,
        ));
    }
    batch.push(Notification::new(
        format!("Daily Login Bonus! +{LOGIN_BONUS_XP} XP"),
        NotificationKind::Celebration,
        now,
    ));
    player.notify_batch(batch);

    debug!(
        "login bonus granted to {player_id}, level {} (leveled_up: {leveled_up})",
        player.level
    );
    Ok(LoginOutcome {
        granted: true,
        leveled_up,
        level: player.level,
    })
}

/// Result of comparing the last quest day against today.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StreakEval {
    pub streak: u32,
    /// Message and severity for the approval batch; None on a same-day
    /// approval (streak untouched).
    pub message: Option<(String, NotificationKind)>,
}

/// Streak rule, evaluated on approval: same local day leaves the streak
/// alone, the day after the last quest extends it, anything else restarts
/// at 1.
pub(crate) fn evaluate_streak(
    player: &PlayerRecord,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> StreakEval {
    let today = local_day(now, tz);
    let last = player.last_quest_date.map(|at| local_day(at, tz));

    if last == Some(today) {
        return StreakEval {
            streak: player.streak,
            message: None,
        };
    }

    if last == Some(today - chrono::Duration::days(1)) {
        let streak = player.streak + 1;
        return StreakEval {
            streak,
            message: Some((
                format!("🔥 Streak Increased: {streak} Days!"),
                NotificationKind::Celebration,
            )),
        };
    }

    StreakEval {
        streak: 1,
        message: Some((
            "🔥 Daily Streak Started!".to_string(),
            NotificationKind::Success,
        )),
    }
}

/// Result of rolling the weekly window and counting one approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WeeklyEval {
    pub progress: u32,
    /// New value for `last_weekly_reset`.
    pub reset_at: DateTime<Utc>,
    pub goal_met: bool,
    pub bonus_xp: u64,
}

/// Weekly goal rule: reset progress when a newer Sunday boundary is
/// observed, count this approval, and pay the flat bonus exactly when the
/// goal is hit (strict equality, so overshooting pays nothing until the
/// next window).
pub(crate) fn advance_weekly_progress(
    player: &PlayerRecord,
    weekly_goal: u32,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> WeeklyEval {
    let window = week_start(now, tz);
    let (prior, reset_at) = match player.last_weekly_reset {
        Some(prev) if window <= prev => (player.weekly_progress, prev),
        _ => (0, window),
    };
    let progress = prior + 1;
    let goal_met = progress == weekly_goal;
    WeeklyEval {
        progress,
        reset_at,
        goal_met,
        bonus_xp: if goal_met { WEEKLY_BONUS_XP } else { 0 },
    }
}
