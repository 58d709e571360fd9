//! The submit → pending → approved/denied lifecycle.
//!
//! `approve` is the heart of the economy: one call grants XP and gems,
//! evaluates the streak and weekly goal, drops loot, writes history, emits
//! the notification batch and advances rotation. Everything is computed
//! from the single `now` the caller sampled, so no two effects of one
//! approval can disagree about the time.

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::clock::days_after;
use super::errors::EngineError;
use super::progression::{advance_weekly_progress, evaluate_streak, grant_xp};
use super::scheduler::RotationRoster;
use super::types::{
    EngineConfig, GameState, HistoryEntry, InventoryItem, Notification, NotificationKind,
    QuestKind, WEEKLY_BONUS_XP,
};

/// What an approval granted and triggered. `leveled_up` is the caller's
/// celebration cue.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalOutcome {
    /// Quest XP plus any weekly bonus.
    pub xp_awarded: u64,
    pub gems_awarded: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub streak: u32,
    pub weekly_goal_met: bool,
    /// Loot text, when the quest dropped an item.
    pub loot: Option<String>,
    /// New holder after rotation advancement.
    pub next_assignee: Option<String>,
}

/// Player marks a quest done; it waits in `pending_ids` for review.
pub fn submit(state: &mut GameState, player_id: &str, quest_id: &str) -> Result<(), EngineError> {
    state.require_quest(quest_id)?;
    let player = state.require_player_mut(player_id)?;
    player.pending_ids.insert(quest_id.to_string());
    debug!("{player_id} submitted quest {quest_id}");
    Ok(())
}

/// Player withdraws a submission before review.
pub fn undo_submit(
    state: &mut GameState,
    player_id: &str,
    quest_id: &str,
) -> Result<(), EngineError> {
    let player = state.require_player_mut(player_id)?;
    if !player.pending_ids.remove(quest_id) {
        return Err(EngineError::NotPending {
            player_id: player_id.to_string(),
            quest_id: quest_id.to_string(),
        });
    }
    Ok(())
}

/// Parent rejects a submission. No economy effect, just the bad news.
pub fn deny(
    state: &mut GameState,
    player_id: &str,
    quest_id: &str,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    // The quest may have been deleted from the catalog while pending.
    let task = state
        .quest(quest_id)
        .map(|q| q.task.clone())
        .unwrap_or_else(|| "Mission".to_string());
    let player = state.require_player_mut(player_id)?;
    if !player.pending_ids.remove(quest_id) {
        return Err(EngineError::NotPending {
            player_id: player_id.to_string(),
            quest_id: quest_id.to_string(),
        });
    }
    player.notify(
        format!("Mission Denied: {task}"),
        NotificationKind::Error,
        now,
    );
    info!("denied quest {quest_id} for {player_id}");
    Ok(())
}

/// Parent approves a pending submission and every side effect lands at once.
///
/// The pending guard makes a second call with the same ids an error rather
/// than a double grant.
pub fn approve(
    state: &mut GameState,
    player_id: &str,
    quest_id: &str,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> Result<ApprovalOutcome, EngineError> {
    let quest = state.require_quest(quest_id)?.clone();
    let weekly_goal = state.weekly_goal;

    if !state
        .require_player(player_id)?
        .pending_ids
        .contains(quest_id)
    {
        return Err(EngineError::NotPending {
            player_id: player_id.to_string(),
            quest_id: quest_id.to_string(),
        });
    }

    // Rotation advances from the approver's seat, even when an admin
    // force-activated the quest for someone outside the roster.
    let next_assignee = if quest.kind == QuestKind::Rotating {
        RotationRoster::new(&quest.rotation, Some(player_id))
            .map(|mut roster| roster.advance().to_string())
    } else {
        None
    };

    let player = state.require_player_mut(player_id)?;
    let streak = evaluate_streak(player, now, cfg.tz);
    let weekly = advance_weekly_progress(player, weekly_goal, now, cfg.tz);

    player.pending_ids.remove(quest_id);
    let xp_awarded = quest.xp + weekly.bonus_xp;
    let leveled_up = grant_xp(player, xp_awarded);
    player.gems += quest.gems;

    if quest.repeatable {
        player
            .cooldowns
            .insert(quest.id.clone(), days_after(now, quest.cooldown_days));
    } else {
        player.completed_ids.insert(quest.id.clone());
    }

    if quest.has_loot() {
        player.inventory.insert(
            0,
            InventoryItem::new(quest.loot.clone(), quest.loot_rarity, quest.loot_value, now),
        );
    }

    player.record_history(HistoryEntry::new(&quest, now));
    player.streak = streak.streak;
    player.last_quest_date = Some(now);
    player.weekly_progress = weekly.progress;
    player.last_weekly_reset = Some(weekly.reset_at);

    // Fixed priority order: streak, loot, weekly bonus, level-up, base.
    let mut batch = Vec::new();
    if let Some((message, kind)) = streak.message {
        batch.push(Notification::new(message, kind, now));
    }
    if quest.has_loot() {
        batch.push(Notification::new(
            format!("Loot Found: {}", quest.loot),
            NotificationKind::Celebration,
            now,
        ));
    }
    if weekly.goal_met {
        batch.push(Notification::new(
            format!("Weekly Goal Met! +{WEEKLY_BONUS_XP} XP Bonus!"),
            NotificationKind::Celebration,
            now,
        ));
    }
    if leveled_up {
        batch.push(Notification::new(
            format!("LEVEL UP! You reached Level {}!", player.level),
            NotificationKind::Celebration,
            now,
        ));
    }
    batch.push(Notification::new(
        format!(
            "Approved: {} (+{} XP, +{} Gems)",
            quest.task, quest.xp, quest.gems
        ),
        NotificationKind::Success,
        now,
    ));
    player.notify_batch(batch);

    let level = player.level;
    let streak_count = player.streak;

    if let Some(next_id) = &next_assignee {
        if let Some(q) = state.quest_mut(quest_id) {
            q.assigned_to = Some(next_id.clone());
        }
        // Pre-date the next holder's cooldown so the handoff respects the
        // quest's pacing instead of reappearing instantly.
        if quest.cooldown_days > 0 && next_id != player_id {
            if let Some(next_player) = state.player_mut(next_id) {
                next_player
                    .cooldowns
                    .insert(quest_id.to_string(), days_after(now, quest.cooldown_days));
            }
        }
    }

    info!(
        "approved quest {quest_id} for {player_id}: +{xp_awarded} XP, +{} gems",
        quest.gems
    );
    Ok(ApprovalOutcome {
        xp_awarded,
        gems_awarded: quest.gems,
        level,
        leveled_up,
        streak: streak_count,
        weekly_goal_met: weekly.goal_met,
        loot: quest.has_loot().then(|| quest.loot.clone()),
        next_assignee,
    })
}

/// Admin: hand a finished one-time quest back to a player.
pub fn reactivate_quest(
    state: &mut GameState,
    player_id: &str,
    quest_id: &str,
) -> Result<(), EngineError> {
    let player = state.require_player_mut(player_id)?;
    player.completed_ids.remove(quest_id);
    Ok(())
}

/// Admin: clear a player's cooldown for a quest.
pub fn reset_cooldown(
    state: &mut GameState,
    player_id: &str,
    quest_id: &str,
) -> Result<(), EngineError> {
    let player = state.require_player_mut(player_id)?;
    player.cooldowns.remove(quest_id);
    Ok(())
}

/// Admin: force a quest to be always visible to a player (or stop doing so).
pub fn set_force_active(
    state: &mut GameState,
    player_id: &str,
    quest_id: &str,
    enabled: bool,
) -> Result<(), EngineError> {
    let player = state.require_player_mut(player_id)?;
    if enabled {
        player.force_active_ids.insert(quest_id.to_string());
    } else {
        player.force_active_ids.remove(quest_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::seed_state;
    use chrono::TimeZone;

    fn setup() -> (GameState, EngineConfig, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap();
        (seed_state(now), EngineConfig::default(), now)
    }

    #[test]
    fn submit_requires_known_ids() {
        let (mut state, _, _) = setup();
        let player_id = state.users[0].id.clone();
        assert!(matches!(
            submit(&mut state, &player_id, "ghost"),
            Err(EngineError::QuestNotFound(_))
        ));
        assert!(matches!(
            submit(&mut state, "ghost", "sweep_dust_bunnies"),
            Err(EngineError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn approve_of_non_pending_is_an_error() {
        let (mut state, cfg, now) = setup();
        let player_id = state.users[0].id.clone();
        assert!(matches!(
            approve(&mut state, &player_id, "sweep_dust_bunnies", now, &cfg),
            Err(EngineError::NotPending { .. })
        ));
    }

    #[test]
    fn deny_drops_pending_and_notifies() {
        let (mut state, _, now) = setup();
        let player_id = state.users[0].id.clone();
        submit(&mut state, &player_id, "sweep_dust_bunnies").unwrap();
        deny(&mut state, &player_id, "sweep_dust_bunnies", now).unwrap();

        let player = state.player(&player_id).unwrap();
        assert!(player.pending_ids.is_empty());
        assert_eq!(
            player.notifications[0].message,
            "Mission Denied: Slay the Dust Bunnies"
        );
        assert_eq!(player.notifications[0].kind, NotificationKind::Error);
        assert_eq!(player.total_xp, 0);
    }

    #[test]
    fn undo_submit_requires_a_pending_entry() {
        let (mut state, _, _) = setup();
        let player_id = state.users[0].id.clone();
        assert!(matches!(
            undo_submit(&mut state, &player_id, "sweep_dust_bunnies"),
            Err(EngineError::NotPending { .. })
        ));
        submit(&mut state, &player_id, "sweep_dust_bunnies").unwrap();
        undo_submit(&mut state, &player_id, "sweep_dust_bunnies").unwrap();
        assert!(state.player(&player_id).unwrap().pending_ids.is_empty());
    }

    #[test]
    fn force_active_toggle_round_trips() {
        let (mut state, _, _) = setup();
        let player_id = state.users[0].id.clone();
        set_force_active(&mut state, &player_id, "sweep_dust_bunnies", true).unwrap();
        assert!(state
            .player(&player_id)
            .unwrap()
            .force_active_ids
            .contains("sweep_dust_bunnies"));
        set_force_active(&mut state, &player_id, "sweep_dust_bunnies", false).unwrap();
        assert!(state
            .player(&player_id)
            .unwrap()
            .force_active_ids
            .is_empty());
    }

    #[test]
    fn reactivate_returns_a_completed_quest() {
        let (mut state, _, _) = setup();
        let player_id = state.users[0].id.clone();
        state
            .player_mut(&player_id)
            .unwrap()
            .completed_ids
            .insert("laundry_fold".to_string());
        reactivate_quest(&mut state, &player_id, "laundry_fold").unwrap();
        assert!(state.player(&player_id).unwrap().completed_ids.is_empty());
    }
}
