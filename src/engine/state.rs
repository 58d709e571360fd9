//! Snapshot seeding and household administration.
//!
//! First-run seeding is deterministic: it takes `now` instead of sampling
//! the clock, so tests can pin the snapshot exactly. The admin operations
//! here are the parent dashboard's verbs: roster edits, catalog upserts,
//! household settings and the wishlist.

use chrono::{DateTime, Utc};
use log::{debug, info};
use uuid::Uuid;

use super::errors::EngineError;
use super::progression::level_for;
use super::types::{
    GameState, LootRarity, PlayerRecord, QuestKind, QuestRecord, RewardKind, RewardRecord,
    ShopScope, WishlistItem, DEFAULT_PARENT_PIN, DEFAULT_WEEKLY_GOAL,
};
use crate::validation::{validate_display_name, validate_passcode, validate_title};

/// The default snapshot for a store with no saved document: one player, two
/// starter quests and a small reward catalog.
pub fn seed_state(now: DateTime<Utc>) -> GameState {
    GameState {
        users: vec![PlayerRecord::new("u1", "Player 1")],
        quests: vec![
            QuestRecord::new("sweep_dust_bunnies", "Slay the Dust Bunnies")
                .with_xp(10)
                .with_gems(5)
                .with_icon("🧹")
                .with_repeatable(true)
                .with_cooldown_days(1),
            QuestRecord::new("laundry_fold", "The Great Laundry Fold")
                .with_xp(20)
                .with_gems(10)
                .with_icon("👕")
                .with_kind(QuestKind::Global)
                .with_repeatable(false)
                .with_cooldown_days(0)
                .with_loot("Lost Sock", LootRarity::Common, 5),
        ],
        rewards: vec![
            RewardRecord::new("movie_pick", "Pick the Friday Movie")
                .with_level(2)
                .with_kind(RewardKind::Primary)
                .with_interval(0),
            RewardRecord::new("screen_time", "Extra 15m Screen Time")
                .with_level(2)
                .with_kind(RewardKind::Secondary)
                .with_interval(0),
            RewardRecord::new("stay_up_late", "Stay Up 30m Late")
                .with_level(3)
                .with_kind(RewardKind::Primary)
                .with_interval(0),
            RewardRecord::new("toy_chest", "Small Toy Chest Visit")
                .with_level(4)
                .with_kind(RewardKind::Interval)
                .with_interval(2),
            RewardRecord::new("ice_cream", "Ice Cream Treat")
                .with_kind(RewardKind::Shop)
                .with_cost(50)
                .with_quantity(10)
                .with_shop_cooldown(1)
                .with_scope(ShopScope::Global),
        ],
        parent_pin: DEFAULT_PARENT_PIN.to_string(),
        vacation_mode: false,
        vacation_start_time: None,
        weekly_goal: DEFAULT_WEEKLY_GOAL,
        wishlist: Vec::new(),
        shop_state: std::collections::HashMap::new(),
        last_updated: now,
    }
}

/// Add a player with the roster defaults. Returns the new id.
pub fn add_player(
    state: &mut GameState,
    name: &str,
    _now: DateTime<Utc>,
) -> Result<String, EngineError> {
    let name = validate_display_name(name).map_err(|e| EngineError::InvalidInput(e.to_string()))?;
    let id = Uuid::new_v4().to_string();
    state.users.push(PlayerRecord::new(id.clone(), name));
    info!("added player {id}");
    Ok(id)
}

pub fn rename_player(
    state: &mut GameState,
    player_id: &str,
    name: &str,
) -> Result<(), EngineError> {
    let name = validate_display_name(name).map_err(|e| EngineError::InvalidInput(e.to_string()))?;
    state.require_player_mut(player_id)?.name = name;
    Ok(())
}

pub fn set_player_avatar(
    state: &mut GameState,
    player_id: &str,
    avatar: &str,
) -> Result<(), EngineError> {
    if avatar.trim().is_empty() {
        return Err(EngineError::InvalidInput("avatar must not be empty".into()));
    }
    state.require_player_mut(player_id)?.avatar = avatar.trim().to_string();
    Ok(())
}

pub fn set_player_theme(
    state: &mut GameState,
    player_id: &str,
    theme: &str,
) -> Result<(), EngineError> {
    if theme.trim().is_empty() {
        return Err(EngineError::InvalidInput("theme must not be empty".into()));
    }
    state.require_player_mut(player_id)?.theme_color = theme.trim().to_string();
    Ok(())
}

pub fn set_player_passcode(
    state: &mut GameState,
    player_id: &str,
    passcode: &str,
) -> Result<(), EngineError> {
    let passcode =
        validate_passcode(passcode).map_err(|e| EngineError::InvalidInput(e.to_string()))?;
    state.require_player_mut(player_id)?.passcode = passcode;
    Ok(())
}

/// Parent stat edit. Recomputes the level so the level invariant survives
/// dashboard meddling.
pub fn set_player_xp(state: &mut GameState, player_id: &str, xp: u64) -> Result<(), EngineError> {
    let player = state.require_player_mut(player_id)?;
    player.total_xp = xp;
    player.level = level_for(xp);
    Ok(())
}

pub fn set_player_gems(
    state: &mut GameState,
    player_id: &str,
    gems: u64,
) -> Result<(), EngineError> {
    state.require_player_mut(player_id)?.gems = gems;
    Ok(())
}

/// Soft-delete. The roster must keep at least one active player, so the
/// household is never left without anybody to run quests for.
pub fn deactivate_player(state: &mut GameState, player_id: &str) -> Result<(), EngineError> {
    state.require_player(player_id)?;
    let other_active = state
        .users
        .iter()
        .any(|u| u.id != player_id && u.is_active());
    if !other_active {
        return Err(EngineError::LastActivePlayer);
    }
    state.require_player_mut(player_id)?.is_deactivated = true;
    info!("deactivated player {player_id}");
    Ok(())
}

pub fn reactivate_player(state: &mut GameState, player_id: &str) -> Result<(), EngineError> {
    state.require_player_mut(player_id)?.is_deactivated = false;
    Ok(())
}

pub fn clear_notifications(state: &mut GameState, player_id: &str) -> Result<(), EngineError> {
    state.require_player_mut(player_id)?.notifications.clear();
    Ok(())
}

/// Insert or replace a quest definition. An empty id means a new quest and
/// gets a fresh uuid. Rotating quests are normalized: an empty roster
/// defaults to every active player, and an assignee outside the roster
/// snaps to the first member. Non-rotating quests carry no roster.
pub fn upsert_quest(state: &mut GameState, mut quest: QuestRecord) -> Result<String, EngineError> {
    quest.task = validate_title(&quest.task).map_err(|_| EngineError::EmptyTitle)?;

    if quest.kind == QuestKind::Rotating {
        if quest.rotation.is_empty() {
            quest.rotation = state.active_players().map(|u| u.id.clone()).collect();
        }
        let member = quest
            .assigned_to
            .as_deref()
            .map_or(false, |id| quest.rotation.iter().any(|m| m == id));
        if !member {
            quest.assigned_to = quest.rotation.first().cloned();
        }
    } else {
        quest.rotation.clear();
    }

    if quest.id.is_empty() {
        quest.id = Uuid::new_v4().to_string();
    }
    let id = quest.id.clone();
    match state.quest_mut(&id) {
        Some(existing) => *existing = quest,
        None => state.quests.push(quest),
    }
    debug!("upserted quest {id}");
    Ok(id)
}

pub fn delete_quest(state: &mut GameState, quest_id: &str) -> Result<(), EngineError> {
    let before = state.quests.len();
    state.quests.retain(|q| q.id != quest_id);
    if state.quests.len() == before {
        return Err(EngineError::QuestNotFound(quest_id.to_string()));
    }
    Ok(())
}

/// Insert or replace a reward definition. An empty id gets a fresh uuid.
pub fn upsert_reward(
    state: &mut GameState,
    mut reward: RewardRecord,
) -> Result<String, EngineError> {
    reward.title = validate_title(&reward.title).map_err(|_| EngineError::EmptyTitle)?;
    if reward.id.is_empty() {
        reward.id = Uuid::new_v4().to_string();
    }
    let id = reward.id.clone();
    match state.reward_mut(&id) {
        Some(existing) => *existing = reward,
        None => state.rewards.push(reward),
    }
    debug!("upserted reward {id}");
    Ok(id)
}

/// Remove a reward and its shared stock record.
pub fn delete_reward(state: &mut GameState, reward_id: &str) -> Result<(), EngineError> {
    let before = state.rewards.len();
    state.rewards.retain(|r| r.id != reward_id);
    if state.rewards.len() == before {
        return Err(EngineError::RewardNotFound(reward_id.to_string()));
    }
    state.shop_state.remove(reward_id);
    Ok(())
}

pub fn set_parent_pin(state: &mut GameState, pin: &str) -> Result<(), EngineError> {
    let pin = validate_passcode(pin).map_err(|e| EngineError::InvalidInput(e.to_string()))?;
    state.parent_pin = pin;
    Ok(())
}

pub fn set_weekly_goal(state: &mut GameState, goal: u32) -> Result<(), EngineError> {
    if goal == 0 {
        return Err(EngineError::InvalidInput(
            "weekly goal must be at least 1".into(),
        ));
    }
    state.weekly_goal = goal;
    Ok(())
}

pub fn add_wishlist_item(
    state: &mut GameState,
    player_id: &str,
    text: &str,
    now: DateTime<Utc>,
) -> Result<String, EngineError> {
    let text = validate_title(text).map_err(|_| EngineError::EmptyTitle)?;
    let player = state.require_player(player_id)?;
    let item = WishlistItem {
        id: Uuid::new_v4().to_string(),
        text,
        requested_by_id: player.id.clone(),
        requested_by_name: player.name.clone(),
        timestamp: now,
    };
    let id = item.id.clone();
    state.wishlist.push(item);
    Ok(id)
}

pub fn remove_wishlist_item(state: &mut GameState, item_id: &str) -> Result<(), EngineError> {
    let before = state.wishlist.len();
    state.wishlist.retain(|w| w.id != item_id);
    if state.wishlist.len() == before {
        return Err(EngineError::WishlistItemNotFound(item_id.to_string()));
    }
    Ok(())
}

/// Turn a wish into a shop-reward draft: the item leaves the wishlist and
/// the caller gets a prefilled reward to edit and upsert. Nothing is added
/// to the catalog here; the decision point stays with the parent.
pub fn promote_wishlist_item(
    state: &mut GameState,
    item_id: &str,
) -> Result<RewardRecord, EngineError> {
    let pos = state
        .wishlist
        .iter()
        .position(|w| w.id == item_id)
        .ok_or_else(|| EngineError::WishlistItemNotFound(item_id.to_string()))?;
    let wish = state.wishlist.remove(pos);
    Ok(RewardRecord::new(Uuid::new_v4().to_string(), wish.text)
        .with_kind(RewardKind::Shop)
        .with_cost(100)
        .with_quantity(1)
        .with_shop_cooldown(7)
        .with_scope(ShopScope::Global))
}
