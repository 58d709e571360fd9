//! The two-tier reward shop.
//!
//! Global-scope rewards share one stock/cooldown record for the whole
//! household; personal-scope rewards track stock through the player's own
//! claim history and cooldowns through their `shop_cooldowns` map. Purchase
//! refusals are notifications, not errors: the player is told why and
//! nothing else changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::clock::{day_key, days_after};
use super::errors::EngineError;
use super::types::{
    EngineConfig, GameState, NotificationKind, PlayerRecord, RewardRecord, ShopScope, ShopStock,
};

/// Availability of one reward for one player at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardStatus {
    pub sold_out: bool,
    pub on_cooldown: bool,
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Remaining stock; -1 = unlimited. Personal scope counts the player's
    /// own claims against the definition's quantity.
    pub remaining: i64,
}

/// Why a purchase was refused, in validation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseDenied {
    InsufficientGems { needed: u64 },
    DailyLimit { limit: u32 },
    SoldOut,
    OnCooldown { until: DateTime<Utc> },
}

impl PurchaseDenied {
    /// The user-facing refusal message.
    pub fn message(&self, now: DateTime<Utc>) -> String {
        match self {
            PurchaseDenied::InsufficientGems { needed } => {
                format!("Not enough Gems! Need {needed}")
            }
            PurchaseDenied::DailyLimit { limit } => {
                format!("Daily purchase limit of {limit} reached.")
            }
            PurchaseDenied::SoldOut => "This item is sold out!".to_string(),
            PurchaseDenied::OnCooldown { until } => {
                format!("Item on cooldown for {}.", format_remaining(*until, now))
            }
        }
    }
}

/// What `purchase` did. Refusals are part of the happy path: the refusal
/// notification has already been appended when this returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { cost: u64, remaining_gems: u64 },
    Rejected(PurchaseDenied),
}

///// Human-readable time left, coarsest two units: "2d 4h", "3h 12m", "45m".
/// Minutes round up so "1s left" never prints as zero.
pub(crate) fn format_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (until - now).num_milliseconds();
    if diff_ms <= 0 {
        return "0m".to_string();
    }
    let days = diff_ms / 86_400_000;
    let hours = (diff_ms % 86_400_000) / 3_600_000;
    let mins = (diff_ms % 3_600_000 + 59_999) / 60_000;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Availability for a reward/player pair.
pub fn reward_status(
    state: &GameState,
    player_id: &str,
    reward_id: &str,
    now: DateTime<Utc>,
) -> Result<RewardStatus, EngineError> {
    let reward = state.require_reward(reward_id)?;
    let player = state.require_player(player_id)?;
    Ok(status_for(reward, player, &state.shop_state, now))
}

pub(crate) fn status_for(
    reward: &RewardRecord,
    player: &PlayerRecord,
    shop_state: &HashMap<String, ShopStock>,
    now: DateTime<Utc>,
) -> RewardStatus {
    let mut status = RewardStatus {
        sold_out: false,
        on_cooldown: false,
        cooldown_until: None,
        remaining: reward.quantity,
    };

    match reward.shop_scope {
        ShopScope::Global => {
            // Until somebody buys, the definition's quantity stands in for
            // the shared record.
            if let Some(stock) = shop_state.get(&reward.id) {
                status.remaining = stock.quantity;
                if stock.quantity == 0 {
                    status.sold_out = true;
                }
                if let Some(until) = stock.cooldown_until {
                    if now < until {
                        status.on_cooldown = true;
                        status.cooldown_until = Some(until);
                    }
                }
            }
        }
        ShopScope::Personal => {
            if reward.quantity != -1 {
                let purchased = player
                    .claimed_rewards
                    .iter()
                    .filter(|id| id.as_str() == reward.id)
                    .count() as i64;
                if purchased >= reward.quantity {
                    status.sold_out = true;
                }
                status.remaining = reward.quantity - purchased;
            }
            if let Some(until) = player.shop_cooldowns.get(&reward.id) {
                if now < *until {
                    status.on_cooldown = true;
                    status.cooldown_until = Some(*until);
                }
            }
        }
    }

    status
}

/// Buy a shop reward. Validation order is fixed: gems, daily cap, stock,
/// cooldown; the first failure appends its refusal notification and leaves
/// everything else unchanged.
pub fn purchase(
    state: &mut GameState,
    player_id: &str,
    reward_id: &str,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> Result<PurchaseOutcome, EngineError> {
    let reward = state.require_reward(reward_id)?.clone();
    let today = day_key(now, cfg.tz);

    let denied = {
        let player = state.require_player(player_id)?;
        let status = status_for(&reward, player, &state.shop_state, now);
        if player.gems < reward.cost {
            Some(PurchaseDenied::InsufficientGems {
                needed: reward.cost,
            })
        } else if player.purchases_on(&today) >= cfg.daily_purchase_limit {
            Some(PurchaseDenied::DailyLimit {
                limit: cfg.daily_purchase_limit,
            })
        } else if status.sold_out {
            Some(PurchaseDenied::SoldOut)
        } else if status.on_cooldown {
            Some(PurchaseDenied::OnCooldown {
                until: status.cooldown_until.unwrap_or(now),
            })
        } else {
            None
        }
    };

    if let Some(denied) = denied {
        let message = denied.message(now);
        debug!("purchase of {reward_id} by {player_id} refused: {message}");
        let player = state.require_player_mut(player_id)?;
        player.notify(message, NotificationKind::Error, now);
        return Ok(PurchaseOutcome::Rejected(denied));
    }

    if reward.shop_scope == ShopScope::Global {
        let current = state
            .shop_state
            .get(&reward.id)
            .map(|stock| stock.quantity)
            .unwrap_or(reward.quantity);
        let quantity = if reward.quantity != -1 { current - 1 } else { -1 };
        let cooldown_until =
            (reward.shop_cooldown > 0).then(|| days_after(now, reward.shop_cooldown));
        state.shop_state.insert(
            reward.id.clone(),
            ShopStock {
                quantity,
                cooldown_until,
            },
        );
    }

    let player = state.require_player_mut(player_id)?;
    player.gems -= reward.cost;
    player.claimed_rewards.push(reward.id.clone());
    *player.daily_purchases.entry(today).or_insert(0) += 1;
    if reward.shop_scope == ShopScope::Personal && reward.shop_cooldown > 0 {
        player
            .shop_cooldowns
            .insert(reward.id.clone(), days_after(now, reward.shop_cooldown));
    }
    player.notify(
        format!("Purchased: {}", reward.title),
        NotificationKind::Success,
        now,
    );
    let remaining_gems = player.gems;

    info!("{player_id} purchased {reward_id} for {} gems", reward.cost);
    Ok(PurchaseOutcome::Purchased {
        cost: reward.cost,
        remaining_gems,
    })
}

/// Claim a level-gated (non-shop) reward. The claim joins the outstanding
/// IOU list the parent works through with `fulfill`.
pub fn claim(state: &mut GameState, player_id: &str, reward_id: &str) -> Result<(), EngineError> {
    let reward = state.require_reward(reward_id)?.clone();
    if reward.is_shop_item() {
        return Err(EngineError::NotClaimable);
    }
    let player = state.require_player_mut(player_id)?;
    if player.level < reward.level {
        return Err(EngineError::RewardLocked {
            required: reward.level,
            level: player.level,
        });
    }
    player.claimed_rewards.push(reward.id.clone());
    debug!("{player_id} claimed {reward_id}");
    Ok(())
}

/// Parent marks one outstanding claim as delivered.
pub fn fulfill(state: &mut GameState, player_id: &str, reward_id: &str) -> Result<(), EngineError> {
    let player = state.require_player_mut(player_id)?;
    let pos = player
        .claimed_rewards
        .iter()
        .position(|id| id == reward_id)
        .ok_or_else(|| EngineError::NotClaimed(reward_id.to_string()))?;
    player.claimed_rewards.remove(pos);
    player.fulfilled_rewards.push(reward_id.to_string());
    Ok(())
}

/// Convert an inventory item back into gems. Returns the value credited.
pub fn sell_item(
    state: &mut GameState,
    player_id: &str,
    item_id: &str,
) -> Result<u64, EngineError> {
    let player = state.require_player_mut(player_id)?;
    let pos = player
        .inventory
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| EngineError::ItemNotFound(item_id.to_string()))?;
    let item = player.inventory.remove(pos);
    player.gems += item.value;
    debug!("{player_id} sold {item_id} for {} gems", item.value);
    Ok(item.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{InventoryItem, LootRarity};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()
    }

    fn shop_reward(id: &str, scope: ShopScope) -> RewardRecord {
        RewardRecord::new(id, "Ice Cream")
            .with_kind(crate::engine::types::RewardKind::Shop)
            .with_cost(50)
            .with_quantity(2)
            .with_shop_cooldown(1)
            .with_scope(scope)
    }

    fn bare_state(rewards: Vec<RewardRecord>) -> GameState {
        GameState {
            users: vec![PlayerRecord::new("u1", "Avery")],
            quests: vec![],
            rewards,
            parent_pin: "1234".to_string(),
            vacation_mode: false,
            vacation_start_time: None,
            weekly_goal: 10,
            wishlist: vec![],
            shop_state: HashMap::new(),
            last_updated: now(),
        }
    }

    #[test]
    fn personal_status_counts_own_claims() {
        let reward = shop_reward("r1", ShopScope::Personal);
        let mut player = PlayerRecord::new("u1", "Avery");
        player.claimed_rewards.push("r1".to_string());
        let status = status_for(&reward, &player, &HashMap::new(), now());
        assert_eq!(status.remaining, 1);
        assert!(!status.sold_out);

        player.claimed_rewards.push("r1".to_string());
        let status = status_for(&reward, &player, &HashMap::new(), now());
        assert_eq!(status.remaining, 0);
        assert!(status.sold_out);
    }

    #[test]
    fn global_status_falls_back_to_definition() {
        let reward = shop_reward("r1", ShopScope::Global);
        let player = PlayerRecord::new("u1", "Avery");
        let status = status_for(&reward, &player, &HashMap::new(), now());
        assert_eq!(status.remaining, 2);
        assert!(!status.sold_out);
        assert!(!status.on_cooldown);

        let mut shared = HashMap::new();
        shared.insert(
            "r1".to_string(),
            ShopStock {
                quantity: 0,
                cooldown_until: Some(now() + Duration::hours(4)),
            },
        );
        let status = status_for(&reward, &player, &shared, now());
        assert!(status.sold_out);
        assert!(status.on_cooldown);
        assert_eq!(status.remaining, 0);
    }

    #[test]
    fn expired_cooldown_does_not_block() {
        let reward = shop_reward("r1", ShopScope::Personal);
        let mut player = PlayerRecord::new("u1", "Avery");
        player
            .shop_cooldowns
            .insert("r1".to_string(), now() - Duration::hours(1));
        let status = status_for(&reward, &player, &HashMap::new(), now());
        assert!(!status.on_cooldown);
    }

    #[test]
    fn remaining_time_formats_coarsest_two_units() {
        let base = now();
        assert_eq!(
            format_remaining(base + Duration::days(2) + Duration::hours(4), base),
            "2d 4h"
        );
        assert_eq!(
            format_remaining(base + Duration::hours(3) + Duration::minutes(12), base),
            "3h 12m"
        );
        assert_eq!(
            format_remaining(base + Duration::seconds(30), base),
            "1m"
        );
    }

    #[test]
    fn fulfill_moves_one_occurrence() {
        let mut state = bare_state(vec![shop_reward("r1", ShopScope::Personal)]);
        let claims = &mut state.users[0].claimed_rewards;
        claims.push("r1".to_string());
        claims.push("r1".to_string());

        fulfill(&mut state, "u1", "r1").unwrap();
        assert_eq!(state.users[0].claimed_rewards, vec!["r1".to_string()]);
        assert_eq!(state.users[0].fulfilled_rewards, vec!["r1".to_string()]);

        fulfill(&mut state, "u1", "r1").unwrap();
        assert!(matches!(
            fulfill(&mut state, "u1", "r1"),
            Err(EngineError::NotClaimed(_))
        ));
    }

    #[test]
    fn selling_credits_the_item_value() {
        let mut state = bare_state(vec![]);
        let item = InventoryItem::new("Lost Sock", LootRarity::Common, 5, now());
        let item_id = item.id.clone();
        state.users[0].inventory.push(item);

        let credited = sell_item(&mut state, "u1", &item_id).unwrap();
        assert_eq!(credited, 5);
        assert_eq!(state.users[0].gems, 5);
        assert!(state.users[0].inventory.is_empty());
        assert!(matches!(
            sell_item(&mut state, "u1", &item_id),
            Err(EngineError::ItemNotFound(_))
        ));
    }
}
