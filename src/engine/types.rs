//! Core data types for the quest/reward economy.
//!
//! Everything here is a serde value record; the persisted snapshot is one
//! JSON document built from these types. Wire field names are the camelCase
//! names of the established snapshot schema (`totalXP`, `completedIds`,
//! `rotatingIds`, ...) so existing documents and backups stay readable.
//! Timestamps are epoch milliseconds on the wire and `DateTime<Utc>` in
//! memory.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::EngineError;

/// XP required per level step: `level = total_xp / 100 + 1`.
pub const XP_PER_LEVEL: u64 = 100;

/// Once-a-day activation bonus.
pub const LOGIN_BONUS_XP: u64 = 50;

/// Flat bonus granted when the weekly goal is hit exactly.
pub const WEEKLY_BONUS_XP: u64 = 100;

/// Notification log retention, newest first.
pub const NOTIFICATION_LOG_CAP: usize = 20;

/// Completion history retention, newest first.
pub const HISTORY_LOG_CAP: usize = 50;

/// Shop purchases allowed per player per household-local day.
pub const DEFAULT_DAILY_PURCHASE_LIMIT: u32 = 3;

/// Approvals per week before the weekly bonus fires.
pub const DEFAULT_WEEKLY_GOAL: u32 = 10;

pub const DEFAULT_PARENT_PIN: &str = "1234";
pub const DEFAULT_AVATAR: &str = "🙂";
pub const DEFAULT_THEME: &str = "yellow";
pub const DEFAULT_PASSCODE: &str = "0000";

/// Knobs the binary resolves from configuration and threads into the core.
///
/// The household offset decides what "today", "yesterday" and "this week"
/// mean; keeping it explicit keeps every calendar rule deterministic under
/// test.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub tz: FixedOffset,
    pub daily_purchase_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tz: Utc.fix(),
            daily_purchase_limit: DEFAULT_DAILY_PURCHASE_LIMIT,
        }
    }
}

/// How a quest is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    /// Owned by one player, or open to everyone when unassigned.
    Personal,
    /// Visible to every active player.
    Global,
    /// Handed around an ordered roster, one holder at a time.
    Rotating,
}

impl Default for QuestKind {
    fn default() -> Self {
        QuestKind::Personal
    }
}

/// Reward families. Only `shop` participates in the gem economy; the rest
/// are level-gated perks claimed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Primary,
    Secondary,
    Interval,
    Shop,
}

impl Default for RewardKind {
    fn default() -> Self {
        RewardKind::Primary
    }
}

/// Whether shop stock and cooldown are tracked once for the household or
/// once per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopScope {
    Global,
    Personal,
}

impl Default for ShopScope {
    fn default() -> Self {
        ShopScope::Personal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Default for LootRarity {
    fn default() -> Self {
        LootRarity::Common
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Celebration,
}

/// Epoch-millisecond encoding for timestamp-valued maps (quest and shop
/// cooldowns). Scalar fields use `chrono::serde::ts_milliseconds`; serde has
/// no map-valued equivalent, so this mirrors that encoding by hand.
pub(crate) mod epoch_ms_map {
    use std::collections::HashMap;

    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        map: &HashMap<String, DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, at) in map {
            out.serialize_entry(key, &at.timestamp_millis())?;
        }
        out.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<String, DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, i64>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, ms)| {
                DateTime::from_timestamp_millis(ms)
                    .map(|at| (key, at))
                    .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}")))
            })
            .collect()
    }
}

/// One entry in a player's notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
            timestamp: now,
        }
    }
}

/// One completed quest in a player's history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub quest_id: String,
    pub task: String,
    /// XP of the quest itself, bonuses excluded.
    pub xp: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(quest: &QuestRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            quest_id: quest.id.clone(),
            task: quest.task.clone(),
            xp: quest.xp,
            timestamp: now,
        }
    }
}

/// A loot drop sitting in a player's inventory until sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub rarity: LootRarity,
    /// Gem value credited on sale.
    #[serde(default)]
    pub value: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        text: impl Into<String>,
        rarity: LootRarity,
        value: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            rarity,
            value,
            timestamp: now,
        }
    }
}

/// A player's request for something to appear in the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: String,
    pub text: String,
    pub requested_by_id: String,
    pub requested_by_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Shared stock tracking for a global-scope shop reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopStock {
    /// Remaining quantity; -1 means unlimited.
    pub quantity: i64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub cooldown_until: Option<DateTime<Utc>>,
}

fn default_level() -> u32 {
    1
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_passcode() -> String {
    DEFAULT_PASSCODE.to_string()
}

/// A household member and all of their progression state.
///
/// Players are soft-deleted: `is_deactivated` hides them from rosters while
/// preserving history and balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default = "default_theme")]
    pub theme_color: String,
    #[serde(default = "default_passcode")]
    pub passcode: String,
    #[serde(rename = "totalXP", default)]
    pub total_xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub gems: u64,
    /// Non-repeatable quests finished forever.
    #[serde(default)]
    pub completed_ids: HashSet<String>,
    /// Submitted, awaiting parent review.
    #[serde(default)]
    pub pending_ids: HashSet<String>,
    /// Quest id -> instant the quest becomes eligible again.
    #[serde(default, with = "epoch_ms_map")]
    pub cooldowns: HashMap<String, DateTime<Utc>>,
    /// Bought or claimed, not yet delivered. Duplicates are meaningful: one
    /// entry per outstanding IOU.
    #[serde(default)]
    pub claimed_rewards: Vec<String>,
    #[serde(default)]
    pub fulfilled_rewards: Vec<String>,
    /// Admin override: these quests are always visible to this player.
    #[serde(default)]
    pub force_active_ids: HashSet<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_quest_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub weekly_progress: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_weekly_reset: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_login_bonus_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    /// Reward id -> instant the reward may be bought again (personal scope).
    #[serde(default, with = "epoch_ms_map")]
    pub shop_cooldowns: HashMap<String, DateTime<Utc>>,
    /// Household-local day key ("2026-08-23") -> purchases made that day.
    #[serde(default)]
    pub daily_purchases: HashMap<String, u32>,
    #[serde(default)]
    pub is_deactivated: bool,
}

impl PlayerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: default_avatar(),
            theme_color: default_theme(),
            passcode: default_passcode(),
            total_xp: 0,
            level: 1,
            gems: 0,
            completed_ids: HashSet::new(),
            pending_ids: HashSet::new(),
            cooldowns: HashMap::new(),
            claimed_rewards: Vec::new(),
            fulfilled_rewards: Vec::new(),
            force_active_ids: HashSet::new(),
            history: Vec::new(),
            notifications: Vec::new(),
            streak: 0,
            last_quest_date: None,
            weekly_progress: 0,
            last_weekly_reset: None,
            last_login_bonus_date: None,
            inventory: Vec::new(),
            shop_cooldowns: HashMap::new(),
            daily_purchases: HashMap::new(),
            is_deactivated: false,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme_color = theme.into();
        self
    }

    pub fn with_passcode(mut self, passcode: impl Into<String>) -> Self {
        self.passcode = passcode.into();
        self
    }

    pub fn is_active(&self) -> bool {
        !self.is_deactivated
    }

    /// Prepend one notification, dropping the oldest past the cap.
    pub fn notify(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: DateTime<Utc>,
    ) {
        self.notify_batch(vec![Notification::new(message, kind, now)]);
    }

    /// Prepend a batch as one block, preserving the batch's own order so the
    /// highest-priority entry ends up newest.
    pub fn notify_batch(&mut self, batch: Vec<Notification>) {
        if batch.is_empty() {
            return;
        }
        let mut log = batch;
        log.append(&mut self.notifications);
        log.truncate(NOTIFICATION_LOG_CAP);
        self.notifications = log;
    }

    /// Prepend a completion to the history log, dropping past the cap.
    pub fn record_history(&mut self, entry: HistoryEntry) {
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_LOG_CAP);
    }

    /// Purchases made on the given household-local day key.
    pub fn purchases_on(&self, day: &str) -> u32 {
        self.daily_purchases.get(day).copied().unwrap_or(0)
    }
}

fn default_icon() -> String {
    "✨".to_string()
}

/// A task definition players can complete for XP and gems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRecord {
    pub id: String,
    pub task: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub gems: u64,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub repeatable: bool,
    /// Days before a repeatable quest comes back after approval.
    #[serde(rename = "cooldown", default)]
    pub cooldown_days: u32,
    /// None = open to every active player (personal quests only).
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: QuestKind,
    /// Weekday indices 0-6, Sunday = 0; empty = every day.
    #[serde(default)]
    pub days: BTreeSet<u8>,
    /// Ordered rotation roster; empty unless `kind` is rotating.
    #[serde(rename = "rotatingIds", default)]
    pub rotation: Vec<String>,
    /// Loot drop, flat wire fields; empty `loot` text means no drop.
    #[serde(default)]
    pub loot: String,
    #[serde(default)]
    pub loot_rarity: LootRarity,
    #[serde(default)]
    pub loot_value: u64,
}

impl QuestRecord {
    /// New quest with the catalog editor's defaults.
    pub fn new(id: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task: task.into(),
            xp: 20,
            gems: 5,
            icon: default_icon(),
            repeatable: false,
            cooldown_days: 1,
            assigned_to: None,
            kind: QuestKind::Personal,
            days: BTreeSet::new(),
            rotation: Vec::new(),
            loot: String::new(),
            loot_rarity: LootRarity::Common,
            loot_value: 0,
        }
    }

    pub fn with_xp(mut self, xp: u64) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_gems(mut self, gems: u64) -> Self {
        self.gems = gems;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_kind(mut self, kind: QuestKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn with_cooldown_days(mut self, days: u32) -> Self {
        self.cooldown_days = days;
        self
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    pub fn with_assignee(mut self, player_id: impl Into<String>) -> Self {
        self.assigned_to = Some(player_id.into());
        self
    }

    pub fn with_rotation(mut self, roster: impl IntoIterator<Item = String>) -> Self {
        self.rotation = roster.into_iter().collect();
        self
    }

    pub fn with_loot(mut self, text: impl Into<String>, rarity: LootRarity, value: u64) -> Self {
        self.loot = text.into();
        self.loot_rarity = rarity;
        self.loot_value = value;
        self
    }

    pub fn has_loot(&self) -> bool {
        !self.loot.is_empty()
    }
}

fn default_reward_level() -> u32 {
    1
}

fn default_unlimited() -> i64 {
    -1
}

/// A perk or shop item players can claim or buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRecord {
    pub id: String,
    pub title: String,
    /// Level required before a non-shop reward can be claimed.
    #[serde(default = "default_reward_level")]
    pub level: u32,
    #[serde(rename = "type", default)]
    pub kind: RewardKind,
    /// Levels between repeats for interval rewards.
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub cost: u64,
    /// Stock; -1 = unlimited.
    #[serde(default = "default_unlimited")]
    pub quantity: i64,
    /// Days between purchases.
    #[serde(default)]
    pub shop_cooldown: u32,
    #[serde(default)]
    pub shop_scope: ShopScope,
}

impl RewardRecord {
    /// New reward with the catalog editor's defaults.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            level: 2,
            kind: RewardKind::Primary,
            interval: 2,
            cost: 0,
            quantity: -1,
            shop_cooldown: 1,
            shop_scope: ShopScope::Personal,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_kind(mut self, kind: RewardKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_shop_cooldown(mut self, days: u32) -> Self {
        self.shop_cooldown = days;
        self
    }

    pub fn with_scope(mut self, scope: ShopScope) -> Self {
        self.shop_scope = scope;
        self
    }

    pub fn is_shop_item(&self) -> bool {
        self.kind == RewardKind::Shop
    }
}

fn default_weekly_goal() -> u32 {
    DEFAULT_WEEKLY_GOAL
}

fn default_parent_pin() -> String {
    DEFAULT_PARENT_PIN.to_string()
}

/// The whole household economy: one snapshot document, one logical writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub users: Vec<PlayerRecord>,
    #[serde(default)]
    pub quests: Vec<QuestRecord>,
    #[serde(default)]
    pub rewards: Vec<RewardRecord>,
    #[serde(default = "default_parent_pin")]
    pub parent_pin: String,
    #[serde(default)]
    pub vacation_mode: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub vacation_start_time: Option<DateTime<Utc>>,
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: u32,
    #[serde(default)]
    pub wishlist: Vec<WishlistItem>,
    /// Global-scope shop stock, keyed by reward id.
    #[serde(default)]
    pub shop_state: HashMap<String, ShopStock>,
    /// Stamped by the store on save.
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl GameState {
    pub fn player(&self, id: &str) -> Option<&PlayerRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut PlayerRecord> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn quest(&self, id: &str) -> Option<&QuestRecord> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn quest_mut(&mut self, id: &str) -> Option<&mut QuestRecord> {
        self.quests.iter_mut().find(|q| q.id == id)
    }

    pub fn reward(&self, id: &str) -> Option<&RewardRecord> {
        self.rewards.iter().find(|r| r.id == id)
    }

    pub fn reward_mut(&mut self, id: &str) -> Option<&mut RewardRecord> {
        self.rewards.iter_mut().find(|r| r.id == id)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.users.iter().filter(|u| u.is_active())
    }

    pub fn require_player(&self, id: &str) -> Result<&PlayerRecord, EngineError> {
        self.player(id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.to_string()))
    }

    pub fn require_player_mut(&mut self, id: &str) -> Result<&mut PlayerRecord, EngineError> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.to_string()))
    }

    pub fn require_quest(&self, id: &str) -> Result<&QuestRecord, EngineError> {
        self.quest(id)
            .ok_or_else(|| EngineError::QuestNotFound(id.to_string()))
    }

    pub fn require_reward(&self, id: &str) -> Result<&RewardRecord, EngineError> {
        self.reward(id)
            .ok_or_else(|| EngineError::RewardNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, h, 0, 0).unwrap()
    }

    #[test]
    fn notification_log_is_capped_newest_first() {
        let mut player = PlayerRecord::new("u1", "Avery");
        for i in 0..25 {
            player.notify(format!("event {i}"), NotificationKind::Success, at(1));
        }
        assert_eq!(player.notifications.len(), NOTIFICATION_LOG_CAP);
        assert_eq!(player.notifications[0].message, "event 24");
        assert_eq!(player.notifications[19].message, "event 5");
    }

    #[test]
    fn notification_batch_keeps_priority_order() {
        let mut player = PlayerRecord::new("u1", "Avery");
        player.notify("old", NotificationKind::Success, at(1));
        player.notify_batch(vec![
            Notification::new("first", NotificationKind::Celebration, at(2)),
            Notification::new("second", NotificationKind::Success, at(2)),
        ]);
        let messages: Vec<_> = player
            .notifications
            .iter()
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(messages, vec!["first", "second", "old"]);
    }

    #[test]
    fn history_log_is_capped() {
        let mut player = PlayerRecord::new("u1", "Avery");
        let quest = QuestRecord::new("q1", "Dishes");
        for _ in 0..60 {
            player.record_history(HistoryEntry::new(&quest, at(3)));
        }
        assert_eq!(player.history.len(), HISTORY_LOG_CAP);
    }

    #[test]
    fn player_wire_format_uses_snapshot_names() {
        let mut player = PlayerRecord::new("u1", "Avery");
        player.total_xp = 250;
        player.cooldowns.insert("q1".to_string(), at(6));
        let value = serde_json::to_value(&player).unwrap();
        assert_eq!(value["totalXP"], 250);
        assert_eq!(value["themeColor"], "yellow");
        assert_eq!(value["isDeactivated"], false);
        assert_eq!(value["cooldowns"]["q1"], at(6).timestamp_millis());
    }

    #[test]
    fn quest_wire_format_uses_snapshot_names() {
        let quest = QuestRecord::new("q1", "Walk the dog")
            .with_kind(QuestKind::Rotating)
            .with_rotation(vec!["a".to_string(), "b".to_string()])
            .with_cooldown_days(2)
            .with_loot("Bone", LootRarity::Rare, 5);
        let value = serde_json::to_value(&quest).unwrap();
        assert_eq!(value["type"], "rotating");
        assert_eq!(value["cooldown"], 2);
        assert_eq!(value["rotatingIds"][1], "b");
        assert_eq!(value["lootRarity"], "rare");
        assert_eq!(value["lootValue"], 5);
    }

    #[test]
    fn sparse_player_document_fills_defaults() {
        let player: PlayerRecord =
            serde_json::from_str(r#"{"id":"u9","name":"Sam","totalXP":40}"#).unwrap();
        assert_eq!(player.level, 1);
        assert_eq!(player.total_xp, 40);
        assert_eq!(player.passcode, DEFAULT_PASSCODE);
        assert!(player.cooldowns.is_empty());
        assert!(!player.is_deactivated);
    }

    #[test]
    fn reward_defaults_to_unlimited_stock() {
        let reward: RewardRecord =
            serde_json::from_str(r#"{"id":"r1","title":"Movie night"}"#).unwrap();
        assert_eq!(reward.quantity, -1);
        assert_eq!(reward.kind, RewardKind::Primary);
        assert_eq!(reward.shop_scope, ShopScope::Personal);
    }

    #[test]
    fn cooldown_map_round_trips_epoch_millis() {
        let mut player = PlayerRecord::new("u1", "Avery");
        player.shop_cooldowns.insert("r1".to_string(), at(9));
        let json = serde_json::to_string(&player).unwrap();
        let back: PlayerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.shop_cooldowns["r1"], at(9));
    }
}
