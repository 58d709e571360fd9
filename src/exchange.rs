//! Bulk exchange formats: spreadsheet CSV for the quest and reward catalogs,
//! and the full JSON backup.
//!
//! CSV import is permissive by design: a half-edited spreadsheet should
//! never lose a whole import to one bad cell. Absent or unparseable fields
//! coerce to their defaults, and every coercion is reported back as a
//! warning instead of being swallowed. Import replaces the entire
//! collection.
//!
//! The backup is stricter: it is a whole-state replacement, so a document
//! missing any of the three core collections is rejected outright.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::engine::types::{
    GameState, LootRarity, PlayerRecord, QuestKind, QuestRecord, RewardKind, RewardRecord,
    ShopScope, ShopStock, WishlistItem, DEFAULT_WEEKLY_GOAL,
};

/// Backup schema version written on export.
pub const BACKUP_VERSION: &str = "v1";

pub const QUEST_CSV_HEADER: &str =
    "id,task,xp,gems,icon,repeatable,cooldown,assignedTo,type,days,rotatingIds,loot,lootRarity,lootValue";

pub const REWARD_CSV_HEADER: &str =
    "id,title,level,type,interval,cost,quantity,shopCooldown,shopScope";

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("backup is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A backup must carry all three core collections to be a whole state.
    #[error("backup is missing required collections: {0}")]
    MissingCollections(String),
}

/// One permissive-import coercion, reported instead of silently applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    /// 1-based line of the offending row in the source text.
    pub line: usize,
    pub field: String,
    pub message: String,
}

impl ImportWarning {
    fn new(line: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            line,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// --- CSV encoding ---------------------------------------------------------

/// Quote a field when it contains a comma, quote or newline; quotes double.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into records. Quoted fields may contain commas, doubled
/// quotes and newlines; records end at a newline outside quotes. Blank
/// records are dropped. Returns each record with its 1-based starting line.
fn parse_csv(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                line += 1;
                fields.push(std::mem::take(&mut field));
                let blank = fields.iter().all(|f| f.trim().is_empty());
                if !blank {
                    records.push((record_line, std::mem::take(&mut fields)));
                } else {
                    fields.clear();
                }
                record_line = line;
            }
            '\n' => {
                line += 1;
                field.push(c);
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    if !fields.iter().all(|f| f.trim().is_empty()) {
        records.push((record_line, fields));
    }
    records
}

fn field_at<'a>(row: &'a [String], index: usize) -> &'a str {
    row.get(index).map(String::as_str).unwrap_or("").trim()
}

fn parse_num<T: std::str::FromStr + Default>(
    row: &[String],
    index: usize,
    line: usize,
    name: &str,
    warnings: &mut Vec<ImportWarning>,
) -> T {
    let raw = field_at(row, index);
    if raw.is_empty() {
        return T::default();
    }
    raw.parse().unwrap_or_else(|_| {
        warnings.push(ImportWarning::new(
            line,
            name,
            format!("unparseable value {raw:?}, using default"),
        ));
        T::default()
    })
}

fn parse_bool(
    row: &[String],
    index: usize,
    line: usize,
    name: &str,
    warnings: &mut Vec<ImportWarning>,
) -> bool {
    match field_at(row, index) {
        "" | "false" => false,
        "true" => true,
        raw => {
            warnings.push(ImportWarning::new(
                line,
                name,
                format!("unparseable value {raw:?}, using false"),
            ));
            false
        }
    }
}

fn ensure_id(
    row: &[String],
    index: usize,
    line: usize,
    warnings: &mut Vec<ImportWarning>,
) -> String {
    let raw = field_at(row, index);
    if raw.is_empty() {
        let id = Uuid::new_v4().to_string();
        warnings.push(ImportWarning::new(line, "id", format!("missing id, generated {id}")));
        id
    } else {
        raw.to_string()
    }
}

// --- Quest CSV ------------------------------------------------------------

pub fn quests_to_csv(quests: &[QuestRecord]) -> String {
    let mut out = String::from(QUEST_CSV_HEADER);
    out.push('\n');
    for quest in quests {
        let days = quest
            .days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let rotation = quest.rotation.join(",");
        let row = [
            csv_escape(&quest.id),
            csv_escape(&quest.task),
            quest.xp.to_string(),
            quest.gems.to_string(),
            csv_escape(&quest.icon),
            quest.repeatable.to_string(),
            quest.cooldown_days.to_string(),
            csv_escape(quest.assigned_to.as_deref().unwrap_or("")),
            quest_kind_str(quest.kind).to_string(),
            csv_escape(&days),
            csv_escape(&rotation),
            csv_escape(&quest.loot),
            rarity_str(quest.loot_rarity).to_string(),
            quest.loot_value.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Parse the quest sheet. Rows are never rejected: bad cells coerce to
/// defaults and come back as warnings.
pub fn quests_from_csv(content: &str) -> (Vec<QuestRecord>, Vec<ImportWarning>) {
    let mut quests = Vec::new();
    let mut warnings = Vec::new();

    for (line, row) in parse_csv(content) {
        if field_at(&row, 0) == "id" {
            continue; // header
        }
        let id = ensure_id(&row, 0, line, &mut warnings);
        let task = field_at(&row, 1).to_string();
        if task.is_empty() {
            warnings.push(ImportWarning::new(line, "task", "empty task title"));
        }

        let mut days = BTreeSet::new();
        for part in field_at(&row, 9).split(',').filter(|p| !p.trim().is_empty()) {
            match part.trim().parse::<u8>() {
                Ok(d) if d <= 6 => {
                    days.insert(d);
                }
                _ => warnings.push(ImportWarning::new(
                    line,
                    "days",
                    format!("invalid weekday index {:?}, skipped", part.trim()),
                )),
            }
        }

        let rotation: Vec<String> = field_at(&row, 10)
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        let assigned = field_at(&row, 7);
        let kind = match field_at(&row, 8) {
            "" | "personal" => QuestKind::Personal,
            "global" => QuestKind::Global,
            "rotating" => QuestKind::Rotating,
            raw => {
                warnings.push(ImportWarning::new(
                    line,
                    "type",
                    format!("unknown quest type {raw:?}, using personal"),
                ));
                QuestKind::Personal
            }
        };
        let rarity = parse_rarity(&row, 12, line, &mut warnings);

        quests.push(QuestRecord {
            id,
            task,
            xp: parse_num(&row, 2, line, "xp", &mut warnings),
            gems: parse_num(&row, 3, line, "gems", &mut warnings),
            icon: {
                let icon = field_at(&row, 4);
                if icon.is_empty() { "✨".to_string() } else { icon.to_string() }
            },
            repeatable: parse_bool(&row, 5, line, "repeatable", &mut warnings),
            cooldown_days: parse_num(&row, 6, line, "cooldown", &mut warnings),
            assigned_to: (!assigned.is_empty()).then(|| assigned.to_string()),
            kind,
            days,
            rotation,
            loot: field_at(&row, 11).to_string(),
            loot_rarity: rarity,
            loot_value: parse_num(&row, 13, line, "lootValue", &mut warnings),
        });
    }

    if !warnings.is_empty() {
        warn!("quest import finished with {} coercion(s)", warnings.len());
    }
    (quests, warnings)
}

// --- Reward CSV -----------------------------------------------------------

pub fn rewards_to_csv(rewards: &[RewardRecord]) -> String {
    let mut out = String::from(REWARD_CSV_HEADER);
    out.push('\n');
    for reward in rewards {
        let row = [
            csv_escape(&reward.id),
            csv_escape(&reward.title),
            reward.level.to_string(),
            reward_kind_str(reward.kind).to_string(),
            reward.interval.to_string(),
            reward.cost.to_string(),
            reward.quantity.to_string(),
            reward.shop_cooldown.to_string(),
            scope_str(reward.shop_scope).to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn rewards_from_csv(content: &str) -> (Vec<RewardRecord>, Vec<ImportWarning>) {
    let mut rewards = Vec::new();
    let mut warnings = Vec::new();

    for (line, row) in parse_csv(content) {
        if field_at(&row, 0) == "id" {
            continue;
        }
        let id = ensure_id(&row, 0, line, &mut warnings);
        let title = field_at(&row, 1).to_string();
        if title.is_empty() {
            warnings.push(ImportWarning::new(line, "title", "empty title"));
        }
        let kind = match field_at(&row, 3) {
            "" | "primary" => RewardKind::Primary,
            "secondary" => RewardKind::Secondary,
            "interval" => RewardKind::Interval,
            "shop" => RewardKind::Shop,
            raw => {
                warnings.push(ImportWarning::new(
                    line,
                    "type",
                    format!("unknown reward type {raw:?}, using primary"),
                ));
                RewardKind::Primary
            }
        };
        let scope = match field_at(&row, 8) {
            "" | "personal" => ShopScope::Personal,
            "global" => ShopScope::Global,
            raw => {
                warnings.push(ImportWarning::new(
                    line,
                    "shopScope",
                    format!("unknown scope {raw:?}, using personal"),
                ));
                ShopScope::Personal
            }
        };

        rewards.push(RewardRecord {
            id,
            title,
            level: parse_num(&row, 2, line, "level", &mut warnings),
            kind,
            interval: parse_num(&row, 4, line, "interval", &mut warnings),
            cost: parse_num(&row, 5, line, "cost", &mut warnings),
            quantity: {
                let raw = field_at(&row, 6);
                if raw.is_empty() {
                    -1
                } else {
                    raw.parse().unwrap_or_else(|_| {
                        warnings.push(ImportWarning::new(
                            line,
                            "quantity",
                            format!("unparseable value {raw:?}, using unlimited"),
                        ));
                        -1
                    })
                }
            },
            shop_cooldown: parse_num(&row, 7, line, "shopCooldown", &mut warnings),
            shop_scope: scope,
        });
    }

    if !warnings.is_empty() {
        warn!("reward import finished with {} coercion(s)", warnings.len());
    }
    (rewards, warnings)
}

fn parse_rarity(
    row: &[String],
    index: usize,
    line: usize,
    warnings: &mut Vec<ImportWarning>,
) -> LootRarity {
    match field_at(row, index) {
        "" | "common" => LootRarity::Common,
        "rare" => LootRarity::Rare,
        "epic" => LootRarity::Epic,
        "legendary" => LootRarity::Legendary,
        raw => {
            warnings.push(ImportWarning::new(
                line,
                "lootRarity",
                format!("unknown rarity {raw:?}, using common"),
            ));
            LootRarity::Common
        }
    }
}

fn quest_kind_str(kind: QuestKind) -> &'static str {
    match kind {
        QuestKind::Personal => "personal",
        QuestKind::Global => "global",
        QuestKind::Rotating => "rotating",
    }
}

fn reward_kind_str(kind: RewardKind) -> &'static str {
    match kind {
        RewardKind::Primary => "primary",
        RewardKind::Secondary => "secondary",
        RewardKind::Interval => "interval",
        RewardKind::Shop => "shop",
    }
}

fn scope_str(scope: ShopScope) -> &'static str {
    match scope {
        ShopScope::Global => "global",
        ShopScope::Personal => "personal",
    }
}

fn rarity_str(rarity: LootRarity) -> &'static str {
    match rarity {
        LootRarity::Common => "common",
        LootRarity::Rare => "rare",
        LootRarity::Epic => "epic",
        LootRarity::Legendary => "legendary",
    }
}

// --- Full backup ----------------------------------------------------------

/// The on-wire backup document. Export always writes every field;
/// `weeklyGoal` is honored on import when present but not exported
/// (a long-standing quirk of the format, kept for compatibility).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupExport<'a> {
    users: &'a [PlayerRecord],
    quests: &'a [QuestRecord],
    rewards: &'a [RewardRecord],
    parent_pin: &'a str,
    vacation_mode: bool,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    vacation_start_time: Option<DateTime<Utc>>,
    wishlist: &'a [WishlistItem],
    shop_state: &'a HashMap<String, ShopStock>,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupImport {
    users: Option<Vec<PlayerRecord>>,
    quests: Option<Vec<QuestRecord>>,
    rewards: Option<Vec<RewardRecord>>,
    #[serde(default)]
    parent_pin: Option<String>,
    #[serde(default)]
    vacation_mode: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    vacation_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    weekly_goal: Option<u32>,
    #[serde(default)]
    wishlist: Vec<WishlistItem>,
    #[serde(default)]
    shop_state: HashMap<String, ShopStock>,
}

pub fn export_backup(state: &GameState) -> Result<String, ExchangeError> {
    let doc = BackupExport {
        users: &state.users,
        quests: &state.quests,
        rewards: &state.rewards,
        parent_pin: &state.parent_pin,
        vacation_mode: state.vacation_mode,
        vacation_start_time: state.vacation_start_time,
        wishlist: &state.wishlist,
        shop_state: &state.shop_state,
        version: BACKUP_VERSION,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a backup into a full replacement state. Requires the three core
/// collections; a missing or empty `parentPin` keeps `current_pin`. The
/// returned state's `last_updated` is stamped by the store on save.
pub fn import_backup(content: &str, current_pin: &str) -> Result<GameState, ExchangeError> {
    let doc: BackupImport = serde_json::from_str(content)?;

    let mut missing = Vec::new();
    if doc.users.is_none() {
        missing.push("users");
    }
    if doc.quests.is_none() {
        missing.push("quests");
    }
    if doc.rewards.is_none() {
        missing.push("rewards");
    }
    if !missing.is_empty() {
        return Err(ExchangeError::MissingCollections(missing.join(", ")));
    }

    let parent_pin = match doc.parent_pin {
        Some(pin) if !pin.is_empty() => pin,
        _ => current_pin.to_string(),
    };

    Ok(GameState {
        users: doc.users.unwrap_or_default(),
        quests: doc.quests.unwrap_or_default(),
        rewards: doc.rewards.unwrap_or_default(),
        parent_pin,
        vacation_mode: doc.vacation_mode,
        vacation_start_time: doc.vacation_start_time,
        weekly_goal: doc.weekly_goal.unwrap_or(DEFAULT_WEEKLY_GOAL),
        wishlist: doc.wishlist,
        shop_state: doc.shop_state,
        last_updated: DateTime::<Utc>::UNIX_EPOCH,
    })
}
