//! Quest visibility and rotation.
//!
//! Visibility is a pure predicate over (quest, player, instant): assignment,
//! weekday schedule, cooldown and completion each filter independently, and
//! the admin force-active override beats all of them. Rotation is an ordered
//! roster with a current holder; advancement happens only through
//! [`RotationRoster::advance`] so there is exactly one place the pointer
//! moves.

use chrono::{DateTime, FixedOffset, Utc};

use super::clock::weekday_index;
use super::errors::EngineError;
use super::types::{GameState, PlayerRecord, QuestKind, QuestRecord};

/// The §4.2-style visibility predicate: force-active overrides everything,
/// otherwise assignment, weekday, cooldown and completion must all pass.
pub fn is_quest_visible(
    quest: &QuestRecord,
    player: &PlayerRecord,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> bool {
    if player.force_active_ids.contains(&quest.id) {
        return true;
    }

    let assignment_ok = match quest.kind {
        QuestKind::Personal => quest
            .assigned_to
            .as_deref()
            .map_or(true, |owner| owner == player.id),
        QuestKind::Global => true,
        QuestKind::Rotating => quest.assigned_to.as_deref() == Some(player.id.as_str()),
    };
    if !assignment_ok {
        return false;
    }

    if !quest.days.is_empty() && !quest.days.contains(&weekday_index(now, tz)) {
        return false;
    }

    if let Some(until) = player.cooldowns.get(&quest.id) {
        if *until > now {
            return false;
        }
    }

    if !quest.repeatable && player.completed_ids.contains(&quest.id) {
        return false;
    }

    true
}

/// Every quest the player could submit right now, in catalog order.
pub fn visible_quests<'a>(
    state: &'a GameState,
    player_id: &str,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<Vec<&'a QuestRecord>, EngineError> {
    let player = state.require_player(player_id)?;
    Ok(state
        .quests
        .iter()
        .filter(|quest| is_quest_visible(quest, player, now, tz))
        .collect())
}

/// Round-robin roster for rotating quests: the ordered member list plus the
/// current holder's position. `None` for the holder means the recorded
/// assignee is not (or no longer) a member; advancing from there hands the
/// quest to the first member.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationRoster {
    order: Vec<String>,
    holder: Option<usize>,
}

impl RotationRoster {
    /// Build from an ordered member list and the current holder. Returns
    /// None for an empty roster, which has nobody to hand anything to.
    pub fn new(order: &[String], current: Option<&str>) -> Option<Self> {
        if order.is_empty() {
            return None;
        }
        let holder = current.and_then(|id| order.iter().position(|member| member == id));
        Some(Self {
            order: order.to_vec(),
            holder,
        })
    }

    pub fn current(&self) -> Option<&str> {
        self.holder.map(|i| self.order[i].as_str())
    }

    /// Who `advance` would hand the quest to.
    pub fn peek_next(&self) -> &str {
        let next = match self.holder {
            Some(i) => (i + 1) % self.order.len(),
            None => 0,
        };
        &self.order[next]
    }

    /// Move the pointer to the next member and return the new holder.
    pub fn advance(&mut self) -> &str {
        let next = match self.holder {
            Some(i) => (i + 1) % self.order.len(),
            None => 0,
        };
        self.holder = Some(next);
        &self.order[next]
    }
}
