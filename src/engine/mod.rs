//! The quest/reward economy rules core.
//!
//! Everything in here is synchronous and I/O-free: operations take the whole
//! [`GameState`](types::GameState), one explicitly sampled instant and the
//! resolved [`EngineConfig`](types::EngineConfig), mutate the snapshot and
//! return an outcome describing what happened. The caller owns the clock and
//! the persistence; the rules own everything in between.

pub mod approval;
pub mod clock;
pub mod errors;
pub mod progression;
pub mod scheduler;
pub mod shop;
pub mod state;
pub mod types;
pub mod vacation;

pub use approval::{approve, deny, submit, undo_submit, ApprovalOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::EngineError;
pub use progression::{grant_login_bonus, level_for, LoginOutcome};
pub use scheduler::{is_quest_visible, visible_quests, RotationRoster};
pub use shop::{
    claim, fulfill, purchase, reward_status, sell_item, PurchaseDenied, PurchaseOutcome,
    RewardStatus,
};
pub use state::seed_state;
pub use types::*;
pub use vacation::VacationSummary;
