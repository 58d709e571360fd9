use thiserror::Error;

/// Errors raised by the rules core for structural misuse.
///
/// Economy refusals (not enough gems, sold out, cooldown, daily cap) are not
/// errors: they append an error notification to the player and leave the rest
/// of the state untouched. Everything here means the caller asked for
/// something the state cannot express, and nothing was changed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Returned when looking up a player id that is not in the roster.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// Returned when looking up a quest id that is not in the catalog.
    #[error("quest not found: {0}")]
    QuestNotFound(String),

    /// Returned when looking up a reward id that is not in the catalog.
    #[error("reward not found: {0}")]
    RewardNotFound(String),

    /// Approve, deny and undo all require the quest to be pending review.
    #[error("quest {quest_id} is not pending for player {player_id}")]
    NotPending {
        player_id: String,
        quest_id: String,
    },

    /// Quest and reward titles must contain something printable.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The roster must always keep at least one active player.
    #[error("cannot deactivate the last active player")]
    LastActivePlayer,

    /// Claiming a reward above the player's level.
    #[error("reward requires level {required}, player is level {level}")]
    RewardLocked { required: u32, level: u32 },

    /// Shop rewards are bought with gems, not claimed.
    #[error("shop rewards must be purchased, not claimed")]
    NotClaimable,

    /// Fulfilling a reward the player never claimed.
    #[error("reward {0} has no outstanding claim")]
    NotClaimed(String),

    /// Selling or inspecting an inventory item that is not there.
    #[error("inventory item not found: {0}")]
    ItemNotFound(String),

    /// Wishlist entry lookup failure.
    #[error("wishlist item not found: {0}")]
    WishlistItemNotFound(String),

    /// Enabling vacation mode twice.
    #[error("vacation mode is already active")]
    VacationActive,

    /// Disabling vacation mode when it was never enabled.
    #[error("vacation mode is not active")]
    VacationNotActive,

    /// Input rejected by validation (names, titles, passcodes, PIN).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
