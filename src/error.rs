//! Error types for the gameplay core.
//!
//! Each concern gets its own enum; `GameError` wraps them so session-level
//! operations can use `?` across combat, data, save and narrative calls.

use thiserror::Error;

/// Rejected combat actions. A rejected action never changes any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("not in combat")]
    NotInCombat,
    #[error("already in combat")]
    AlreadyInCombat,
    #[error("player is stunned and must skip this turn")]
    PlayerStunned,
    #[error("player is not stunned")]
    NotStunned,
    #[error("not enough AP: need {needed}, have {available}")]
    InsufficientAp { needed: u32, available: u32 },
    #[error("no usable {0} in inventory")]
    MissingConsumable(String),
    #[error("battle is still in progress")]
    StillInProgress,
}

/// Static game data inconsistencies. These are configuration bugs, caught by
/// `GameData::validate()` at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("unknown item key: {0}")]
    UnknownItem(String),
    #[error("unknown relic id: {0}")]
    UnknownRelic(String),
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    #[error("no enemy templates for rank {0}")]
    EmptyRankPool(String),
    #[error("invalid balance config: {0}")]
    InvalidBalance(String),
    #[error("invalid quest pattern for {quest_id}: {reason}")]
    InvalidQuestPattern { quest_id: String, reason: String },
    #[error("invalid {name} pattern: {reason}")]
    InvalidPattern { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no save in slot {0}")]
    SlotEmpty(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrativeError {
    #[error("token budget {requested} outside [{min}, {max}]")]
    InvalidTokenBudget { requested: u32, min: u32, max: u32 },
    #[error("narrative generation already in progress")]
    AlreadyGenerating,
    #[error("no messages to send")]
    EmptyConversation,
    #[error("narrative backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Narrative(#[from] NarrativeError),
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },
}

pub type GameResult<T> = Result<T, GameError>;
