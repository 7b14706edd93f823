//! Saga - narrative RPG gameplay core
//!
//! Stats, enemy generation, turn-based combat, progression and the
//! heuristics that read narrative text back into game state. Front ends
//! (terminal, web) and the model that writes the story live elsewhere.

pub mod character;
pub mod combat;
pub mod core;
pub mod error;
pub mod items;
pub mod narrative;
pub mod save;
pub mod simulator;
pub mod zones;

pub use character::{Attributes, Character, CharacterClass, Gender};
pub use combat::{CombatPhase, CombatResult, CombatState, Enemy, PlayerAction, TurnStatus};
pub use crate::core::{BalanceConfig, GameData, GameState};
pub use error::{GameError, GameResult};
