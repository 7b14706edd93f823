//! Balance tables, stat math, progression and the session object.

pub mod balance;
pub mod combat_math;
pub mod constants;
pub mod game_data;
pub mod game_state;
pub mod progression;

pub use balance::BalanceConfig;
pub use game_data::GameData;
pub use game_state::{GameState, NarrativeEffects, ShopState, StoryLogEntry};
