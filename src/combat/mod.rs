//! Combat: enemy generation, turn resolution and the encounter lifecycle.

pub mod generation;
pub mod log_stats;
pub mod logic;
pub mod session;
pub mod templates;
pub mod types;

pub use generation::{generate_enemy, GenerationOptions};
pub use logic::{initialize_combat, resolve, PlayerAction, TurnResolution, TurnStatus};
pub use session::{continue_encounter, end_combat, perform_action, return_to_adventure, start_combat};
pub use templates::EnemyTemplates;
pub use types::*;
