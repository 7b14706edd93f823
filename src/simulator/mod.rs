//! Balance simulator for Monte Carlo analysis.
//!
//! Fights thousands of battles at a chosen level and region to check:
//! - Win/defeat/retreat/timeout rates
//! - AP spent and taken per battle
//! - How each enemy rank holds up against the player
//!
//! Battles run through `combat::session`, so results match real gameplay.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{BattleRecord, SimReport};
pub use runner::{choose_action, run_simulation};
