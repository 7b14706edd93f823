//! Simulation configuration.

use std::path::PathBuf;

use crate::character::CharacterClass;

/// Configuration for a batch of simulated battles.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of battles to fight
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Player level for every battle
    pub level: u32,

    pub class: CharacterClass,

    /// Region id to fight in (None = no region, enemies follow the player)
    pub region_id: Option<String>,

    /// Balance JSON overriding the shipped table
    pub balance_path: Option<PathBuf>,

    /// Heal below this share of max AP when a potion is available
    pub heal_threshold: f64,

    /// Log verbosity (0 = silent, 1 = summary, 2 = every battle)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 1000,
            seed: None,
            level: 1,
            class: CharacterClass::Warrior,
            region_id: None,
            balance_path: None,
            heal_threshold: 0.3,
            verbosity: 1,
        }
    }
}
