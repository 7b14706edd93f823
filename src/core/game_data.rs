//! Static game data bundle, validated once at startup.

use tracing::info;

use super::balance::BalanceConfig;
use super::constants::{ARCANE_TONIC_KEY, ARCANE_TONIC_NAME, HEAL_POTION_KEY, HEAL_POTION_NAME};
use crate::combat::templates::EnemyTemplates;
use crate::error::DataError;
use crate::items::{ItemRegistry, RelicRegistry};
use crate::narrative::quests::{standard_quests, QuestBook, QuestDefinition};
use crate::narrative::NarrativeEventDetector;
use crate::zones::{get_all_regions, Region};

/// Everything the gameplay core reads but never writes.
#[derive(Debug, Clone)]
pub struct GameData {
    pub balance: BalanceConfig,
    pub items: ItemRegistry,
    pub relics: RelicRegistry,
    pub enemies: EnemyTemplates,
    pub regions: Vec<Region>,
    pub quests: QuestBook,
    pub detector: NarrativeEventDetector,
}

impl GameData {
    /// Shipped data with the default balance table.
    pub fn standard() -> Result<Self, DataError> {
        Self::with_balance(BalanceConfig::default())
    }

    /// Shipped data with a custom balance table.
    pub fn with_balance(balance: BalanceConfig) -> Result<Self, DataError> {
        Self::build(balance, &standard_quests())
    }

    pub fn build(balance: BalanceConfig, quests: &[QuestDefinition]) -> Result<Self, DataError> {
        let data = Self {
            balance,
            items: ItemRegistry::standard(),
            relics: RelicRegistry::standard(),
            enemies: EnemyTemplates::standard(),
            regions: get_all_regions(),
            quests: QuestBook::new(quests)?,
            detector: NarrativeEventDetector::new()?,
        };
        data.validate()?;
        info!(
            items = data.items.iter().count(),
            enemies = data.enemies.normal.len(),
            regions = data.regions.len(),
            "game data loaded"
        );
        Ok(data)
    }

    /// Cross-checks the tables against each other: every item key a reward
    /// or drop pool names must exist, the potion keys must carry the names
    /// the combat engine looks up, and the balance table must be consistent.
    pub fn validate(&self) -> Result<(), DataError> {
        self.balance.validate()?;

        for key in self.enemies.reward_item_keys() {
            if !self.items.contains(key) {
                return Err(DataError::UnknownItem(key.to_string()));
            }
        }
        for key in &self.balance.enemies.treasure_drop_pool {
            if !self.items.contains(key) {
                return Err(DataError::UnknownItem(key.clone()));
            }
        }

        for (key, name) in [
            (HEAL_POTION_KEY, HEAL_POTION_NAME),
            (ARCANE_TONIC_KEY, ARCANE_TONIC_NAME),
        ] {
            match self.items.get(key) {
                Some(template) if template.name == name => {}
                _ => return Err(DataError::UnknownItem(key.to_string())),
            }
        }

        Ok(())
    }

    pub fn region(&self, id: &str) -> Result<&Region, DataError> {
        self.regions
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| DataError::UnknownRegion(id.to_string()))
    }

    /// Region of this bundle a free-form location belongs to, if any.
    pub fn region_for_location(&self, location: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.matches_location(location))
    }
}
