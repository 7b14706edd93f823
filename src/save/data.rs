//! On-disk save format and migration from older saves.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::character::attributes::Attributes;
use crate::character::{Character, CharacterClass, Gender};
use crate::core::balance::BalanceConfig;
use crate::core::combat_math::max_ap;
use crate::core::constants::{DEFAULT_ROUTE_ID, MAX_LEVEL, MIN_LEVEL, SAVE_VERSION, STARTING_LOCATION};
use crate::core::game_state::{ShopState, StoryLogEntry};
use crate::core::progression::{max_hp_for_level, max_mp_for_level};
use crate::items::Item;

/// AP stored next to the character. Version 1 saves kept AP only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApSnapshot {
    pub current_ap: u32,
    pub max_ap: u32,
}

/// Character as stored. Older saves may lack the AP/HP/MP fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCharacter {
    pub name: String,
    pub class: CharacterClass,
    #[serde(default = "default_gender")]
    pub gender: Gender,
    pub base_stats: Attributes,
    pub level: u32,
    #[serde(default)]
    pub exp: u32,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub active_quests: Vec<String>,
    #[serde(default)]
    pub completed_quests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_ap: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ap: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_mp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_mp: Option<u32>,
}

fn default_gender() -> Gender {
    Gender::Unspecified
}

fn default_location() -> String {
    STARTING_LOCATION.to_string()
}

fn default_route() -> String {
    DEFAULT_ROUTE_ID.to_string()
}

impl From<&Character> for SavedCharacter {
    fn from(c: &Character) -> Self {
        Self {
            name: c.name.clone(),
            class: c.class,
            gender: c.gender,
            base_stats: c.base_stats,
            level: c.level,
            exp: c.exp,
            gold: c.gold,
            inventory: c.inventory.clone(),
            active_quests: c.active_quests.clone(),
            completed_quests: c.completed_quests.clone(),
            current_ap: Some(c.current_ap),
            max_ap: Some(c.max_ap),
            current_hp: Some(c.current_hp),
            max_hp: Some(c.max_hp),
            current_mp: Some(c.current_mp),
            max_mp: Some(c.max_mp),
        }
    }
}

impl SavedCharacter {
    /// Rebuilds a character, filling whatever the save lacks.
    ///
    /// Missing HP/MP come from the level formulas at a random 85–100% of max.
    /// Missing AP falls back to the legacy snapshot, then to a full bar.
    /// `stats_bonus` is left at zero; the caller recomputes it once relics
    /// are known.
    pub fn into_character(
        self,
        legacy_ap: Option<ApSnapshot>,
        rng: &mut impl Rng,
        config: &BalanceConfig,
    ) -> Character {
        let level = self.level.clamp(MIN_LEVEL, MAX_LEVEL);
        let exp = if level >= MAX_LEVEL {
            0
        } else {
            self.exp.min(config.progression.exp_per_level.saturating_sub(1))
        };

        let max_ap = self
            .max_ap
            .or(legacy_ap.map(|s| s.max_ap))
            .unwrap_or_else(|| max_ap(level, config));
        let current_ap = self
            .current_ap
            .or(legacy_ap.map(|s| s.current_ap))
            .unwrap_or(max_ap)
            .min(max_ap);

        let fluctuation = config.progression.load_fluctuation_min;
        let max_hp = self.max_hp.unwrap_or_else(|| max_hp_for_level(level, config));
        let current_hp = self
            .current_hp
            .unwrap_or_else(|| fluctuate(max_hp, fluctuation, rng))
            .min(max_hp);
        let max_mp = self.max_mp.unwrap_or_else(|| max_mp_for_level(level, config));
        let current_mp = self
            .current_mp
            .unwrap_or_else(|| fluctuate(max_mp, fluctuation, rng))
            .min(max_mp);

        Character {
            name: self.name,
            class: self.class,
            gender: self.gender,
            base_stats: self.base_stats,
            level,
            exp,
            gold: self.gold.min(config.economy.max_gold),
            inventory: self.inventory,
            active_quests: self.active_quests,
            completed_quests: self.completed_quests,
            current_ap,
            max_ap,
            current_hp,
            max_hp,
            current_mp,
            max_mp,
            stats_bonus: Attributes::zero(),
        }
    }
}

fn fluctuate(max: u32, min_pct: f64, rng: &mut impl Rng) -> u32 {
    let pct = rng.gen_range(min_pct..=1.0);
    ((max as f64 * pct).floor() as u32).min(max)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub character: SavedCharacter,
    #[serde(default)]
    pub story_log: Vec<StoryLogEntry>,
    #[serde(default = "default_location")]
    pub current_location: String,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default = "default_route")]
    pub route_id: String,
    #[serde(default)]
    pub shop: ShopState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat_ap: Option<ApSnapshot>,
}

impl SaveData {
    pub fn is_current_version(&self) -> bool {
        self.version == SAVE_VERSION
    }
}
