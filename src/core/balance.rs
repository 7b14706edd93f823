//! Balance table: every tunable number used by combat, enemy generation,
//! progression and the economy.
//!
//! The shipped values come from `BalanceConfig::default()`. A JSON file can
//! override any subset of them (missing sections fall back to the defaults),
//! so tuning does not need a rebuild.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::combat::types::EnemyRank;
use crate::error::{DataError, GameError, SaveError};
use crate::zones::RegionTier;

/// Per-rank values, D (weakest) to A (strongest).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankTable<T> {
    pub d: T,
    pub c: T,
    pub b: T,
    pub a: T,
}

impl<T: Copy> RankTable<T> {
    pub fn get(&self, rank: EnemyRank) -> T {
        match rank {
            EnemyRank::D => self.d,
            EnemyRank::C => self.c,
            EnemyRank::B => self.b,
            EnemyRank::A => self.a,
        }
    }
}

/// Attack power weights per attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWeights {
    pub str: f64,
    pub dex: f64,
    pub int: f64,
    pub cha: f64,
    pub luck: f64,
}

/// One food price band. `max_price` is exclusive; `None` closes the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodBand {
    pub max_price: Option<u32>,
    pub percent: f64,
    pub flat: u32,
}

/// Rank weights used while the player level is below `below_level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankBucket {
    pub below_level: Option<u32>,
    pub weights: RankTable<u32>,
}

/// One segment of the enemy HP growth curve.
///
/// From `level_threshold` on, the multiplier is
/// `base_multiplier + (level - level_threshold) * growth_rate`
/// until the next segment takes over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HpSegment {
    pub level_threshold: u32,
    pub base_multiplier: f64,
    pub growth_rate: f64,
}

/// Inclusive offset range applied to the player level in the dynamic phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOffsets {
    pub low: OffsetRange,
    pub mid: OffsetRange,
    pub high: OffsetRange,
    pub endgame: OffsetRange,
}

impl TierOffsets {
    pub fn get(&self, tier: RegionTier) -> OffsetRange {
        match tier {
            RegionTier::Low => self.low,
            RegionTier::Mid => self.mid,
            RegionTier::High => self.high,
            RegionTier::Endgame => self.endgame,
        }
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApBalance {
    /// Max AP at level 1.
    pub base_max_ap: u32,
    /// Max AP gained per level above 1.
    pub ap_per_level: u32,
    /// Flat AP restored by each dialogue exchange.
    pub dialogue_recovery: u32,
    /// Food recovery bands, ordered by ascending price.
    pub food_bands: Vec<FoodBand>,
}

impl Default for ApBalance {
    fn default() -> Self {
        Self {
            base_max_ap: 100,
            ap_per_level: 5,
            dialogue_recovery: 5,
            food_bands: vec![
                FoodBand {
                    max_price: Some(20),
                    percent: 0.10,
                    flat: 2,
                },
                FoodBand {
                    max_price: Some(50),
                    percent: 0.20,
                    flat: 5,
                },
                FoodBand {
                    max_price: Some(100),
                    percent: 0.35,
                    flat: 10,
                },
                FoodBand {
                    max_price: None,
                    percent: 0.60,
                    flat: 20,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatBalance {
    pub encounter_ap_cost: u32,
    pub attack_ap_cost: u32,
    pub defend_ap_cost: u32,
    pub retreat_ap_penalty: u32,
    pub stat_weights: StatWeights,
    pub level_multiplier: f64,
    /// Damage roll spread, 0.1 = ±10%.
    pub damage_variance: f64,
    pub strong_attack_chance: f64,
    pub strong_attack_multiplier: f64,
    /// Incoming AP damage factor while defending.
    pub defend_reduction: f64,
    /// `(DEX + LUCK) / retreat_divisor` is the retreat success chance.
    pub retreat_divisor: f64,
    pub max_turns: u32,
    pub treasure_max_turns: u32,
    /// Share of max AP restored by a heal potion, instantly and per regen tick.
    pub heal_potion_percent: f64,
    /// Total heal potion turns, including the instant one.
    pub heal_potion_turns: u32,
}

impl Default for CombatBalance {
    fn default() -> Self {
        Self {
            encounter_ap_cost: 10,
            attack_ap_cost: 5,
            defend_ap_cost: 3,
            retreat_ap_penalty: 10,
            stat_weights: StatWeights {
                str: 1.5,
                dex: 1.0,
                int: 1.0,
                cha: 0.5,
                luck: 0.8,
            },
            level_multiplier: 2.0,
            damage_variance: 0.1,
            strong_attack_chance: 0.25,
            strong_attack_multiplier: 2.0,
            defend_reduction: 0.5,
            retreat_divisor: 200.0,
            max_turns: 20,
            treasure_max_turns: 5,
            heal_potion_percent: 0.2,
            heal_potion_turns: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyBalance {
    pub treasure_monster_chance: f64,
    pub treasure_exp: u32,
    pub treasure_drop_chance: f64,
    pub treasure_drop_min: u32,
    pub treasure_drop_max: u32,
    /// Consumable item keys treasure monsters can drop.
    pub treasure_drop_pool: Vec<String>,
    /// Level-bucketed rank weights, ordered by ascending `below_level`.
    pub rank_buckets: Vec<RankBucket>,
    /// HP multiplier curve, ordered by ascending `level_threshold`.
    pub hp_curve: Vec<HpSegment>,
    pub rank_hp_multiplier: RankTable<f64>,
    pub rank_reward_multiplier: RankTable<f64>,
    /// Attack/defense growth per level above 1.
    pub stat_growth_per_level: f64,
    pub gold_base: u32,
    pub gold_per_level: u32,
    pub exp_base: u32,
    pub exp_per_level: u32,
    /// Levels past a region's max before enemies start following the player.
    pub dynamic_level_buffer: u32,
    pub tier_offsets: TierOffsets,
    /// ± jitter on the level picked inside a region's range.
    pub static_level_jitter: i32,
    /// ± spread around the player level when no region is known.
    pub unscaled_level_spread: i32,
}

impl Default for EnemyBalance {
    fn default() -> Self {
        Self {
            treasure_monster_chance: 0.05,
            treasure_exp: 5,
            treasure_drop_chance: 0.8,
            treasure_drop_min: 2,
            treasure_drop_max: 4,
            treasure_drop_pool: vec![
                "heal_potion".to_string(),
                "arcane_tonic".to_string(),
                "trail_ration".to_string(),
                "smoke_bomb".to_string(),
            ],
            rank_buckets: vec![
                RankBucket {
                    below_level: Some(5),
                    weights: RankTable {
                        d: 70,
                        c: 25,
                        b: 5,
                        a: 0,
                    },
                },
                RankBucket {
                    below_level: Some(10),
                    weights: RankTable {
                        d: 50,
                        c: 35,
                        b: 12,
                        a: 3,
                    },
                },
                RankBucket {
                    below_level: Some(20),
                    weights: RankTable {
                        d: 30,
                        c: 40,
                        b: 22,
                        a: 8,
                    },
                },
                RankBucket {
                    below_level: None,
                    weights: RankTable {
                        d: 15,
                        c: 35,
                        b: 32,
                        a: 18,
                    },
                },
            ],
            hp_curve: vec![
                HpSegment {
                    level_threshold: 1,
                    base_multiplier: 1.0,
                    growth_rate: 0.15,
                },
                HpSegment {
                    level_threshold: 4,
                    base_multiplier: 1.45,
                    growth_rate: 0.20,
                },
                HpSegment {
                    level_threshold: 8,
                    base_multiplier: 2.25,
                    growth_rate: 0.25,
                },
                HpSegment {
                    level_threshold: 13,
                    base_multiplier: 3.5,
                    growth_rate: 0.30,
                },
            ],
            rank_hp_multiplier: RankTable {
                d: 1.0,
                c: 1.15,
                b: 1.3,
                a: 1.5,
            },
            rank_reward_multiplier: RankTable {
                d: 1.0,
                c: 1.5,
                b: 2.5,
                a: 4.0,
            },
            stat_growth_per_level: 0.1,
            gold_base: 20,
            gold_per_level: 5,
            exp_base: 15,
            exp_per_level: 3,
            dynamic_level_buffer: 5,
            tier_offsets: TierOffsets {
                low: OffsetRange { min: -5, max: -1 },
                mid: OffsetRange { min: -3, max: 1 },
                high: OffsetRange { min: -2, max: 2 },
                endgame: OffsetRange { min: 0, max: 4 },
            },
            static_level_jitter: 1,
            unscaled_level_spread: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionBalance {
    pub exp_per_level: u32,
    pub base_hp: u32,
    pub hp_per_level: u32,
    pub base_mp: u32,
    pub mp_per_level: u32,
    pub level_up_restore_min: f64,
    pub level_up_restore_max: f64,
    pub fatigue_drain_min: f64,
    pub fatigue_drain_max: f64,
    /// Fatigue never drains below this share of max.
    pub fatigue_floor: f64,
    /// Lower bound of the random fill used when an old save lacks HP/MP.
    pub load_fluctuation_min: f64,
}

impl Default for ProgressionBalance {
    fn default() -> Self {
        Self {
            exp_per_level: 100,
            base_hp: 100,
            hp_per_level: 20,
            base_mp: 50,
            mp_per_level: 10,
            level_up_restore_min: 0.9,
            level_up_restore_max: 1.0,
            fatigue_drain_min: 0.005,
            fatigue_drain_max: 0.02,
            fatigue_floor: 0.7,
            load_fluctuation_min: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyBalance {
    pub max_gold: u32,
    pub stack_cap: u32,
}

impl Default for EconomyBalance {
    fn default() -> Self {
        Self {
            max_gold: 999_999,
            stack_cap: 99,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeBalance {
    pub min_tokens: u32,
    pub max_tokens: u32,
    pub default_tokens: u32,
    /// Exp granted when the narrative describes a won fight.
    pub victory_exp: u32,
    /// How many story entries are sent as context.
    pub history_window: usize,
}

impl Default for NarrativeBalance {
    fn default() -> Self {
        Self {
            min_tokens: 256,
            max_tokens: 8192,
            default_tokens: 1024,
            victory_exp: 10,
            history_window: 20,
        }
    }
}

/// The full balance table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub ap: ApBalance,
    pub combat: CombatBalance,
    pub enemies: EnemyBalance,
    pub progression: ProgressionBalance,
    pub economy: EconomyBalance,
    pub narrative: NarrativeBalance,
}

impl BalanceConfig {
    /// Parses a (possibly partial) balance table and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let config: BalanceConfig = serde_json::from_str(json).map_err(SaveError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let json = fs::read_to_string(path).map_err(SaveError::from)?;
        Self::from_json_str(&json)
    }

    /// Checks internal consistency of the table.
    pub fn validate(&self) -> Result<(), DataError> {
        let invalid = |msg: String| Err(DataError::InvalidBalance(msg));

        for (name, p) in [
            ("strong_attack_chance", self.combat.strong_attack_chance),
            ("treasure_monster_chance", self.enemies.treasure_monster_chance),
            ("treasure_drop_chance", self.enemies.treasure_drop_chance),
            ("heal_potion_percent", self.combat.heal_potion_percent),
            ("fatigue_floor", self.progression.fatigue_floor),
            ("load_fluctuation_min", self.progression.load_fluctuation_min),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{} must be within [0, 1], got {}", name, p));
            }
        }
        if !(0.0..1.0).contains(&self.combat.damage_variance) {
            return invalid("damage_variance must be within [0, 1)".to_string());
        }
        if self.combat.retreat_divisor <= 0.0 {
            return invalid("retreat_divisor must be positive".to_string());
        }
        if self.combat.heal_potion_turns == 0 {
            return invalid("heal_potion_turns must be at least 1".to_string());
        }
        if self.progression.exp_per_level == 0 {
            return invalid("exp_per_level must be positive".to_string());
        }
        if self.progression.fatigue_drain_min > self.progression.fatigue_drain_max {
            return invalid("fatigue drain range is inverted".to_string());
        }
        if self.progression.level_up_restore_min > self.progression.level_up_restore_max {
            return invalid("level-up restore range is inverted".to_string());
        }
        if self.enemies.treasure_drop_min > self.enemies.treasure_drop_max {
            return invalid("treasure drop range is inverted".to_string());
        }
        for (name, spread) in [
            ("static_level_jitter", self.enemies.static_level_jitter),
            ("unscaled_level_spread", self.enemies.unscaled_level_spread),
        ] {
            if spread < 0 {
                return invalid(format!("{} must not be negative, got {}", name, spread));
            }
        }
        if self.enemies.treasure_drop_pool.is_empty() {
            return invalid("treasure_drop_pool is empty".to_string());
        }
        if self.narrative.min_tokens > self.narrative.max_tokens {
            return invalid("token budget range is inverted".to_string());
        }

        for offsets in [
            self.enemies.tier_offsets.low,
            self.enemies.tier_offsets.mid,
            self.enemies.tier_offsets.high,
            self.enemies.tier_offsets.endgame,
        ] {
            if offsets.min > offsets.max {
                return invalid(format!("tier offset {:?} is inverted", offsets));
            }
        }

        check_open_ended(
            self.ap.food_bands.iter().map(|b| b.max_price),
            "food_bands",
        )?;
        check_open_ended(
            self.enemies.rank_buckets.iter().map(|b| b.below_level),
            "rank_buckets",
        )?;
        for bucket in &self.enemies.rank_buckets {
            let w = bucket.weights;
            if w.d + w.c + w.b + w.a == 0 {
                return invalid("rank bucket with all-zero weights".to_string());
            }
        }

        self.validate_hp_curve()
    }

    /// The curve must start at level 1, ascend, and each segment must begin
    /// where the previous one ends.
    fn validate_hp_curve(&self) -> Result<(), DataError> {
        let curve = &self.enemies.hp_curve;
        let Some(first) = curve.first() else {
            return Err(DataError::InvalidBalance("hp_curve is empty".to_string()));
        };
        if first.level_threshold != 1 {
            return Err(DataError::InvalidBalance(
                "hp_curve must start at level 1".to_string(),
            ));
        }
        for pair in curve.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.level_threshold <= prev.level_threshold {
                return Err(DataError::InvalidBalance(
                    "hp_curve thresholds must ascend".to_string(),
                ));
            }
            let span = (next.level_threshold - prev.level_threshold) as f64;
            let expected = prev.base_multiplier + span * prev.growth_rate;
            if (expected - next.base_multiplier).abs() > 1e-6 {
                return Err(DataError::InvalidBalance(format!(
                    "hp_curve discontinuous at level {}: expected {:.4}, got {:.4}",
                    next.level_threshold, expected, next.base_multiplier
                )));
            }
        }
        Ok(())
    }
}

/// Bounded tables must ascend and end with exactly one open (`None`) entry.
fn check_open_ended(
    bounds: impl Iterator<Item = Option<u32>>,
    name: &str,
) -> Result<(), DataError> {
    let bounds: Vec<Option<u32>> = bounds.collect();
    match bounds.last() {
        Some(None) => {}
        _ => {
            return Err(DataError::InvalidBalance(format!(
                "{} must end with an open-ended entry",
                name
            )))
        }
    }
    let closed: Vec<u32> = bounds[..bounds.len() - 1]
        .iter()
        .map(|b| b.ok_or_else(|| DataError::InvalidBalance(format!("{} has an early open entry", name))))
        .collect::<Result<_, _>>()?;
    if closed.windows(2).any(|w| w[1] <= w[0]) {
        return Err(DataError::InvalidBalance(format!(
            "{} bounds must ascend",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(BalanceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let json = r#"{ "combat": { "attack_ap_cost": 7 } }"#;
        let config = BalanceConfig::from_json_str(json).unwrap();
        assert_eq!(config.combat.attack_ap_cost, 7);
        assert_eq!(config.combat.defend_ap_cost, 3);
        assert_eq!(config.ap.base_max_ap, 100);
    }

    #[test]
    fn test_json_roundtrip_keeps_every_value() {
        let config = BalanceConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = BalanceConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_discontinuous_hp_curve_rejected() {
        let mut config = BalanceConfig::default();
        config.enemies.hp_curve[2].base_multiplier = 2.5;
        assert!(matches!(
            config.validate(),
            Err(DataError::InvalidBalance(msg)) if msg.contains("discontinuous")
        ));
    }

    #[test]
    fn test_food_bands_must_end_open() {
        let mut config = BalanceConfig::default();
        config.ap.food_bands.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let mut config = BalanceConfig::default();
        config.combat.strong_attack_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_level_spread_rejected() {
        let json = r#"{ "enemies": { "unscaled_level_spread": -2 } }"#;
        assert!(matches!(
            BalanceConfig::from_json_str(json),
            Err(GameError::Data(DataError::InvalidBalance(msg))) if msg.contains("unscaled_level_spread")
        ));
    }

    #[test]
    fn test_negative_level_jitter_rejected() {
        let mut config = BalanceConfig::default();
        config.enemies.static_level_jitter = -1;
        assert!(matches!(
            config.validate(),
            Err(DataError::InvalidBalance(msg)) if msg.contains("static_level_jitter")
        ));
    }

    #[test]
    fn test_zero_level_spread_allowed() {
        let mut config = BalanceConfig::default();
        config.enemies.static_level_jitter = 0;
        config.enemies.unscaled_level_spread = 0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_load_fluctuation_outside_unit_range_rejected() {
        let mut config = BalanceConfig::default();
        config.progression.load_fluctuation_min = 1.2;
        assert!(matches!(
            config.validate(),
            Err(DataError::InvalidBalance(msg)) if msg.contains("load_fluctuation_min")
        ));
        config.progression.load_fluctuation_min = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rank_table_lookup() {
        let table = BalanceConfig::default().enemies.rank_reward_multiplier;
        assert_eq!(table.get(EnemyRank::D), 1.0);
        assert_eq!(table.get(EnemyRank::A), 4.0);
    }
}
