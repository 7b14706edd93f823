//! Enemy generation: treasure roll, rank roll, template pick, level targeting,
//! then HP/attack/defense/reward scaling.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use uuid::Uuid;

use super::templates::{EnemyTemplate, EnemyTemplates, TreasureTemplate};
use super::types::{Enemy, EnemyRank, EnemyRewards};
use crate::core::balance::BalanceConfig;
use crate::core::constants::{MAX_LEVEL, MIN_LEVEL};
use crate::error::DataError;
use crate::zones::Region;

/// Knobs for a single generation call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions {
    /// Debug switch: always produce a treasure monster.
    pub force_treasure: bool,
}

/// Builds a fresh enemy for an encounter.
pub fn generate_enemy(
    player_level: u32,
    region: Option<&Region>,
    templates: &EnemyTemplates,
    options: GenerationOptions,
    rng: &mut impl Rng,
    config: &BalanceConfig,
) -> Result<Enemy, DataError> {
    let treasure_roll = options.force_treasure
        || rng.gen_bool(config.enemies.treasure_monster_chance);
    if treasure_roll {
        if let Some(template) = templates.treasure.choose(rng) {
            let level = target_level(player_level, region, rng, config);
            return Ok(build_treasure_monster(template, level, rng, config));
        }
    }

    let rank = roll_rank(player_level, rng, config);
    let template = select_template(rank, region, templates, rng)?;
    let level = target_level(player_level, region, rng, config);
    Ok(build_enemy(template, level, config))
}

/// Level-bucketed weighted rank roll.
pub fn roll_rank(player_level: u32, rng: &mut impl Rng, config: &BalanceConfig) -> EnemyRank {
    let bucket = config
        .enemies
        .rank_buckets
        .iter()
        .find(|b| b.below_level.map_or(true, |limit| player_level < limit));
    let Some(bucket) = bucket else {
        return EnemyRank::D;
    };

    let ranks = EnemyRank::all();
    let weights = ranks.map(|rank| bucket.weights.get(rank));
    match WeightedIndex::new(weights) {
        Ok(dist) => ranks[dist.sample(rng)],
        Err(_) => EnemyRank::D,
    }
}

/// Random template of the rank, preferring ones that share a biome with the
/// region. Falls back to the whole rank pool when nothing matches.
pub fn select_template<'a>(
    rank: EnemyRank,
    region: Option<&Region>,
    templates: &'a EnemyTemplates,
    rng: &mut impl Rng,
) -> Result<&'a EnemyTemplate, DataError> {
    let pool: Vec<&EnemyTemplate> = templates.by_rank(rank).collect();
    if pool.is_empty() {
        return Err(DataError::EmptyRankPool(rank.label().to_string()));
    }

    let filtered: Vec<&EnemyTemplate> = match region {
        Some(region) => pool
            .iter()
            .copied()
            .filter(|t| t.biomes.iter().any(|b| region.has_biome(*b)))
            .collect(),
        None => Vec::new(),
    };

    let candidates = if filtered.is_empty() { &pool } else { &filtered };
    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| DataError::EmptyRankPool(rank.label().to_string()))
}

/// Picks the enemy level.
///
/// Static phase: while the player is within `max_level + buffer`, pick inside
/// the region range with a small jitter. Dynamic phase: follow the player
/// with a tier-dependent offset, never below the region minimum. Without a
/// region, stay within a small spread of the player level.
pub fn target_level(
    player_level: u32,
    region: Option<&Region>,
    rng: &mut impl Rng,
    config: &BalanceConfig,
) -> u32 {
    let e = &config.enemies;
    let level = match region {
        Some(region) if player_level <= region.max_level + e.dynamic_level_buffer => {
            let base = rng.gen_range(region.min_level..=region.max_level) as i64;
            let jitter = rng.gen_range(-e.static_level_jitter..=e.static_level_jitter) as i64;
            (base + jitter).clamp(MIN_LEVEL as i64, MAX_LEVEL as i64)
        }
        Some(region) => {
            let range = e.tier_offsets.get(region.tier);
            let offset = rng.gen_range(range.min..=range.max) as i64;
            (player_level as i64 + offset).clamp(region.min_level as i64, MAX_LEVEL as i64)
        }
        None => {
            let offset =
                rng.gen_range(-e.unscaled_level_spread..=e.unscaled_level_spread) as i64;
            (player_level as i64 + offset).clamp(MIN_LEVEL as i64, MAX_LEVEL as i64)
        }
    };
    level as u32
}

/// HP multiplier from the piecewise-linear growth curve. Each segment
/// continues from where the previous one ended.
pub fn hp_multiplier(level: u32, config: &BalanceConfig) -> f64 {
    let segment = config
        .enemies
        .hp_curve
        .iter()
        .rev()
        .find(|s| level >= s.level_threshold);
    match segment {
        Some(s) => s.base_multiplier + (level - s.level_threshold) as f64 * s.growth_rate,
        None => 1.0,
    }
}

pub fn scaled_hp(base_hp: u32, level: u32, rank: EnemyRank, config: &BalanceConfig) -> u32 {
    let hp = base_hp as f64
        * hp_multiplier(level, config)
        * config.enemies.rank_hp_multiplier.get(rank);
    (hp.floor() as u32).max(1)
}

/// Linear attack/defense growth: `base × (1 + (level-1) × growth)`.
pub fn scaled_stat(base: u32, level: u32, config: &BalanceConfig) -> u32 {
    let factor = 1.0 + level.saturating_sub(1) as f64 * config.enemies.stat_growth_per_level;
    (base as f64 * factor).floor() as u32
}

/// Gold and exp for a regular enemy.
pub fn scaled_rewards(level: u32, rank: EnemyRank, config: &BalanceConfig) -> (u32, u32) {
    let e = &config.enemies;
    let mult = e.rank_reward_multiplier.get(rank);
    let gold = ((e.gold_base + level * e.gold_per_level) as f64 * mult).floor() as u32;
    let exp = ((e.exp_base + level * e.exp_per_level) as f64 * mult).floor() as u32;
    (gold, exp)
}

fn build_enemy(template: &EnemyTemplate, level: u32, config: &BalanceConfig) -> Enemy {
    let max_hp = scaled_hp(template.base_hp, level, template.rank, config);
    let (gold, exp) = scaled_rewards(level, template.rank, config);
    Enemy {
        id: Uuid::new_v4().to_string(),
        name: template.name.to_string(),
        level,
        rank: template.rank,
        current_hp: max_hp,
        max_hp,
        attack: scaled_stat(template.base_attack, level, config),
        defense: scaled_stat(template.base_defense, level, config),
        is_treasure_monster: false,
        rewards: EnemyRewards {
            gold,
            exp,
            items: template.reward_items.iter().map(|k| k.to_string()).collect(),
        },
        family: template.family.to_string(),
        element: template.element.to_string(),
        biomes: template.biomes.to_vec(),
    }
}

fn build_treasure_monster(
    template: &TreasureTemplate,
    level: u32,
    rng: &mut impl Rng,
    config: &BalanceConfig,
) -> Enemy {
    let e = &config.enemies;
    let mut items = Vec::new();
    if rng.gen_bool(e.treasure_drop_chance) {
        let count = rng.gen_range(e.treasure_drop_min..=e.treasure_drop_max);
        for _ in 0..count {
            if let Some(key) = e.treasure_drop_pool.choose(rng) {
                items.push(key.clone());
            }
        }
    }

    Enemy {
        id: Uuid::new_v4().to_string(),
        name: template.name.to_string(),
        level,
        rank: EnemyRank::D,
        current_hp: template.hp,
        max_hp: template.hp,
        attack: template.attack,
        defense: template.defense,
        is_treasure_monster: true,
        rewards: EnemyRewards {
            gold: template.gold,
            exp: e.treasure_exp,
            items,
        },
        family: "treasure".to_string(),
        element: template.element.to_string(),
        biomes: Vec::new(),
    }
}
