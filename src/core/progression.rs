//! Experience, levels and the cosmetic HP/MP stats.
//!
//! HP and MP never affect combat; they only drift to make the character
//! sheet feel alive. AP is the resource that matters.

use rand::Rng;
use tracing::info;

use super::balance::BalanceConfig;
use super::combat_math::max_ap;
use super::constants::MAX_LEVEL;
use crate::character::Character;

/// Outcome of adding experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGain {
    pub new_level: u32,
    pub new_exp: u32,
    pub levels_gained: u32,
}

/// Adds `gain` exp and processes level-ups. Handles multi-level jumps; at the
/// level cap exp is zeroed.
pub fn add_experience(level: u32, exp: u32, gain: u32, config: &BalanceConfig) -> ExperienceGain {
    let per_level = config.progression.exp_per_level;
    let mut new_level = level.min(MAX_LEVEL);
    let mut new_exp = exp.saturating_add(gain);
    let mut levels_gained = 0;

    while new_exp >= per_level && new_level < MAX_LEVEL {
        new_exp -= per_level;
        new_level += 1;
        levels_gained += 1;
    }

    if new_level >= MAX_LEVEL {
        new_exp = 0;
    }

    ExperienceGain {
        new_level,
        new_exp,
        levels_gained,
    }
}

pub fn max_hp_for_level(level: u32, config: &BalanceConfig) -> u32 {
    config.progression.base_hp + level * config.progression.hp_per_level
}

pub fn max_mp_for_level(level: u32, config: &BalanceConfig) -> u32 {
    config.progression.base_mp + level * config.progression.mp_per_level
}

/// Random share of `max` within `[min_pct, max_pct]`, floored.
fn random_share(max: u32, min_pct: f64, max_pct: f64, rng: &mut impl Rng) -> u32 {
    let pct = rng.gen_range(min_pct..=max_pct);
    ((max as f64 * pct).floor() as u32).min(max)
}

/// Drains a random 0.5–2% of max, never below the fatigue floor. Values
/// already under the floor stay where they are.
pub fn fatigue_drain(current: u32, max: u32, rng: &mut impl Rng, config: &BalanceConfig) -> u32 {
    let p = &config.progression;
    let floor = (max as f64 * p.fatigue_floor).floor() as u32;
    if current <= floor {
        return current;
    }
    let drain = random_share(max, p.fatigue_drain_min, p.fatigue_drain_max, rng);
    current.saturating_sub(drain).max(floor)
}

/// Recomputes level-derived maxima after a level change: AP refills, HP/MP
/// land on a random 90–100% of the new max.
pub fn apply_level_up(character: &mut Character, rng: &mut impl Rng, config: &BalanceConfig) {
    let p = &config.progression;
    character.max_ap = max_ap(character.level, config);
    character.current_ap = character.max_ap;
    character.max_hp = max_hp_for_level(character.level, config);
    character.max_mp = max_mp_for_level(character.level, config);
    character.current_hp = random_share(
        character.max_hp,
        p.level_up_restore_min,
        p.level_up_restore_max,
        rng,
    );
    character.current_mp = random_share(
        character.max_mp,
        p.level_up_restore_min,
        p.level_up_restore_max,
        rng,
    );
}

/// Adventure fatigue for a progression tick without a level-up.
pub fn apply_fatigue(character: &mut Character, rng: &mut impl Rng, config: &BalanceConfig) {
    character.current_hp = fatigue_drain(character.current_hp, character.max_hp, rng, config);
    character.current_mp = fatigue_drain(character.current_mp, character.max_mp, rng, config);
}

/// Grants exp to the character, applying level-up restoration or fatigue.
pub fn grant_experience(
    character: &mut Character,
    gain: u32,
    rng: &mut impl Rng,
    config: &BalanceConfig,
) -> ExperienceGain {
    let result = add_experience(character.level, character.exp, gain, config);
    character.level = result.new_level;
    character.exp = result.new_exp;

    if result.levels_gained > 0 {
        apply_level_up(character, rng, config);
        info!(
            level = result.new_level,
            gained = result.levels_gained,
            "character leveled up"
        );
    } else {
        apply_fatigue(character, rng, config);
    }
    result
}
