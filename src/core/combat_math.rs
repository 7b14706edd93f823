//! Combat math shared by the engine, the session layer and the simulator.
//!
//! Everything here is a pure function of its inputs. Functions that need
//! randomness take the RNG as a parameter so tests can seed it.

use rand::Rng;

use super::balance::BalanceConfig;
use crate::character::attributes::{AttributeType, Attributes};
use crate::character::Character;
use crate::combat::types::EnemyAction;

/// Base stats plus equipment/relic bonuses, componentwise and unclamped.
pub fn total_stats(character: &Character) -> Attributes {
    character.base_stats.plus(&character.stats_bonus)
}

/// Weighted stat sum plus a level term, floored. Never negative.
pub fn attack_power(character: &Character, config: &BalanceConfig) -> u32 {
    let total = total_stats(character);
    let w = &config.combat.stat_weights;
    let weighted = total.get(AttributeType::Strength) as f64 * w.str
        + total.get(AttributeType::Dexterity) as f64 * w.dex
        + total.get(AttributeType::Intelligence) as f64 * w.int
        + total.get(AttributeType::Charisma) as f64 * w.cha
        + total.get(AttributeType::Luck) as f64 * w.luck;
    let power = weighted + character.level as f64 * config.combat.level_multiplier;
    power.floor().max(0.0) as u32
}

/// Max AP for a level. Monotonic non-decreasing.
pub fn max_ap(level: u32, config: &BalanceConfig) -> u32 {
    config.ap.base_max_ap + level.saturating_sub(1) * config.ap.ap_per_level
}

/// Chance in [0, 1] that a retreat attempt succeeds.
pub fn retreat_chance(character: &Character, config: &BalanceConfig) -> f64 {
    let total = total_stats(character);
    let sum = total.get(AttributeType::Dexterity) + total.get(AttributeType::Luck);
    (sum as f64 / config.combat.retreat_divisor).clamp(0.0, 1.0)
}

/// AP after one dialogue exchange.
pub fn dialogue_recovery(current_ap: u32, max_ap: u32, config: &BalanceConfig) -> u32 {
    current_ap.saturating_add(config.ap.dialogue_recovery).min(max_ap)
}

/// AP restored by food of the given price: `floor(max × percent + flat)`,
/// at least 1. The caller caps the result at max AP.
pub fn food_recovery_amount(price: u32, max_ap: u32, config: &BalanceConfig) -> u32 {
    let band = config
        .ap
        .food_bands
        .iter()
        .find(|band| band.max_price.map_or(true, |limit| price < limit));
    let Some(band) = band else {
        return 1;
    };
    let amount = (max_ap as f64 * band.percent + band.flat as f64).floor() as u32;
    amount.max(1)
}

/// AP after eating food of the given price.
pub fn apply_food_recovery(current_ap: u32, max_ap: u32, price: u32, config: &BalanceConfig) -> u32 {
    current_ap
        .saturating_add(food_recovery_amount(price, max_ap, config))
        .min(max_ap)
}

/// Damage dealt to an enemy: `max(1, attack - defense)` scaled by a uniform
/// roll in `[1 - variance, 1 + variance]`, floored, at least 1.
pub fn calculate_damage_to_enemy(
    attack_power: u32,
    enemy_defense: u32,
    rng: &mut impl Rng,
    config: &BalanceConfig,
) -> u32 {
    let base = attack_power.saturating_sub(enemy_defense).max(1);
    let variance = config.combat.damage_variance;
    let roll = rng.gen_range((1.0 - variance)..=(1.0 + variance));
    ((base as f64 * roll).floor() as u32).max(1)
}

/// AP damage from one enemy attack. The strong multiplier applies first,
/// then the defend reduction. Floored, at least 1.
pub fn calculate_ap_damage(
    enemy_attack: u32,
    is_strong: bool,
    is_defending: bool,
    config: &BalanceConfig,
) -> u32 {
    let mut damage = enemy_attack as f64;
    if is_strong {
        damage *= config.combat.strong_attack_multiplier;
    }
    if is_defending {
        damage *= config.combat.defend_reduction;
    }
    (damage.floor() as u32).max(1)
}

/// True once the turn counter has passed the limit.
pub fn check_timeout(current_turn: u32, max_turns: u32) -> bool {
    current_turn > max_turns
}

/// Decides what the enemy will do on the next resolution step.
pub fn roll_enemy_action(rng: &mut impl Rng, config: &BalanceConfig) -> EnemyAction {
    if rng.gen_bool(config.combat.strong_attack_chance) {
        EnemyAction::Strong
    } else {
        EnemyAction::Normal
    }
}

/// Bernoulli trial on the retreat chance.
pub fn roll_retreat(chance: f64, rng: &mut impl Rng) -> bool {
    rng.gen_bool(chance.clamp(0.0, 1.0))
}

/// `min(floor(max_ap × percent), missing)`: the heal potion's instant amount
/// and its per-turn regen amount.
pub fn heal_amount(current_ap: u32, max_ap: u32, percent: f64) -> u32 {
    let amount = (max_ap as f64 * percent).floor() as u32;
    amount.min(max_ap.saturating_sub(current_ap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterClass, Gender};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn character_with(stats: Attributes, level: u32) -> Character {
        let config = BalanceConfig::default();
        let mut c = Character::new(
            "测试".to_string(),
            CharacterClass::Rogue,
            Gender::Female,
            &config,
        );
        c.base_stats = stats;
        c.level = level;
        c
    }

    #[test]
    fn test_total_stats_includes_negative_bonus() {
        let mut c = character_with(Attributes::new(10, 10, 10, 10, 10), 1);
        c.stats_bonus = Attributes::new(0, 0, 0, -15, 0);
        assert_eq!(total_stats(&c).get(AttributeType::Charisma), -5);
    }

    #[test]
    fn test_attack_power_weights() {
        let config = BalanceConfig::default();
        // 10*1.5 + 10 + 10 + 10*0.5 + 10*0.8 + 1*2 = 50
        let c = character_with(Attributes::new(10, 10, 10, 10, 10), 1);
        assert_eq!(attack_power(&c, &config), 50);
        // STR weighs more than CHA
        let strong = character_with(Attributes::new(20, 10, 10, 10, 10), 1);
        let charming = character_with(Attributes::new(10, 10, 10, 20, 10), 1);
        assert!(attack_power(&strong, &config) > attack_power(&charming, &config));
    }

    #[test]
    fn test_attack_power_floors_and_never_negative() {
        let config = BalanceConfig::default();
        // 1*0.8 + 1*2 = 2.8 -> 2
        let c = character_with(Attributes::new(0, 0, 0, 0, 1), 1);
        assert_eq!(attack_power(&c, &config), 2);
        let cursed = character_with(Attributes::new(-50, 0, 0, 0, 0), 1);
        assert_eq!(attack_power(&cursed, &config), 0);
    }

    #[test]
    fn test_max_ap_formula() {
        let config = BalanceConfig::default();
        assert_eq!(max_ap(1, &config), 100);
        assert_eq!(max_ap(2, &config), 105);
        assert_eq!(max_ap(99, &config), 100 + 98 * 5);
    }

    #[test]
    fn test_retreat_chance_clamps() {
        let config = BalanceConfig::default();
        let nimble = character_with(Attributes::new(0, 100, 0, 0, 100), 1);
        assert_eq!(retreat_chance(&nimble, &config), 1.0);
        let clumsy = character_with(Attributes::new(0, -10, 0, 0, -10), 1);
        assert_eq!(retreat_chance(&clumsy, &config), 0.0);
        let average = character_with(Attributes::new(0, 30, 0, 0, 20), 1);
        assert!((retreat_chance(&average, &config) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_dialogue_recovery_caps() {
        let config = BalanceConfig::default();
        assert_eq!(dialogue_recovery(50, 100, &config), 55);
        assert_eq!(dialogue_recovery(98, 100, &config), 100);
    }

    #[test]
    fn test_food_recovery_bands() {
        let config = BalanceConfig::default();
        assert_eq!(food_recovery_amount(10, 100, &config), 12); // 10% + 2
        assert_eq!(food_recovery_amount(20, 100, &config), 25); // 20% + 5
        assert_eq!(food_recovery_amount(99, 100, &config), 45); // 35% + 10
        assert_eq!(food_recovery_amount(500, 100, &config), 80); // 60% + 20
        assert_eq!(apply_food_recovery(90, 100, 500, &config), 100);
    }

    #[test]
    fn test_food_recovery_minimum_one() {
        let mut config = BalanceConfig::default();
        config.ap.food_bands[0].percent = 0.0;
        config.ap.food_bands[0].flat = 0;
        assert_eq!(food_recovery_amount(1, 100, &config), 1);
    }

    #[test]
    fn test_damage_to_enemy_minimum_one() {
        let config = BalanceConfig::default();
        let mut rng = create_test_rng();
        for _ in 0..100 {
            assert!(calculate_damage_to_enemy(5, 50, &mut rng, &config) >= 1);
        }
    }

    #[test]
    fn test_ap_damage_strong_then_defend() {
        let config = BalanceConfig::default();
        assert_eq!(calculate_ap_damage(50, false, false, &config), 50);
        assert_eq!(calculate_ap_damage(50, true, false, &config), 100);
        assert_eq!(calculate_ap_damage(50, false, true, &config), 25);
        assert_eq!(calculate_ap_damage(51, true, true, &config), 51);
        assert_eq!(calculate_ap_damage(1, false, true, &config), 1);
        assert_eq!(calculate_ap_damage(0, false, false, &config), 1);
    }

    #[test]
    fn test_check_timeout_is_strict() {
        assert!(!check_timeout(20, 20));
        assert!(check_timeout(21, 20));
        assert!(!check_timeout(1, 20));
    }

    #[test]
    fn test_strong_attack_rate_within_bounds() {
        let config = BalanceConfig::default();
        let mut rng = create_test_rng();
        let trials = 10_000;
        let strong = (0..trials)
            .filter(|_| roll_enemy_action(&mut rng, &config) == EnemyAction::Strong)
            .count();
        let rate = strong as f64 / trials as f64;
        assert!((0.22..=0.28).contains(&rate), "strong rate was {}", rate);
    }

    #[test]
    fn test_roll_retreat_extremes() {
        let mut rng = create_test_rng();
        for _ in 0..100 {
            assert!(roll_retreat(1.0, &mut rng));
            assert!(!roll_retreat(0.0, &mut rng));
        }
    }

    #[test]
    fn test_heal_amount_limited_by_missing() {
        assert_eq!(heal_amount(50, 100, 0.2), 20);
        assert_eq!(heal_amount(90, 100, 0.2), 10);
        assert_eq!(heal_amount(100, 100, 0.2), 0);
    }
}
