//! Battle simulation using the real session functions, so results match
//! actual play.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::config::SimConfig;
use super::report::{BattleRecord, SimReport};
use crate::character::{Character, Gender};
use crate::combat::types::EnemyAction;
use crate::combat::{perform_action, start_combat, GenerationOptions, PlayerAction, TurnStatus};
use crate::core::constants::{HEAL_POTION_KEY, HEAL_POTION_NAME, MAX_LEVEL, MIN_LEVEL};
use crate::core::game_data::GameData;
use crate::core::game_state::GameState;
use crate::core::progression::apply_level_up;
use crate::error::GameResult;

const SIM_POTIONS: u32 = 3;

/// Run every battle and return the aggregated report.
pub fn run_simulation(config: &SimConfig, data: &GameData) -> GameResult<SimReport> {
    let location = match &config.region_id {
        Some(id) => data
            .region(id)?
            .locations
            .first()
            .map(|loc| loc.to_string())
            .unwrap_or_default(),
        None => String::new(),
    };

    let mut battles = Vec::with_capacity(config.num_runs as usize);
    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run_idx as u64)),
            None => StdRng::from_entropy(),
        };
        let record = simulate_battle(config, data, &location, &mut rng)?;

        if config.verbosity >= 2 {
            println!(
                "Battle {}/{} - {} Lv.{} ({}) {:?} in {} turns, {} AP used",
                run_idx + 1,
                config.num_runs,
                record.enemy_name,
                record.enemy_level,
                record.rank.label(),
                record.status,
                record.turns,
                record.ap_used
            );
        }
        battles.push(record);
    }

    Ok(SimReport::from_battles(battles))
}

/// A fresh character at the configured level with a few potions.
fn sim_character(config: &SimConfig, data: &GameData, rng: &mut impl Rng) -> GameResult<Character> {
    let mut character = Character::new(
        "模拟者".to_string(),
        config.class,
        Gender::Unspecified,
        &data.balance,
    );
    character.level = config.level.clamp(MIN_LEVEL, MAX_LEVEL);
    apply_level_up(&mut character, rng, &data.balance);
    let potions = data.items.create(HEAL_POTION_KEY, SIM_POTIONS)?;
    character.add_item(potions, data.balance.economy.stack_cap);
    Ok(character)
}

/// Simple policy: skip when stunned, heal when low, brace for strong
/// attacks, otherwise attack; retreat when nothing else is affordable.
pub fn choose_action(state: &GameState, data: &GameData, heal_threshold: f64) -> PlayerAction {
    let combat = &state.combat_state;
    let character = &state.character;
    let cfg = &data.balance.combat;

    if combat.is_player_stunned {
        return PlayerAction::StunnedTurn;
    }
    let low = (character.current_ap as f64) < character.max_ap as f64 * heal_threshold;
    if low && character.item_count(HEAL_POTION_NAME) > 0 {
        return PlayerAction::UseHealPotion;
    }
    if combat.enemy_next_action == EnemyAction::Strong && character.current_ap >= cfg.defend_ap_cost {
        return PlayerAction::Defend;
    }
    if character.current_ap >= cfg.attack_ap_cost {
        return PlayerAction::Attack;
    }
    PlayerAction::Retreat
}

fn simulate_battle(
    config: &SimConfig,
    data: &GameData,
    location: &str,
    rng: &mut impl Rng,
) -> GameResult<BattleRecord> {
    let mut state = GameState::new(sim_character(config, data, rng)?);
    state.current_location = location.to_string();
    start_combat(&mut state, data, GenerationOptions::default(), rng)?;

    let enemy = state
        .combat_state
        .current_enemy
        .clone()
        .ok_or(crate::error::CombatError::NotInCombat)?;

    let status = loop {
        let action = choose_action(&state, data, config.heal_threshold);
        let status = perform_action(&mut state, data, action, rng)?;
        if status != TurnStatus::Continue {
            break status;
        }
    };

    let result = state
        .combat_state
        .current_result
        .clone()
        .ok_or(crate::error::CombatError::NotInCombat)?;
    debug!(enemy = %enemy.name, ?status, turns = result.turns_used, "simulated battle");

    Ok(BattleRecord {
        enemy_name: enemy.name,
        enemy_level: enemy.level,
        rank: enemy.rank,
        is_treasure: enemy.is_treasure_monster,
        status,
        turns: result.turns_used,
        ap_used: result.player_stats.ap_used,
        damage_taken: result.player_stats.damage_taken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> SimConfig {
        SimConfig {
            num_runs: 50,
            seed: Some(42),
            level: 5,
            region_id: Some("greenvale".to_string()),
            verbosity: 0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_simulation_runs_every_battle() {
        let data = GameData::standard().unwrap();
        let report = run_simulation(&quick_config(), &data).unwrap();
        assert_eq!(report.total, 50);
        assert_eq!(
            report.victories + report.defeats + report.escapes + report.timeouts,
            50
        );
    }

    #[test]
    fn test_simulation_is_reproducible_with_seed() {
        let data = GameData::standard().unwrap();
        let a = run_simulation(&quick_config(), &data).unwrap();
        let b = run_simulation(&quick_config(), &data).unwrap();
        assert_eq!(a.victories, b.victories);
        assert_eq!(a.avg_turns, b.avg_turns);
    }

    #[test]
    fn test_seed_near_u64_max_wraps() {
        let data = GameData::standard().unwrap();
        let config = SimConfig {
            num_runs: 3,
            seed: Some(u64::MAX),
            ..quick_config()
        };
        let report = run_simulation(&config, &data).unwrap();
        assert_eq!(report.total, 3);
    }

    #[test]
    fn test_unknown_region_is_error() {
        let data = GameData::standard().unwrap();
        let config = SimConfig {
            region_id: Some("atlantis".to_string()),
            ..quick_config()
        };
        assert!(run_simulation(&config, &data).is_err());
    }

    #[test]
    fn test_policy_prefers_stunned_turn() {
        let data = GameData::standard().unwrap();
        let mut state = GameState::new(Character::new(
            "测".to_string(),
            crate::character::CharacterClass::Warrior,
            Gender::Unspecified,
            &data.balance,
        ));
        state.combat_state.is_player_stunned = true;
        assert_eq!(choose_action(&state, &data, 0.3), PlayerAction::StunnedTurn);
        state.combat_state.is_player_stunned = false;
        state.character.current_ap = 2;
        assert_eq!(choose_action(&state, &data, 0.3), PlayerAction::Retreat);
    }
}
