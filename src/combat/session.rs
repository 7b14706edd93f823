//! Encounter lifecycle on top of the turn engine: paying for encounters,
//! settling results, and summarizing an adventure session for the story.

use rand::Rng;
use tracing::info;

use super::generation::{generate_enemy, GenerationOptions};
use super::log_stats::{player_stats, turns_used};
use super::logic::{initialize_combat, resolve, PlayerAction, TurnStatus};
use super::types::{
    CombatLogType, CombatOutcome, CombatPhase, CombatResult, CombatState, EnemyRewards,
};
use crate::core::constants::{DEFEAT_FAILURE_REASON, RETREAT_FAILURE_REASON, TIMEOUT_FAILURE_REASON};
use crate::core::game_data::GameData;
use crate::core::game_state::GameState;
use crate::core::progression::grant_experience;
use crate::error::{CombatError, GameResult};
use crate::items::ItemRegistry;
use crate::narrative::Role;

/// Pays the encounter cost, generates an enemy for the current location and
/// enters combat.
///
/// Session results carry over from a previous encounter in the same
/// session; starting from a clean state begins a new session.
pub fn start_combat(
    state: &mut GameState,
    data: &GameData,
    options: GenerationOptions,
    rng: &mut impl Rng,
) -> GameResult<()> {
    if state.combat_state.is_in_combat() {
        return Err(CombatError::AlreadyInCombat.into());
    }
    let cost = data.balance.combat.encounter_ap_cost;
    if state.character.current_ap < cost {
        return Err(CombatError::InsufficientAp {
            needed: cost,
            available: state.character.current_ap,
        }
        .into());
    }

    let region = data.region_for_location(&state.current_location);
    let enemy = generate_enemy(
        state.character.level,
        region,
        &data.enemies,
        options,
        rng,
        &data.balance,
    )?;

    let session_results = match state.combat_state.phase {
        CombatPhase::NotInCombat => Vec::new(),
        _ => std::mem::take(&mut state.combat_state.session_results),
    };

    info!(
        enemy = %enemy.name,
        level = enemy.level,
        rank = enemy.rank.label(),
        treasure = enemy.is_treasure_monster,
        "encounter started"
    );

    state.character.set_ap(state.character.current_ap - cost);
    let mut combat = initialize_combat(enemy, rng, &data.balance);
    combat.session_results = session_results;
    combat.push_log(
        format!("进入战斗，消耗了 {} 点AP", cost),
        CombatLogType::System,
    );
    state.combat_state = combat;
    Ok(())
}

/// Runs one action and settles the battle if it ended.
pub fn perform_action(
    state: &mut GameState,
    data: &GameData,
    action: PlayerAction,
    rng: &mut impl Rng,
) -> GameResult<TurnStatus> {
    let resolution = resolve(&state.character, &state.combat_state, action, rng, &data.balance)?;
    state.character = resolution.character;
    state.combat_state = resolution.combat;

    if resolution.status.is_terminal() {
        end_combat(state, data, rng)?;
    }
    Ok(resolution.status)
}

/// Settles a finished battle into a `CombatResult` and moves to Settlement.
///
/// On victory the rewards are credited: gold (clamped), exp through the
/// progression system, and reward items. Unknown reward keys fail the
/// settlement before anything is credited.
pub fn end_combat(
    state: &mut GameState,
    data: &GameData,
    rng: &mut impl Rng,
) -> GameResult<CombatResult> {
    let combat = &state.combat_state;
    if !combat.phase.is_terminal() {
        return Err(match combat.phase {
            CombatPhase::InCombat => CombatError::StillInProgress,
            _ => CombatError::NotInCombat,
        }
        .into());
    }
    let enemy = combat
        .current_enemy
        .clone()
        .ok_or(CombatError::NotInCombat)?;

    let (outcome, failure_reason) = match combat.phase {
        CombatPhase::Victory => (CombatOutcome::Victory, None),
        CombatPhase::Defeat => (CombatOutcome::Defeat, Some(DEFEAT_FAILURE_REASON)),
        CombatPhase::Escaped => (CombatOutcome::Retreat, Some(RETREAT_FAILURE_REASON)),
        _ => (CombatOutcome::Retreat, Some(TIMEOUT_FAILURE_REASON)),
    };

    let mut rewards = EnemyRewards::default();
    if outcome == CombatOutcome::Victory {
        let items = enemy
            .rewards
            .items
            .iter()
            .map(|key| data.items.create(key, 1))
            .collect::<Result<Vec<_>, _>>()?;

        let cfg = &data.balance;
        rewards.gold = state.character.add_gold(enemy.rewards.gold, cfg.economy.max_gold);
        rewards.exp = enemy.rewards.exp;
        grant_experience(&mut state.character, enemy.rewards.exp, rng, cfg);
        for item in items {
            state.character.add_item(item, cfg.economy.stack_cap);
        }
        rewards.items = enemy.rewards.items.clone();
        state.refresh_stats_bonus(data);
    }

    let result = CombatResult {
        turns_used: turns_used(&state.combat_state.combat_logs),
        player_stats: player_stats(&state.combat_state.combat_logs),
        enemy,
        outcome,
        rewards,
        failure_reason: failure_reason.map(str::to_string),
    };

    info!(
        enemy = %result.enemy.name,
        outcome = ?result.outcome,
        turns = result.turns_used,
        gold = result.rewards.gold,
        exp = result.rewards.exp,
        "combat settled"
    );

    let combat = &mut state.combat_state;
    combat.current_result = Some(result.clone());
    combat.session_results.push(result.clone());
    combat.phase = CombatPhase::Settlement;
    state.autosave_pending = true;
    Ok(result)
}

/// Starts the next encounter from the settlement screen.
pub fn continue_encounter(
    state: &mut GameState,
    data: &GameData,
    options: GenerationOptions,
    rng: &mut impl Rng,
) -> GameResult<()> {
    if !state.combat_state.show_settlement() {
        return Err(CombatError::NotInCombat.into());
    }
    start_combat(state, data, options, rng)
}

/// Leaves combat for good. Appends a summary of the session's battles to
/// the story log (as player input for the next narrative turn) and resets
/// the combat state. Returns the summary, or `None` when no battle was
/// fought.
pub fn return_to_adventure(state: &mut GameState, data: &GameData) -> GameResult<Option<String>> {
    if state.combat_state.is_in_combat() {
        return Err(CombatError::AlreadyInCombat.into());
    }
    let summary = compose_session_summary(&state.combat_state.session_results, &data.items);
    if let Some(text) = &summary {
        state.push_story(Role::User, text.clone());
    }
    state.combat_state = CombatState::new();
    Ok(summary)
}

/// Multi-section battle report for the narrative generator.
pub fn compose_session_summary(results: &[CombatResult], items: &ItemRegistry) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    let by_outcome = |outcome: CombatOutcome| -> Vec<&CombatResult> {
        results.iter().filter(|r| r.outcome == outcome).collect()
    };
    let victories = by_outcome(CombatOutcome::Victory);
    let defeats = by_outcome(CombatOutcome::Defeat);
    let retreats = by_outcome(CombatOutcome::Retreat);

    let names = |group: &[&CombatResult]| -> String {
        group
            .iter()
            .map(|r| format!("{}（Lv.{}）", r.enemy.name, r.enemy.level))
            .collect::<Vec<_>>()
            .join("、")
    };

    let mut lines = vec![format!(
        "【战斗总结】本次冒险共进行了 {} 场战斗：胜利 {} 场，失败 {} 场，撤退 {} 场。",
        results.len(),
        victories.len(),
        defeats.len(),
        retreats.len()
    )];

    if !victories.is_empty() {
        let gold: u32 = victories.iter().map(|r| r.rewards.gold).sum();
        let exp: u32 = victories.iter().map(|r| r.rewards.exp).sum();
        lines.push(format!("【胜利】击败了：{}", names(&victories)));
        lines.push(format!("共获得 {} 金币、{} 点经验。", gold, exp));

        let mut stacked: Vec<(String, u32)> = Vec::new();
        for key in victories.iter().flat_map(|r| r.rewards.items.iter()) {
            let name = items
                .name_of(key)
                .map(str::to_string)
                .unwrap_or_else(|_| key.clone());
            match stacked.iter_mut().find(|(n, _)| *n == name) {
                Some((_, count)) => *count += 1,
                None => stacked.push((name, 1)),
            }
        }
        if !stacked.is_empty() {
            let list = stacked
                .iter()
                .map(|(name, count)| format!("{}×{}", name, count))
                .collect::<Vec<_>>()
                .join("、");
            lines.push(format!("获得物品：{}", list));
        }
    }

    let with_reasons = |group: &[&CombatResult], fallback: &str| -> String {
        group
            .iter()
            .map(|r| {
                format!(
                    "{}（Lv.{}，{}）",
                    r.enemy.name,
                    r.enemy.level,
                    r.failure_reason.as_deref().unwrap_or(fallback)
                )
            })
            .collect::<Vec<_>>()
            .join("、")
    };

    if !defeats.is_empty() {
        lines.push(format!(
            "【失败】败给了：{}",
            with_reasons(&defeats, DEFEAT_FAILURE_REASON)
        ));
    }

    if !retreats.is_empty() {
        lines.push(format!(
            "【撤退】未分胜负：{}",
            with_reasons(&retreats, RETREAT_FAILURE_REASON)
        ));
    }

    Some(lines.join("\n"))
}
