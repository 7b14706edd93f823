//! Turn resolution.
//!
//! Every action takes a snapshot of the character and combat state and
//! returns the next snapshot. A rejected action returns an error and leaves
//! the caller's state exactly as it was.

use rand::Rng;
use tracing::debug;

use super::types::{CombatLogType, CombatPhase, CombatState, Enemy, EnemyAction};
use crate::character::Character;
use crate::core::balance::BalanceConfig;
use crate::core::combat_math::{
    attack_power, calculate_ap_damage, calculate_damage_to_enemy, check_timeout, heal_amount,
    retreat_chance, roll_enemy_action, roll_retreat,
};
use crate::core::constants::{ARCANE_TONIC_NAME, FIRST_TURN, HEAL_POTION_NAME};
use crate::error::CombatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Attack,
    Defend,
    UseHealPotion,
    UseArcaneTonic,
    /// The only action allowed while stunned.
    StunnedTurn,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Continue,
    Victory,
    Defeat,
    Escaped,
    Timeout,
}

impl TurnStatus {
    pub fn is_terminal(&self) -> bool {
        *self != TurnStatus::Continue
    }
}

/// Next snapshot after one action.
#[derive(Debug, Clone)]
pub struct TurnResolution {
    pub character: Character,
    pub combat: CombatState,
    pub status: TurnStatus,
}

/// Fresh combat state for an encounter with `enemy`.
///
/// Session results are left empty; the session layer carries them over.
pub fn initialize_combat(enemy: Enemy, rng: &mut impl Rng, config: &BalanceConfig) -> CombatState {
    let max_turns = if enemy.is_treasure_monster {
        config.combat.treasure_max_turns
    } else {
        config.combat.max_turns
    };

    let mut state = CombatState {
        phase: CombatPhase::InCombat,
        current_turn: FIRST_TURN,
        max_turns,
        enemy_next_action: roll_enemy_action(rng, config),
        ..CombatState::default()
    };

    state.push_log(
        format!(
            "遭遇了 {}（Lv.{} {}级）！",
            enemy.name,
            enemy.level,
            enemy.rank.label()
        ),
        CombatLogType::System,
    );
    if enemy.is_treasure_monster {
        state.push_log(
            format!("{} 是宝藏怪物，{} 回合后就会逃走！", enemy.name, max_turns),
            CombatLogType::Warning,
        );
    }
    if state.enemy_next_action == EnemyAction::Strong {
        state.push_log(charging_warning(&enemy.name), CombatLogType::Warning);
    }

    state.current_enemy = Some(enemy);
    state
}

/// Resolves one player action.
pub fn resolve(
    character: &Character,
    combat: &CombatState,
    action: PlayerAction,
    rng: &mut impl Rng,
    config: &BalanceConfig,
) -> Result<TurnResolution, CombatError> {
    if !combat.is_in_combat() {
        return Err(CombatError::NotInCombat);
    }
    let enemy = combat
        .current_enemy
        .clone()
        .ok_or(CombatError::NotInCombat)?;

    match (action, combat.is_player_stunned) {
        (PlayerAction::StunnedTurn, false) => return Err(CombatError::NotStunned),
        (PlayerAction::StunnedTurn, true) => {}
        (_, true) => return Err(CombatError::PlayerStunned),
        _ => {}
    }

    let needed = match action {
        PlayerAction::Attack => config.combat.attack_ap_cost,
        PlayerAction::Defend => config.combat.defend_ap_cost,
        _ => 0,
    };
    if character.current_ap < needed {
        return Err(CombatError::InsufficientAp {
            needed,
            available: character.current_ap,
        });
    }

    let mut turn = Turn {
        regen_active: combat.ap_regen_buff_turns_remaining > 0,
        character: character.clone(),
        combat: combat.clone(),
        enemy,
        config,
    };

    let status = match action {
        PlayerAction::Attack => turn.attack(rng),
        PlayerAction::Defend => turn.defend(rng),
        PlayerAction::UseHealPotion => turn.use_heal_potion(rng)?,
        PlayerAction::UseArcaneTonic => turn.use_arcane_tonic(rng)?,
        PlayerAction::StunnedTurn => turn.stunned(rng),
        PlayerAction::Retreat => turn.retreat(rng),
    };

    debug!(
        ?action,
        ?status,
        turn = turn.combat.current_turn,
        ap = turn.character.current_ap,
        enemy_hp = turn.enemy.current_hp,
        "resolved combat action"
    );

    Ok(turn.finish(status))
}

fn charging_warning(enemy_name: &str) -> String {
    format!("{} 正在蓄力，准备发动强力攻击！", enemy_name)
}

/// Working copy of one resolution step.
struct Turn<'c> {
    character: Character,
    combat: CombatState,
    enemy: Enemy,
    /// Whether a regen buff was running before this action.
    regen_active: bool,
    config: &'c BalanceConfig,
}

impl Turn<'_> {
    fn log(&mut self, text: String, log_type: CombatLogType) {
        self.combat.push_log(text, log_type);
    }

    fn spend_ap(&mut self, amount: u32) -> u32 {
        let paid = amount.min(self.character.current_ap);
        self.character.set_ap(self.character.current_ap - paid);
        paid
    }

    fn restore_ap(&mut self, amount: u32) {
        self.character
            .set_ap(self.character.current_ap.saturating_add(amount));
    }

    fn attack(&mut self, rng: &mut impl Rng) -> TurnStatus {
        let power = attack_power(&self.character, self.config);
        let damage = calculate_damage_to_enemy(power, self.enemy.defense, rng, self.config);
        self.enemy.take_damage(damage);
        self.log(
            format!("你对 {} 造成了 {} 点伤害", self.enemy.name, damage),
            CombatLogType::Damage,
        );

        if !self.enemy.is_alive() {
            self.log(
                format!("{} 被击败了！", self.enemy.name),
                CombatLogType::Victory,
            );
            self.combat.phase = CombatPhase::Victory;
            return TurnStatus::Victory;
        }

        let paid = self.spend_ap(self.config.combat.attack_ap_cost);
        self.log(format!("你消耗了 {} 点AP", paid), CombatLogType::Action);

        let strong = self.combat.enemy_next_action == EnemyAction::Strong;
        self.enemy_attacks(strong, false);
        if self.check_defeat() {
            return TurnStatus::Defeat;
        }
        self.end_turn(strong, false, rng)
    }

    fn defend(&mut self, rng: &mut impl Rng) -> TurnStatus {
        let paid = self.spend_ap(self.config.combat.defend_ap_cost);
        self.log(
            format!("你摆出防御姿态，消耗了 {} 点AP", paid),
            CombatLogType::Action,
        );

        let strong = self.combat.enemy_next_action == EnemyAction::Strong;
        self.enemy_attacks(strong, true);
        if self.check_defeat() {
            return TurnStatus::Defeat;
        }
        self.end_turn(false, false, rng)
    }

    fn use_heal_potion(&mut self, rng: &mut impl Rng) -> Result<TurnStatus, CombatError> {
        self.character.consume_one(HEAL_POTION_NAME)?;
        let amount = heal_amount(
            self.character.current_ap,
            self.character.max_ap,
            self.config.combat.heal_potion_percent,
        );
        self.restore_ap(amount);
        self.log(
            format!("你使用了{}，恢复了 {} 点AP", HEAL_POTION_NAME, amount),
            CombatLogType::Action,
        );
        Ok(self.after_item(true, rng))
    }

    fn use_arcane_tonic(&mut self, rng: &mut impl Rng) -> Result<TurnStatus, CombatError> {
        self.character.consume_one(ARCANE_TONIC_NAME)?;
        let amount = self.character.missing_ap();
        self.restore_ap(amount);
        self.log(
            format!("你使用了{}，AP完全恢复（+{}）", ARCANE_TONIC_NAME, amount),
            CombatLogType::Action,
        );
        Ok(self.after_item(false, rng))
    }

    /// Enemy attack after an item. Uses the action decided on the previous
    /// step; it is not re-rolled here.
    fn after_item(&mut self, arm_regen: bool, rng: &mut impl Rng) -> TurnStatus {
        let strong = self.combat.enemy_next_action == EnemyAction::Strong;
        self.enemy_attacks(strong, false);
        if self.check_defeat() {
            return TurnStatus::Defeat;
        }
        self.end_turn(strong, arm_regen, rng)
    }

    fn stunned(&mut self, rng: &mut impl Rng) -> TurnStatus {
        self.log(
            "你被击晕了，无法行动。".to_string(),
            CombatLogType::Warning,
        );
        self.enemy_attacks(false, false);
        if self.check_defeat() {
            return TurnStatus::Defeat;
        }
        self.end_turn(false, false, rng)
    }

    fn retreat(&mut self, rng: &mut impl Rng) -> TurnStatus {
        let chance = retreat_chance(&self.character, self.config);
        if roll_retreat(chance, rng) {
            let paid = self.spend_ap(self.config.combat.retreat_ap_penalty);
            self.log(
                format!("你成功撤退了，消耗了 {} 点AP", paid),
                CombatLogType::System,
            );
            self.combat.phase = CombatPhase::Escaped;
            return TurnStatus::Escaped;
        }

        self.log(
            format!("撤退失败！{} 趁机发起攻击", self.enemy.name),
            CombatLogType::Warning,
        );
        self.enemy_attacks(false, false);
        if self.check_defeat() {
            return TurnStatus::Defeat;
        }
        self.end_turn(false, false, rng)
    }

    fn enemy_attacks(&mut self, strong: bool, defending: bool) {
        let damage = calculate_ap_damage(self.enemy.attack, strong, defending, self.config);
        self.character
            .set_ap(self.character.current_ap.saturating_sub(damage));
        let text = if strong {
            format!(
                "{} 发动了强力攻击！你受到了 {} 点AP伤害",
                self.enemy.name, damage
            )
        } else {
            format!("{} 发起攻击，你受到了 {} 点AP伤害", self.enemy.name, damage)
        };
        self.log(text, CombatLogType::Damage);
    }

    fn check_defeat(&mut self) -> bool {
        if self.character.current_ap > 0 {
            return false;
        }
        self.log(
            "你的AP耗尽，战斗失败……".to_string(),
            CombatLogType::Defeat,
        );
        self.combat.phase = CombatPhase::Defeat;
        true
    }

    /// Shared tail of every non-terminal step: regen tick, turn advance,
    /// timeout check, next enemy action roll, stun.
    fn end_turn(&mut self, stun: bool, arm_regen: bool, rng: &mut impl Rng) -> TurnStatus {
        if self.regen_active && self.combat.ap_regen_buff_turns_remaining > 0 {
            let amount = heal_amount(
                self.character.current_ap,
                self.character.max_ap,
                self.config.combat.heal_potion_percent,
            );
            self.restore_ap(amount);
            self.combat.ap_regen_buff_turns_remaining -= 1;
            self.log(
                format!("持续恢复生效，恢复了 {} 点AP", amount),
                CombatLogType::Action,
            );
        }
        if arm_regen {
            self.combat.ap_regen_buff_turns_remaining =
                self.config.combat.heal_potion_turns.saturating_sub(1);
        }

        let next_turn = self.combat.current_turn + 1;
        if check_timeout(next_turn, self.combat.max_turns) {
            self.log(
                format!("回合数耗尽，{} 逃走了。", self.enemy.name),
                CombatLogType::Warning,
            );
            self.combat.current_turn = next_turn;
            self.combat.phase = CombatPhase::Timeout;
            return TurnStatus::Timeout;
        }
        self.combat.current_turn = next_turn;

        self.combat.enemy_next_action = roll_enemy_action(rng, self.config);
        self.combat.is_player_stunned = stun;
        if stun {
            self.log(
                "你被强力攻击击晕了，下回合无法行动！".to_string(),
                CombatLogType::Warning,
            );
        }
        if self.combat.enemy_next_action == EnemyAction::Strong {
            self.log(charging_warning(&self.enemy.name), CombatLogType::Warning);
        }
        TurnStatus::Continue
    }

    fn finish(mut self, status: TurnStatus) -> TurnResolution {
        self.combat.current_enemy = Some(self.enemy);
        TurnResolution {
            character: self.character,
            combat: self.combat,
            status,
        }
    }
}
