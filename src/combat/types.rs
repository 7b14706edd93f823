use serde::{Deserialize, Serialize};

use crate::zones::Biome;

/// Enemy tier, weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyRank {
    D,
    C,
    B,
    A,
}

impl EnemyRank {
    pub fn all() -> [EnemyRank; 4] {
        [EnemyRank::D, EnemyRank::C, EnemyRank::B, EnemyRank::A]
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnemyRank::D => "D",
            EnemyRank::C => "C",
            EnemyRank::B => "B",
            EnemyRank::A => "A",
        }
    }
}

/// What the enemy will do on its next attack. Decided one step ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyAction {
    #[default]
    Normal,
    Strong,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyRewards {
    pub gold: u32,
    pub exp: u32,
    /// Item registry keys.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub rank: EnemyRank,
    pub current_hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub is_treasure_monster: bool,
    pub rewards: EnemyRewards,
    /// Flavor tags, no gameplay effect.
    pub family: String,
    pub element: String,
    pub biomes: Vec<Biome>,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatLogType {
    System,
    Action,
    Damage,
    Warning,
    Victory,
    Defeat,
}

/// One line of combat log. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    pub id: u64,
    pub turn: u32,
    pub text: String,
    pub log_type: CombatLogType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Retreat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCombatStats {
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub ap_used: u32,
}

/// Settled record of one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub enemy: Enemy,
    pub outcome: CombatOutcome,
    pub turns_used: u32,
    /// What the player actually received; empty unless victorious.
    pub rewards: EnemyRewards,
    pub player_stats: PlayerCombatStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombatPhase {
    #[default]
    NotInCombat,
    InCombat,
    Victory,
    Defeat,
    Escaped,
    Timeout,
    Settlement,
}

impl CombatPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CombatPhase::Victory | CombatPhase::Defeat | CombatPhase::Escaped | CombatPhase::Timeout
        )
    }
}

/// Combat state for the current encounter plus the results accumulated
/// over the current adventure session.
///
/// Never persisted; only `session_results` survives the end of a battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub phase: CombatPhase,
    pub current_enemy: Option<Enemy>,
    pub combat_logs: Vec<CombatLog>,
    pub current_turn: u32,
    pub max_turns: u32,
    pub is_player_stunned: bool,
    pub enemy_next_action: EnemyAction,
    pub ap_regen_buff_turns_remaining: u32,
    pub current_result: Option<CombatResult>,
    pub session_results: Vec<CombatResult>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_combat(&self) -> bool {
        self.phase == CombatPhase::InCombat
    }

    pub fn show_settlement(&self) -> bool {
        self.phase == CombatPhase::Settlement
    }

    /// Appends a log line tagged with the current turn.
    pub fn push_log(&mut self, text: String, log_type: CombatLogType) {
        let id = self.combat_logs.last().map_or(1, |log| log.id + 1);
        self.combat_logs.push(CombatLog {
            id,
            turn: self.current_turn,
            text,
            log_type,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_enemy() -> Enemy {
        Enemy {
            id: "e-1".to_string(),
            name: "史莱姆".to_string(),
            level: 1,
            rank: EnemyRank::D,
            current_hp: 30,
            max_hp: 30,
            attack: 5,
            defense: 1,
            is_treasure_monster: false,
            rewards: EnemyRewards::default(),
            family: "slime".to_string(),
            element: "water".to_string(),
            biomes: vec![Biome::Plains],
        }
    }

    #[test]
    fn test_enemy_take_damage_no_underflow() {
        let mut enemy = sample_enemy();
        enemy.take_damage(10);
        assert_eq!(enemy.current_hp, 20);
        assert!(enemy.is_alive());
        enemy.take_damage(100);
        assert_eq!(enemy.current_hp, 0);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn test_rank_ordering() {
        assert!(EnemyRank::D < EnemyRank::C);
        assert!(EnemyRank::B < EnemyRank::A);
    }

    #[test]
    fn test_push_log_assigns_sequential_ids() {
        let mut state = CombatState::new();
        state.current_turn = 3;
        state.push_log("a".to_string(), CombatLogType::System);
        state.push_log("b".to_string(), CombatLogType::Action);
        assert_eq!(state.combat_logs[0].id, 1);
        assert_eq!(state.combat_logs[1].id, 2);
        assert_eq!(state.combat_logs[1].turn, 3);
    }

    #[test]
    fn test_phase_helpers() {
        let mut state = CombatState::new();
        assert!(!state.is_in_combat());
        state.phase = CombatPhase::InCombat;
        assert!(state.is_in_combat());
        state.phase = CombatPhase::Settlement;
        assert!(state.show_settlement());
        assert!(CombatPhase::Timeout.is_terminal());
        assert!(!CombatPhase::Settlement.is_terminal());
    }
}
