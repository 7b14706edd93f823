//! Simulation report generation.

use std::collections::BTreeMap;

use crate::combat::types::EnemyRank;
use crate::combat::TurnStatus;

/// One simulated battle.
#[derive(Debug, Clone)]
pub struct BattleRecord {
    pub enemy_name: String,
    pub enemy_level: u32,
    pub rank: EnemyRank,
    pub is_treasure: bool,
    pub status: TurnStatus,
    pub turns: u32,
    pub ap_used: u32,
    pub damage_taken: u32,
}

/// Per-rank win tally: (battles, victories).
pub type RankTally = BTreeMap<EnemyRank, (u32, u32)>;

/// Aggregated results from a batch of battles.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub total: u32,
    pub victories: u32,
    pub defeats: u32,
    pub escapes: u32,
    pub timeouts: u32,
    pub treasure_encounters: u32,

    pub avg_turns: f64,
    pub avg_ap_used: f64,
    pub avg_damage_taken: f64,
    pub avg_enemy_level: f64,

    pub by_rank: RankTally,
}

impl SimReport {
    pub fn from_battles(battles: Vec<BattleRecord>) -> Self {
        let total = battles.len() as u32;
        let count = |status: TurnStatus| battles.iter().filter(|b| b.status == status).count() as u32;
        let avg = |f: fn(&BattleRecord) -> u32| {
            battles.iter().map(|b| f(b) as f64).sum::<f64>() / total.max(1) as f64
        };

        let mut by_rank = RankTally::new();
        for battle in battles.iter().filter(|b| !b.is_treasure) {
            let entry = by_rank.entry(battle.rank).or_insert((0, 0));
            entry.0 += 1;
            if battle.status == TurnStatus::Victory {
                entry.1 += 1;
            }
        }

        Self {
            total,
            victories: count(TurnStatus::Victory),
            defeats: count(TurnStatus::Defeat),
            escapes: count(TurnStatus::Escaped),
            timeouts: count(TurnStatus::Timeout),
            treasure_encounters: battles.iter().filter(|b| b.is_treasure).count() as u32,
            avg_turns: avg(|b| b.turns),
            avg_ap_used: avg(|b| b.ap_used),
            avg_damage_taken: avg(|b| b.damage_taken),
            avg_enemy_level: avg(|b| b.enemy_level),
            by_rank,
        }
    }

    fn rate(&self, n: u32) -> f64 {
        n as f64 / self.total.max(1) as f64 * 100.0
    }

    /// Human-readable summary.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══ RESULTS ═══\n");
        out.push_str(&format!("  Battles:        {}\n", self.total));
        out.push_str(&format!(
            "  Victory:        {} ({:.1}%)\n",
            self.victories,
            self.rate(self.victories)
        ));
        out.push_str(&format!(
            "  Defeat:         {} ({:.1}%)\n",
            self.defeats,
            self.rate(self.defeats)
        ));
        out.push_str(&format!(
            "  Retreat:        {} ({:.1}%)\n",
            self.escapes,
            self.rate(self.escapes)
        ));
        out.push_str(&format!(
            "  Timeout:        {} ({:.1}%)\n",
            self.timeouts,
            self.rate(self.timeouts)
        ));
        out.push_str(&format!("  Treasure:       {}\n", self.treasure_encounters));
        out.push('\n');
        out.push_str(&format!("  Avg turns:      {:.2}\n", self.avg_turns));
        out.push_str(&format!("  Avg AP used:    {:.2}\n", self.avg_ap_used));
        out.push_str(&format!("  Avg AP damage:  {:.2}\n", self.avg_damage_taken));
        out.push_str(&format!("  Avg enemy lvl:  {:.2}\n", self.avg_enemy_level));
        out.push('\n');
        out.push_str("═══ WIN RATE BY RANK ═══\n");
        for (rank, (battles, wins)) in &self.by_rank {
            let pct = *wins as f64 / (*battles).max(1) as f64 * 100.0;
            out.push_str(&format!(
                "  {}: {:>5} battles, {:>5.1}% won\n",
                rank.label(),
                battles,
                pct
            ));
        }
        out
    }
}
