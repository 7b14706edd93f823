//! Battle statistics recovered from combat log text.
//!
//! The engine does not keep running totals; damage dealt, damage taken and
//! AP spent are parsed back out of the log phrases. This is brittle: any
//! change to the wording in `combat::logic` (or the encounter-cost line in
//! `combat::session`) must keep these patterns matching.

use regex::Regex;
use std::sync::OnceLock;

use super::types::{CombatLog, PlayerCombatStats};

const DAMAGE_DEALT_PATTERN: &str = r"造成了\s*(\d+)\s*点伤害";
const DAMAGE_TAKEN_PATTERN: &str = r"受到了\s*(\d+)\s*点AP伤害";
const AP_USED_PATTERN: &str = r"消耗了\s*(\d+)\s*点AP";

static DAMAGE_DEALT: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static DAMAGE_TAKEN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static AP_USED: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern)).as_ref().ok()
}

/// Sums every number captured by `regex` across all log lines.
fn sum_matches(logs: &[CombatLog], regex: Option<&Regex>) -> u32 {
    let Some(regex) = regex else {
        return 0;
    };
    logs.iter()
        .flat_map(|log| regex.captures_iter(&log.text))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .fold(0u32, |acc, n| acc.saturating_add(n))
}

/// Highest turn number seen in the log.
pub fn turns_used(logs: &[CombatLog]) -> u32 {
    logs.iter().map(|log| log.turn).max().unwrap_or(0)
}

pub fn player_stats(logs: &[CombatLog]) -> PlayerCombatStats {
    PlayerCombatStats {
        damage_dealt: sum_matches(logs, compiled(&DAMAGE_DEALT, DAMAGE_DEALT_PATTERN)),
        damage_taken: sum_matches(logs, compiled(&DAMAGE_TAKEN, DAMAGE_TAKEN_PATTERN)),
        ap_used: sum_matches(logs, compiled(&AP_USED, AP_USED_PATTERN)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::types::CombatLogType;

    fn log(turn: u32, text: &str) -> CombatLog {
        CombatLog {
            id: turn as u64,
            turn,
            text: text.to_string(),
            log_type: CombatLogType::System,
        }
    }

    #[test]
    fn test_patterns_compile() {
        assert!(compiled(&DAMAGE_DEALT, DAMAGE_DEALT_PATTERN).is_some());
        assert!(compiled(&DAMAGE_TAKEN, DAMAGE_TAKEN_PATTERN).is_some());
        assert!(compiled(&AP_USED, AP_USED_PATTERN).is_some());
    }

    #[test]
    fn test_stats_from_engine_phrases() {
        let logs = vec![
            log(1, "进入战斗，消耗了 10 点AP"),
            log(1, "你对 野狼 造成了 12 点伤害"),
            log(1, "你消耗了 5 点AP"),
            log(1, "野狼 发动了强力攻击！你受到了 16 点AP伤害"),
            log(2, "你摆出防御姿态，消耗了 3 点AP"),
            log(2, "野狼 发起攻击，你受到了 4 点AP伤害"),
            log(3, "你对 野狼 造成了 20 点伤害"),
            log(3, "野狼 被击败了！"),
        ];
        let stats = player_stats(&logs);
        assert_eq!(stats.damage_dealt, 32);
        assert_eq!(stats.damage_taken, 20);
        assert_eq!(stats.ap_used, 18);
        assert_eq!(turns_used(&logs), 3);
    }

    #[test]
    fn test_ap_damage_not_counted_as_dealt() {
        let logs = vec![log(1, "你受到了 9 点AP伤害")];
        assert_eq!(player_stats(&logs).damage_dealt, 0);
        assert_eq!(player_stats(&logs).damage_taken, 9);
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(turns_used(&[]), 0);
        assert_eq!(player_stats(&[]), PlayerCombatStats::default());
    }
}
