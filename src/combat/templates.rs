//! Enemy template data.

use super::types::EnemyRank;
use crate::zones::Biome;

/// Base numbers for a regular enemy before level and rank scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub rank: EnemyRank,
    pub base_hp: u32,
    pub base_attack: u32,
    pub base_defense: u32,
    pub family: &'static str,
    pub element: &'static str,
    pub biomes: &'static [Biome],
    /// Item registry keys granted on victory.
    pub reward_items: &'static [&'static str],
}

/// A treasure monster: fragile, quick to flee, rich.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasureTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub gold: u32,
    pub element: &'static str,
}

#[derive(Debug, Clone)]
pub struct EnemyTemplates {
    pub normal: Vec<EnemyTemplate>,
    pub treasure: Vec<TreasureTemplate>,
}

impl EnemyTemplates {
    pub fn standard() -> Self {
        Self {
            normal: standard_enemies(),
            treasure: standard_treasure(),
        }
    }

    pub fn by_rank(&self, rank: EnemyRank) -> impl Iterator<Item = &EnemyTemplate> {
        self.normal.iter().filter(move |t| t.rank == rank)
    }

    /// Every item key any template can grant.
    pub fn reward_item_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.normal.iter().flat_map(|t| t.reward_items.iter().copied())
    }
}

#[allow(clippy::too_many_arguments)]
const fn enemy(
    key: &'static str,
    name: &'static str,
    rank: EnemyRank,
    base_hp: u32,
    base_attack: u32,
    base_defense: u32,
    family: &'static str,
    element: &'static str,
    biomes: &'static [Biome],
    reward_items: &'static [&'static str],
) -> EnemyTemplate {
    EnemyTemplate {
        key,
        name,
        rank,
        base_hp,
        base_attack,
        base_defense,
        family,
        element,
        biomes,
        reward_items,
    }
}

fn standard_enemies() -> Vec<EnemyTemplate> {
    use Biome::*;
    use EnemyRank::*;

    vec![
        // Rank D
        enemy("slime", "史莱姆", D, 30, 6, 1, "slime", "water", &[Plains, Forest, Swamp], &["slime_gel"]),
        enemy("wolf", "野狼", D, 36, 8, 2, "beast", "none", &[Plains, Forest], &["wolf_pelt"]),
        enemy("cave_bat", "洞穴蝙蝠", D, 24, 7, 1, "beast", "dark", &[Cave, Mountain], &[]),
        enemy("marsh_toad", "沼泽蟾蜍", D, 32, 6, 2, "beast", "poison", &[Swamp], &["venom_sac"]),
        enemy("skeleton", "骷髅兵", D, 34, 8, 3, "undead", "dark", &[Ruins, Cave], &["bone_shard"]),
        // Rank C
        enemy("goblin_raider", "哥布林劫掠者", C, 48, 10, 3, "goblinoid", "none", &[Forest, Mountain, Plains], &[]),
        enemy("giant_spider", "巨型蜘蛛", C, 52, 11, 3, "insect", "poison", &[Forest, Cave], &["venom_sac"]),
        enemy("gargoyle", "石像鬼", C, 58, 10, 6, "construct", "earth", &[Ruins, Mountain], &[]),
        enemy("sand_scorpion", "沙漠蝎", C, 50, 12, 4, "insect", "poison", &[Desert], &["venom_sac"]),
        enemy("frost_wolf", "霜狼", C, 54, 11, 4, "beast", "ice", &[Tundra], &["wolf_pelt", "frost_crystal"]),
        // Rank B
        enemy("orc_warlord", "兽人督军", B, 80, 14, 6, "goblinoid", "none", &[Mountain, Plains], &[]),
        enemy("fire_elemental", "火焰元素", B, 70, 16, 5, "elemental", "fire", &[Volcano, Desert], &["ember_core"]),
        enemy("necromancer", "亡灵法师", B, 65, 17, 4, "undead", "dark", &[Ruins, Swamp], &["bone_shard"]),
        enemy("frost_giant", "冰霜巨人", B, 95, 15, 7, "giant", "ice", &[Tundra, Mountain], &["frost_crystal"]),
        enemy("shadow_stalker", "暗影潜行者", B, 68, 18, 4, "demon", "dark", &[Abyss, Forest], &["shadow_silk"]),
        // Rank A
        enemy("young_fire_drake", "幼年火龙", A, 120, 20, 9, "dragon", "fire", &[Volcano, Mountain], &["dragon_scale", "ember_core"]),
        enemy("abyssal_golem", "深渊魔像", A, 140, 18, 12, "construct", "dark", &[Abyss, Cave], &["shadow_silk"]),
        enemy("marsh_hydra", "沼泽九头蛇", A, 130, 21, 8, "dragon", "poison", &[Swamp, Ruins], &["venom_sac", "dragon_scale"]),
    ]
}

fn standard_treasure() -> Vec<TreasureTemplate> {
    vec![
        TreasureTemplate {
            key: "gold_slime",
            name: "金币史莱姆",
            hp: 12,
            attack: 3,
            defense: 0,
            gold: 150,
            element: "light",
        },
        TreasureTemplate {
            key: "mimic",
            name: "宝箱怪",
            hp: 18,
            attack: 5,
            defense: 2,
            gold: 200,
            element: "none",
        },
        TreasureTemplate {
            key: "lucky_rabbit",
            name: "幸运兔",
            hp: 10,
            attack: 2,
            defense: 1,
            gold: 120,
            element: "light",
        },
    ]
}
