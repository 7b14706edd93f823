//! Region definitions.

use serde::{Deserialize, Serialize};

/// Scaling policy for enemies once the player outlevels a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionTier {
    /// Enemies stay weaker than the player.
    Low,
    Mid,
    High,
    /// Enemies skew stronger than the player.
    Endgame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Plains,
    Forest,
    Swamp,
    Mountain,
    Cave,
    Ruins,
    Desert,
    Volcano,
    Tundra,
    Abyss,
}

/// A world area with a level range and biome set.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: &'static str,
    pub name: &'static str,
    /// Location names that belong to this region.
    pub locations: &'static [&'static str],
    pub min_level: u32,
    pub max_level: u32,
    pub tier: RegionTier,
    pub biomes: &'static [Biome],
}

impl Region {
    pub fn has_biome(&self, biome: Biome) -> bool {
        self.biomes.contains(&biome)
    }

    /// True if the free-form location names this region or one of its places.
    pub fn matches_location(&self, location: &str) -> bool {
        location.contains(self.name) || self.locations.iter().any(|loc| location.contains(loc))
    }
}

/// Returns all regions, ordered by level range.
pub fn get_all_regions() -> Vec<Region> {
    vec![
        Region {
            id: "greenvale",
            name: "翠谷平原",
            locations: &["青石村", "翠谷"],
            min_level: 1,
            max_level: 5,
            tier: RegionTier::Low,
            biomes: &[Biome::Plains, Biome::Forest],
        },
        Region {
            id: "whisper_woods",
            name: "低语森林",
            locations: &["低语森林", "猎人小屋"],
            min_level: 4,
            max_level: 10,
            tier: RegionTier::Low,
            biomes: &[Biome::Forest, Biome::Swamp],
        },
        Region {
            id: "iron_peaks",
            name: "铁脊山脉",
            locations: &["铁脊山脉", "矮人矿坑"],
            min_level: 9,
            max_level: 18,
            tier: RegionTier::Mid,
            biomes: &[Biome::Mountain, Biome::Cave],
        },
        Region {
            id: "sunken_marsh",
            name: "沉没沼泽",
            locations: &["沉没沼泽", "古神殿"],
            min_level: 15,
            max_level: 25,
            tier: RegionTier::Mid,
            biomes: &[Biome::Swamp, Biome::Ruins],
        },
        Region {
            id: "ember_wastes",
            name: "余烬荒原",
            locations: &["余烬荒原", "熔火要塞"],
            min_level: 24,
            max_level: 40,
            tier: RegionTier::High,
            biomes: &[Biome::Desert, Biome::Volcano],
        },
        Region {
            id: "frost_reach",
            name: "霜境",
            locations: &["霜境", "冰封王座"],
            min_level: 35,
            max_level: 55,
            tier: RegionTier::High,
            biomes: &[Biome::Tundra, Biome::Mountain],
        },
        Region {
            id: "abyssal_rift",
            name: "深渊裂谷",
            locations: &["深渊裂谷", "虚空之门"],
            min_level: 50,
            max_level: 80,
            tier: RegionTier::Endgame,
            biomes: &[Biome::Abyss, Biome::Cave, Biome::Ruins],
        },
    ]
}

/// Gets a region by id.
pub fn get_region(id: &str) -> Option<Region> {
    get_all_regions().into_iter().find(|r| r.id == id)
}

/// Finds the region a free-form location string belongs to, by region name
/// or any of its location names appearing in it.
pub fn find_region_by_location(location: &str) -> Option<Region> {
    get_all_regions()
        .into_iter()
        .find(|r| r.matches_location(location))
}
