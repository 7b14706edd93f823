//! Static item and relic definitions.
//!
//! Enemy reward keys and treasure drop pools refer to items by key, so every
//! key used elsewhere must resolve here. `GameData::validate()` checks that.

use uuid::Uuid;

use super::types::{Item, ItemType, Rarity};
use crate::character::attributes::Attributes;
use crate::error::DataError;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub icon: &'static str,
    pub stat_bonus: Option<Attributes>,
}

impl ItemTemplate {
    /// Creates a fresh item instance. Quantity only applies to consumables.
    pub fn instantiate(&self, quantity: u32) -> Item {
        Item {
            id: Uuid::new_v4().to_string(),
            key: self.key.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            item_type: self.item_type,
            rarity: self.rarity,
            icon: self.icon.to_string(),
            quantity: (self.item_type == ItemType::Consumable).then_some(quantity),
            stat_bonus: self.stat_bonus,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemRegistry {
    templates: Vec<ItemTemplate>,
}

impl ItemRegistry {
    pub fn new(templates: Vec<ItemTemplate>) -> Self {
        Self { templates }
    }

    pub fn standard() -> Self {
        Self::new(standard_items())
    }

    pub fn get(&self, key: &str) -> Option<&ItemTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn create(&self, key: &str, quantity: u32) -> Result<Item, DataError> {
        self.get(key)
            .map(|t| t.instantiate(quantity))
            .ok_or_else(|| DataError::UnknownItem(key.to_string()))
    }

    /// Display name for a key, used when summarising rewards.
    pub fn name_of(&self, key: &str) -> Result<&'static str, DataError> {
        self.get(key)
            .map(|t| t.name)
            .ok_or_else(|| DataError::UnknownItem(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemTemplate> {
        self.templates.iter()
    }
}

/// A permanent collectible that adds a stat bonus while owned.
#[derive(Debug, Clone, PartialEq)]
pub struct RelicDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u32,
    pub stat_bonus: Attributes,
}

#[derive(Debug, Clone)]
pub struct RelicRegistry {
    relics: Vec<RelicDefinition>,
}

impl RelicRegistry {
    pub fn new(relics: Vec<RelicDefinition>) -> Self {
        Self { relics }
    }

    pub fn standard() -> Self {
        Self::new(standard_relics())
    }

    pub fn get(&self, id: &str) -> Option<&RelicDefinition> {
        self.relics.iter().find(|r| r.id == id)
    }

    /// Sum of the bonuses of every owned relic. Unknown ids are skipped so an
    /// old save that references a removed relic still loads.
    pub fn total_bonus<'a>(&self, owned: impl IntoIterator<Item = &'a String>) -> Attributes {
        let mut total = Attributes::zero();
        for id in owned {
            if let Some(relic) = self.get(id) {
                total.add(&relic.stat_bonus);
            }
        }
        total
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelicDefinition> {
        self.relics.iter()
    }
}

fn consumable(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    rarity: Rarity,
) -> ItemTemplate {
    ItemTemplate {
        key,
        name,
        description,
        item_type: ItemType::Consumable,
        rarity,
        icon: key,
        stat_bonus: None,
    }
}

fn material(key: &'static str, name: &'static str, description: &'static str) -> ItemTemplate {
    ItemTemplate {
        key,
        name,
        description,
        item_type: ItemType::Material,
        rarity: Rarity::Common,
        icon: key,
        stat_bonus: None,
    }
}

fn equipment(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    rarity: Rarity,
    stat_bonus: Attributes,
) -> ItemTemplate {
    ItemTemplate {
        key,
        name,
        description,
        item_type: ItemType::Equipment,
        rarity,
        icon: key,
        stat_bonus: Some(stat_bonus),
    }
}

fn standard_items() -> Vec<ItemTemplate> {
    vec![
        // Consumables
        consumable(
            "heal_potion",
            "治疗药水",
            "立即恢复部分AP，并在之后几回合持续恢复。",
            Rarity::Common,
        ),
        consumable(
            "arcane_tonic",
            "奥术补剂",
            "瞬间将AP恢复至满值。",
            Rarity::Rare,
        ),
        consumable("trail_ration", "行军干粮", "简单却顶饱的口粮。", Rarity::Common),
        consumable("smoke_bomb", "烟雾弹", "投掷后会冒出浓烟。", Rarity::Uncommon),
        // Materials
        material("slime_gel", "史莱姆凝胶", "黏糊糊的半透明胶质。"),
        material("wolf_pelt", "狼皮", "粗糙但保暖的毛皮。"),
        material("bone_shard", "骨片", "带着寒意的碎骨。"),
        material("venom_sac", "毒囊", "小心别捏破。"),
        material("ember_core", "余烬核心", "仍在微微发烫的火种。"),
        material("frost_crystal", "霜晶", "永不融化的冰晶。"),
        material("shadow_silk", "暗影丝", "在光下几乎看不见。"),
        material("dragon_scale", "龙鳞", "坚硬无比的鳞片。"),
        // Equipment
        equipment(
            "iron_sword",
            "铁剑",
            "结实可靠的铁剑。",
            Rarity::Common,
            Attributes::new(3, 0, 0, 0, 0),
        ),
        equipment(
            "leather_armor",
            "皮甲",
            "轻便的皮制护甲。",
            Rarity::Common,
            Attributes::new(0, 2, 0, 0, 0),
        ),
        equipment(
            "apprentice_staff",
            "学徒法杖",
            "法术学徒的入门法杖。",
            Rarity::Common,
            Attributes::new(0, 0, 3, 0, 0),
        ),
        equipment(
            "lucky_charm",
            "幸运护符",
            "带来好运，但看起来有点俗气。",
            Rarity::Uncommon,
            Attributes::new(0, 0, 0, -1, 3),
        ),
        // Key items
        ItemTemplate {
            key: "old_key",
            name: "古旧钥匙",
            description: "不知道能打开哪扇门。",
            item_type: ItemType::Key,
            rarity: Rarity::Rare,
            icon: "old_key",
            stat_bonus: None,
        },
    ]
}

fn standard_relics() -> Vec<RelicDefinition> {
    vec![
        RelicDefinition {
            id: "wolf_fang_necklace",
            name: "狼牙项链",
            description: "猎人的护身符。",
            price: 300,
            stat_bonus: Attributes::new(2, 1, 0, 0, 0),
        },
        RelicDefinition {
            id: "sage_monocle",
            name: "贤者单片镜",
            description: "让世界看起来更清晰。",
            price: 450,
            stat_bonus: Attributes::new(0, 0, 3, 1, 0),
        },
        RelicDefinition {
            id: "gamblers_die",
            name: "赌徒骰子",
            description: "命运总是眷顾勇者。",
            price: 600,
            stat_bonus: Attributes::new(0, 0, 0, -2, 5),
        },
    ]
}
