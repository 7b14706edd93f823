use serde::{Deserialize, Serialize};

use crate::character::attributes::Attributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Consumable,
    Equipment,
    Material,
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

impl Rarity {
    /// Returns the display name for this rarity tier.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "普通",
            Rarity::Uncommon => "优秀",
            Rarity::Rare => "稀有",
            Rarity::Epic => "史诗",
            Rarity::Legendary => "传说",
        }
    }
}

/// An owned item instance in a character's inventory.
///
/// `quantity` is only set for consumables; `stat_bonus` only for equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Registry key this item was created from.
    pub key: String,
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_bonus: Option<Attributes>,
}

impl Item {
    pub fn is_consumable(&self) -> bool {
        self.item_type == ItemType::Consumable
    }

    /// Number of uses left; non-stacking items count as one.
    pub fn count(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}
