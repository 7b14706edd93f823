use serde::{Deserialize, Serialize};

use super::attributes::Attributes;
use crate::core::balance::BalanceConfig;
use crate::core::combat_math::max_ap;
use crate::core::constants::{MIN_LEVEL, STARTING_GOLD};
use crate::core::progression::{max_hp_for_level, max_mp_for_level};
use crate::error::{CombatError, GameError};
use crate::items::{Item, ItemType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Bard,
}

impl CharacterClass {
    pub fn all() -> [CharacterClass; 4] {
        [
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Bard,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "战士",
            CharacterClass::Mage => "法师",
            CharacterClass::Rogue => "游侠",
            CharacterClass::Bard => "吟游诗人",
        }
    }

    /// Starting attributes: STR, DEX, INT, CHA, LUCK.
    pub fn base_stats(&self) -> Attributes {
        match self {
            CharacterClass::Warrior => Attributes::new(14, 10, 6, 8, 8),
            CharacterClass::Mage => Attributes::new(6, 8, 15, 10, 9),
            CharacterClass::Rogue => Attributes::new(9, 14, 8, 8, 12),
            CharacterClass::Bard => Attributes::new(7, 10, 10, 15, 10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

/// The player character.
///
/// Invariants: `current_ap <= max_ap`, `exp < exp_per_level` (or 0 at the
/// level cap), `level` within 1..=99. All mutation goes through the methods
/// here or the engine/session functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: CharacterClass,
    pub gender: Gender,
    pub base_stats: Attributes,
    pub level: u32,
    pub exp: u32,
    pub gold: u32,
    pub inventory: Vec<Item>,
    pub active_quests: Vec<String>,
    pub completed_quests: Vec<String>,
    pub current_ap: u32,
    pub max_ap: u32,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mp: u32,
    pub max_mp: u32,
    /// Sum of equipment and relic bonuses. Recomputed, never edited directly.
    pub stats_bonus: Attributes,
}

impl Character {
    /// Creates a level 1 character with full AP/HP/MP.
    pub fn new(name: String, class: CharacterClass, gender: Gender, config: &BalanceConfig) -> Self {
        let max_ap = max_ap(MIN_LEVEL, config);
        let max_hp = max_hp_for_level(MIN_LEVEL, config);
        let max_mp = max_mp_for_level(MIN_LEVEL, config);
        Self {
            name,
            class,
            gender,
            base_stats: class.base_stats(),
            level: MIN_LEVEL,
            exp: 0,
            gold: STARTING_GOLD,
            inventory: Vec::new(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            current_ap: max_ap,
            max_ap,
            current_hp: max_hp,
            max_hp,
            current_mp: max_mp,
            max_mp,
            stats_bonus: Attributes::zero(),
        }
    }

    /// Adds gold, clamped to `max_gold`. Returns the amount actually added.
    pub fn add_gold(&mut self, amount: u32, max_gold: u32) -> u32 {
        let before = self.gold;
        self.gold = self.gold.saturating_add(amount).min(max_gold);
        self.gold.saturating_sub(before)
    }

    pub fn spend_gold(&mut self, amount: u32) -> Result<(), GameError> {
        if self.gold < amount {
            return Err(GameError::InsufficientGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Sets current AP, clamped to `[0, max_ap]`.
    pub fn set_ap(&mut self, value: u32) {
        self.current_ap = value.min(self.max_ap);
    }

    pub fn missing_ap(&self) -> u32 {
        self.max_ap.saturating_sub(self.current_ap)
    }

    /// Adds an item to the inventory.
    ///
    /// Consumables stack onto an existing consumable of the same name; the
    /// part of a stack above `stack_cap` is discarded. Returns how many units
    /// were discarded.
    pub fn add_item(&mut self, item: Item, stack_cap: u32) -> u32 {
        if item.item_type != ItemType::Consumable {
            self.inventory.push(item);
            return 0;
        }

        let incoming = item.count();
        if let Some(existing) = self
            .inventory
            .iter_mut()
            .find(|i| i.is_consumable() && i.name == item.name)
        {
            let total = existing.count().saturating_add(incoming);
            existing.quantity = Some(total.min(stack_cap));
            return total.saturating_sub(stack_cap);
        }

        let mut item = item;
        item.quantity = Some(incoming.min(stack_cap));
        self.inventory.push(item);
        incoming.saturating_sub(stack_cap)
    }

    /// Total units held of the item with this name.
    pub fn item_count(&self, name: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|i| i.name == name)
            .map(|i| i.count())
            .sum()
    }

    /// Uses one unit of the named consumable, removing the stack when empty.
    pub fn consume_one(&mut self, name: &str) -> Result<(), CombatError> {
        let index = self
            .inventory
            .iter()
            .position(|i| i.is_consumable() && i.name == name && i.count() > 0)
            .ok_or_else(|| CombatError::MissingConsumable(name.to_string()))?;

        let remaining = self.inventory[index].count() - 1;
        if remaining == 0 {
            self.inventory.remove(index);
        } else {
            self.inventory[index].quantity = Some(remaining);
        }
        Ok(())
    }

    /// Sum of stat bonuses from equipment items in the inventory.
    pub fn equipment_bonus(&self) -> Attributes {
        let mut total = Attributes::zero();
        for bonus in self
            .inventory
            .iter()
            .filter(|i| i.item_type == ItemType::Equipment)
            .filter_map(|i| i.stat_bonus.as_ref())
        {
            total.add(bonus);
        }
        total
    }

    /// Recomputes `stats_bonus` from inventory equipment plus relic bonuses.
    /// Call after any inventory or relic-collection change.
    pub fn recompute_stats_bonus(&mut self, relic_bonus: &Attributes) {
        self.stats_bonus = self.equipment_bonus().plus(relic_bonus);
    }

    pub fn has_active_quest(&self, quest_id: &str) -> bool {
        self.active_quests.iter().any(|q| q == quest_id)
    }

    /// Moves a quest from active to completed. Returns false if it was not active.
    pub fn complete_quest(&mut self, quest_id: &str) -> bool {
        let Some(index) = self.active_quests.iter().position(|q| q == quest_id) else {
            return false;
        };
        let quest = self.active_quests.remove(index);
        if !self.completed_quests.contains(&quest) {
            self.completed_quests.push(quest);
        }
        true
    }
}
