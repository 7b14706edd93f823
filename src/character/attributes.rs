use serde::{Deserialize, Serialize};

pub const NUM_ATTRIBUTES: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Strength,
    Dexterity,
    Intelligence,
    Charisma,
    Luck,
}

impl AttributeType {
    pub fn all() -> [AttributeType; NUM_ATTRIBUTES] {
        [
            AttributeType::Strength,
            AttributeType::Dexterity,
            AttributeType::Intelligence,
            AttributeType::Charisma,
            AttributeType::Luck,
        ]
    }

    pub fn abbrev(&self) -> &str {
        match self {
            AttributeType::Strength => "STR",
            AttributeType::Dexterity => "DEX",
            AttributeType::Intelligence => "INT",
            AttributeType::Charisma => "CHA",
            AttributeType::Luck => "LUCK",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AttributeType::Strength => 0,
            AttributeType::Dexterity => 1,
            AttributeType::Intelligence => 2,
            AttributeType::Charisma => 3,
            AttributeType::Luck => 4,
        }
    }
}

/// Five signed attribute values. Used both for base stats and for bonus
/// deltas, which may be negative.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attributes {
    values: [i32; NUM_ATTRIBUTES],
}

impl Attributes {
    pub fn new(str: i32, dex: i32, int: i32, cha: i32, luck: i32) -> Self {
        Self {
            values: [str, dex, int, cha, luck],
        }
    }

    /// All zeros; the identity for `add`.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, attr: AttributeType) -> i32 {
        self.values[attr.index()]
    }

    pub fn set(&mut self, attr: AttributeType, value: i32) {
        self.values[attr.index()] = value;
    }

    /// Componentwise addition, unclamped.
    pub fn add(&mut self, other: &Attributes) {
        for attr in AttributeType::all() {
            self.values[attr.index()] += other.get(attr);
        }
    }

    pub fn plus(&self, other: &Attributes) -> Attributes {
        let mut sum = *self;
        sum.add(other);
        sum
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut attrs = Attributes::new(10, 8, 6, 4, 2);
        assert_eq!(attrs.get(AttributeType::Strength), 10);
        assert_eq!(attrs.get(AttributeType::Luck), 2);
        attrs.set(AttributeType::Charisma, 12);
        assert_eq!(attrs.get(AttributeType::Charisma), 12);
    }

    #[test]
    fn test_add_allows_negative_bonus() {
        let base = Attributes::new(10, 10, 10, 10, 10);
        let bonus = Attributes::new(-3, 2, 0, -12, 1);
        let total = base.plus(&bonus);
        assert_eq!(total.get(AttributeType::Strength), 7);
        assert_eq!(total.get(AttributeType::Charisma), -2);
        assert_eq!(total.get(AttributeType::Luck), 11);
    }

    #[test]
    fn test_index_returns_unique_values() {
        for (i, attr) in AttributeType::all().iter().enumerate() {
            assert_eq!(attr.index(), i);
        }
    }

    #[test]
    fn test_zero_is_identity() {
        let base = Attributes::new(1, 2, 3, 4, 5);
        assert_eq!(base.plus(&Attributes::zero()), base);
        assert!(Attributes::zero().is_zero());
    }
}
