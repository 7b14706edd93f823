//! Property tests for the stat formulas, enemy generation, the combat
//! engine and save round trips.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use saga::character::{Attributes, Character, CharacterClass, Gender};
use saga::combat::{generate_enemy, initialize_combat, resolve, GenerationOptions, PlayerAction};
use saga::core::combat_math::{
    apply_food_recovery, calculate_ap_damage, calculate_damage_to_enemy, food_recovery_amount,
    heal_amount, max_ap,
};
use saga::core::constants::MAX_LEVEL;
use saga::core::progression::{add_experience, max_hp_for_level, max_mp_for_level};
use saga::save::store::sanitize_slot;
use saga::save::{MemoryStore, SaveData, SaveManager};
use saga::zones::get_all_regions;
use saga::{BalanceConfig, GameData, GameState};

// ── Strategy helpers ──────────────────────────────────

fn arb_class() -> impl Strategy<Value = CharacterClass> {
    prop_oneof![
        Just(CharacterClass::Warrior),
        Just(CharacterClass::Mage),
        Just(CharacterClass::Rogue),
        Just(CharacterClass::Bard),
    ]
}

fn arb_action() -> impl Strategy<Value = PlayerAction> {
    prop_oneof![
        4 => Just(PlayerAction::Attack),
        2 => Just(PlayerAction::Defend),
        1 => Just(PlayerAction::UseHealPotion),
        1 => Just(PlayerAction::UseArcaneTonic),
        1 => Just(PlayerAction::StunnedTurn),
        1 => Just(PlayerAction::Retreat),
    ]
}

fn arb_gender() -> impl Strategy<Value = Gender> {
    prop_oneof![
        Just(Gender::Male),
        Just(Gender::Female),
        Just(Gender::Unspecified),
    ]
}

const ITEM_KEYS: &[&str] = &[
    "heal_potion",
    "arcane_tonic",
    "trail_ration",
    "smoke_bomb",
    "wolf_pelt",
    "iron_sword",
    "lucky_charm",
];

const QUEST_IDS: &[&str] = &["quest_slime", "quest_wolf", "quest_lost_key", "quest_herbs"];

fn arb_quest_ids() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(QUEST_IDS, 0..=QUEST_IDS.len())
        .prop_map(|ids| ids.into_iter().map(str::to_string).collect())
}

prop_compose! {
    /// A character whose every field is already within its legal range.
    fn arb_character()(
        class in arb_class(),
        gender in arb_gender(),
        stats in prop::array::uniform5(1i32..30),
        level in 1u32..=MAX_LEVEL,
        exp in 0u32..100,
        gold in 0u32..=999_999,
        ap_pct in 0u32..=100,
        hp_pct in 0u32..=100,
        mp_pct in 0u32..=100,
        items in prop::collection::vec((prop::sample::select(ITEM_KEYS), 1u32..120), 0..8),
        active_quests in arb_quest_ids(),
        completed_quests in arb_quest_ids(),
    ) -> Character {
        let data = GameData::standard().unwrap();
        let config = &data.balance;
        let mut character = Character::new("存档者".to_string(), class, gender, config);
        let [str_, dex, int, cha, luck] = stats;
        character.base_stats = Attributes::new(str_, dex, int, cha, luck);
        character.level = level;
        character.exp = if level == MAX_LEVEL { 0 } else { exp % config.progression.exp_per_level };
        character.gold = gold.min(config.economy.max_gold);

        character.max_ap = max_ap(level, config);
        character.max_hp = max_hp_for_level(level, config);
        character.max_mp = max_mp_for_level(level, config);
        character.current_ap = character.max_ap * ap_pct / 100;
        character.current_hp = character.max_hp * hp_pct / 100;
        character.current_mp = character.max_mp * mp_pct / 100;

        for (key, quantity) in items {
            character.add_item(data.items.create(key, quantity).unwrap(), config.economy.stack_cap);
        }
        character.active_quests = active_quests;
        character.completed_quests = completed_quests;
        character.recompute_stats_bonus(&Attributes::zero());
        character
    }
}

// ── Stat formulas ─────────────────────────────────────

proptest! {
    #[test]
    fn prop_max_ap_non_decreasing(level in 1u32..MAX_LEVEL) {
        let config = BalanceConfig::default();
        prop_assert!(max_ap(level + 1, &config) >= max_ap(level, &config));
    }

    #[test]
    fn prop_damage_to_enemy_within_variance(
        attack in 0u32..2_000,
        defense in 0u32..2_000,
        seed in any::<u64>(),
    ) {
        let config = BalanceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let damage = calculate_damage_to_enemy(attack, defense, &mut rng, &config);
        let base = attack.saturating_sub(defense).max(1) as f64;
        let variance = config.combat.damage_variance;

        prop_assert!(damage >= 1);
        prop_assert!(damage as f64 <= (base * (1.0 + variance)).floor());
        prop_assert!(damage as f64 >= (base * (1.0 - variance)).floor().max(1.0) - 1.0);
    }

    #[test]
    fn prop_ap_damage_at_least_one_and_defend_never_hurts(
        attack in 0u32..5_000,
        strong in any::<bool>(),
    ) {
        let config = BalanceConfig::default();
        let open = calculate_ap_damage(attack, strong, false, &config);
        let guarded = calculate_ap_damage(attack, strong, true, &config);
        prop_assert!(guarded >= 1);
        prop_assert!(guarded <= open);
    }

    #[test]
    fn prop_food_always_recovers_something(
        price in 0u32..10_000,
        level in 1u32..=MAX_LEVEL,
        current_pct in 0u32..=100,
    ) {
        let config = BalanceConfig::default();
        let max = max_ap(level, &config);
        let current = max * current_pct / 100;
        prop_assert!(food_recovery_amount(price, max, &config) >= 1);
        let after = apply_food_recovery(current, max, price, &config);
        prop_assert!(after <= max);
        prop_assert!(after >= current);
    }

    #[test]
    fn prop_heal_never_overfills(current in 0u32..600, max in 1u32..600, pct in 0.0f64..1.0) {
        let current = current.min(max);
        prop_assert!(current + heal_amount(current, max, pct) <= max);
    }
}

// ── Progression ───────────────────────────────────────

proptest! {
    #[test]
    fn prop_add_experience_keeps_invariant(
        level in 1u32..=MAX_LEVEL,
        exp in 0u32..100,
        gain in 0u32..50_000,
    ) {
        let config = BalanceConfig::default();
        let per_level = config.progression.exp_per_level;
        let exp = if level == MAX_LEVEL { 0 } else { exp };
        let result = add_experience(level, exp, gain, &config);

        prop_assert!(result.new_level >= level);
        prop_assert!(result.new_level <= MAX_LEVEL);
        prop_assert_eq!(result.levels_gained, result.new_level - level);
        if result.new_level < MAX_LEVEL {
            prop_assert!(result.new_exp < per_level);
            prop_assert_eq!(
                result.levels_gained * per_level + result.new_exp,
                exp + gain
            );
        } else {
            prop_assert_eq!(result.new_exp, 0);
        }
    }
}

// ── Enemy generation ──────────────────────────────────

proptest! {
    #[test]
    fn prop_generated_enemy_is_well_formed(
        player_level in 1u32..=MAX_LEVEL,
        region_idx in 0usize..8,
        seed in any::<u64>(),
    ) {
        let data = GameData::standard().unwrap();
        let regions = get_all_regions();
        let region = regions.get(region_idx);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let enemy = generate_enemy(
            player_level,
            region,
            &data.enemies,
            GenerationOptions::default(),
            &mut rng,
            &data.balance,
        ).unwrap();

        prop_assert!((1..=MAX_LEVEL).contains(&enemy.level));
        prop_assert!(enemy.max_hp >= 1);
        prop_assert_eq!(enemy.current_hp, enemy.max_hp);
        for key in &enemy.rewards.items {
            prop_assert!(data.items.contains(key), "unknown reward {}", key);
        }
    }
}

// ── Combat engine ─────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_combat_invariants_hold_for_any_action_sequence(
        class in arb_class(),
        seed in any::<u64>(),
        actions in prop::collection::vec(arb_action(), 1..40),
    ) {
        let data = GameData::standard().unwrap();
        let config = &data.balance;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut character = Character::new("测试".to_string(), class, Gender::Unspecified, config);
        character.add_item(data.items.create("heal_potion", 2).unwrap(), config.economy.stack_cap);

        let enemy = generate_enemy(1, None, &data.enemies, GenerationOptions::default(), &mut rng, config).unwrap();
        let mut combat = initialize_combat(enemy, &mut rng, config);

        for action in actions {
            match resolve(&character, &combat, action, &mut rng, config) {
                Ok(resolution) => {
                    prop_assert!(resolution.combat.combat_logs.len() > combat.combat_logs.len());
                    prop_assert_eq!(
                        &resolution.combat.combat_logs[..combat.combat_logs.len()],
                        &combat.combat_logs[..]
                    );
                    character = resolution.character;
                    combat = resolution.combat;
                }
                Err(_) => continue,
            }

            prop_assert!(character.current_ap <= character.max_ap);
            prop_assert!(combat.current_turn <= combat.max_turns + 1);
            if !combat.is_in_combat() {
                break;
            }
        }
    }
}

// ── Save slots ────────────────────────────────────────

proptest! {
    #[test]
    fn prop_sanitized_slot_is_a_safe_file_stem(slot in ".{0,40}") {
        let clean = sanitize_slot(&slot);
        prop_assert!(clean
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-'));
        prop_assert!(!clean.contains('/'));
        prop_assert!(!clean.contains('.'));
    }
}

// ── Save round trip ───────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_character_round_trip(character in arb_character(), seed in any::<u64>()) {
        let data = GameData::standard().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = GameState::new(character);

        let json = serde_json::to_string(&SaveManager::<MemoryStore>::to_save_data(&state)).unwrap();
        let parsed: SaveData = serde_json::from_str(&json).unwrap();
        let restored = SaveManager::<MemoryStore>::restore(parsed, &data, &mut rng);

        prop_assert_eq!(&restored.character, &state.character);
        prop_assert_eq!(&restored.current_location, &state.current_location);
    }
}
