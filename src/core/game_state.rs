//! The session object: one player's character, story and shop state.
//!
//! `GameState` is the single writer for everything the player owns. Combat
//! actions go through `combat::session`; narrative side effects go through
//! `apply_narrative_text`.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::combat_math::{apply_food_recovery, dialogue_recovery};
use super::constants::{
    ARCANE_TONIC_KEY, DEFAULT_ROUTE_ID, HEAL_POTION_KEY, STARTING_LOCATION,
};
use super::game_data::GameData;
use super::progression::{apply_fatigue, grant_experience};
use crate::character::{Character, CharacterClass, Gender};
use crate::combat::types::CombatState;
use crate::error::{CombatError, DataError, GameResult, NarrativeError};
use crate::narrative::generation::{ChatMessage, NarrativeBackend, NarrativeRequest, Role};
use crate::narrative::{NarrativeEvent, QuestCompletion};

const STARTING_HEAL_POTIONS: u32 = 3;
const STARTING_ARCANE_TONICS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryLogEntry {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl StoryLogEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopState {
    pub owned_relics: Vec<String>,
    /// Purchases per relic id.
    pub purchase_counts: BTreeMap<String, u32>,
    pub food_purchases: u32,
}

/// What one narrative text did to the game state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrativeEffects {
    pub events: Vec<NarrativeEvent>,
    pub quests: QuestCompletion,
    pub gold_gained: u32,
    pub exp_gained: u32,
    pub levels_gained: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub character: Character,
    pub combat_state: CombatState,
    pub story_log: Vec<StoryLogEntry>,
    pub current_location: String,
    pub route_id: String,
    pub shop: ShopState,
    pub is_generating: bool,
    /// Set after anything worth persisting happens; cleared by the save layer.
    pub autosave_pending: bool,
    pub last_save_time: Option<i64>,
}

impl GameState {
    /// Wraps an existing character in a fresh session.
    pub fn new(character: Character) -> Self {
        Self {
            character,
            combat_state: CombatState::new(),
            story_log: Vec::new(),
            current_location: STARTING_LOCATION.to_string(),
            route_id: DEFAULT_ROUTE_ID.to_string(),
            shop: ShopState::default(),
            is_generating: false,
            autosave_pending: false,
            last_save_time: None,
        }
    }

    /// New character with the starting kit and every quest active.
    pub fn new_game(
        name: String,
        class: CharacterClass,
        gender: Gender,
        data: &GameData,
    ) -> GameResult<Self> {
        let mut character = Character::new(name, class, gender, &data.balance);
        let stack_cap = data.balance.economy.stack_cap;
        character.add_item(data.items.create(HEAL_POTION_KEY, STARTING_HEAL_POTIONS)?, stack_cap);
        character.add_item(data.items.create(ARCANE_TONIC_KEY, STARTING_ARCANE_TONICS)?, stack_cap);
        character.active_quests = data.quests.ids().map(str::to_string).collect();

        info!(name = %character.name, class = character.class.name(), "new game");
        Ok(Self::new(character))
    }

    pub fn push_story(&mut self, role: Role, content: impl Into<String>) {
        self.story_log.push(StoryLogEntry::new(role, content));
    }

    /// Recomputes the stats bonus from inventory equipment and owned relics.
    pub fn refresh_stats_bonus(&mut self, data: &GameData) {
        let relic_bonus = data.relics.total_bonus(&self.shop.owned_relics);
        self.character.recompute_stats_bonus(&relic_bonus);
    }

    /// Buys and eats food of the given price. Returns the AP recovered.
    pub fn eat_food(&mut self, price: u32, data: &GameData) -> GameResult<u32> {
        if self.combat_state.is_in_combat() {
            return Err(CombatError::AlreadyInCombat.into());
        }
        self.character.spend_gold(price)?;
        let before = self.character.current_ap;
        let after = apply_food_recovery(before, self.character.max_ap, price, &data.balance);
        self.character.set_ap(after);
        self.shop.food_purchases += 1;
        self.autosave_pending = true;
        Ok(after - before)
    }

    /// One dialogue exchange: a little AP back, a little HP/MP fatigue.
    pub fn dialogue_tick(&mut self, rng: &mut impl Rng, data: &GameData) {
        let ap = dialogue_recovery(
            self.character.current_ap,
            self.character.max_ap,
            &data.balance,
        );
        self.character.set_ap(ap);
        apply_fatigue(&mut self.character, rng, &data.balance);
    }

    /// Buys a relic. Returns false without charging if it is already owned.
    pub fn acquire_relic(&mut self, relic_id: &str, data: &GameData) -> GameResult<bool> {
        let relic = data
            .relics
            .get(relic_id)
            .ok_or_else(|| DataError::UnknownRelic(relic_id.to_string()))?;
        if self.shop.owned_relics.iter().any(|id| id == relic_id) {
            return Ok(false);
        }

        self.character.spend_gold(relic.price)?;
        self.shop.owned_relics.push(relic.id.to_string());
        *self
            .shop
            .purchase_counts
            .entry(relic.id.to_string())
            .or_insert(0) += 1;
        self.refresh_stats_bonus(data);
        self.autosave_pending = true;
        info!(relic = relic.id, "relic acquired");
        Ok(true)
    }

    /// Scans narrative text and applies what it describes.
    ///
    /// GoldFound adds gold, Victory grants a little exp, Rest recovers AP
    /// like a dialogue exchange, CombatDamage costs cosmetic HP (never below
    /// 1). ItemFound and LevelUp are informational only; items and levels
    /// come from the engine.
    pub fn apply_narrative_text(
        &mut self,
        text: &str,
        rng: &mut impl Rng,
        data: &GameData,
    ) -> NarrativeEffects {
        let cfg = &data.balance;
        let mut effects = NarrativeEffects {
            events: data.detector.detect(text),
            ..NarrativeEffects::default()
        };

        for event in &effects.events {
            match event {
                NarrativeEvent::GoldFound { amount } => {
                    effects.gold_gained += self.character.add_gold(*amount, cfg.economy.max_gold);
                }
                NarrativeEvent::Victory => {
                    let gain = grant_experience(
                        &mut self.character,
                        cfg.narrative.victory_exp,
                        rng,
                        cfg,
                    );
                    effects.exp_gained += cfg.narrative.victory_exp;
                    effects.levels_gained += gain.levels_gained;
                }
                NarrativeEvent::Rest => {
                    let ap =
                        dialogue_recovery(self.character.current_ap, self.character.max_ap, cfg);
                    self.character.set_ap(ap);
                }
                NarrativeEvent::CombatDamage { amount } => {
                    self.character.current_hp =
                        self.character.current_hp.saturating_sub(*amount).max(1);
                }
                NarrativeEvent::Defeat
                | NarrativeEvent::ItemFound { .. }
                | NarrativeEvent::LevelUp => {}
            }
        }

        effects.quests = data
            .quests
            .detect_quest_completion(text, &self.character.active_quests);
        for quest_id in &effects.quests.completed_quest_ids {
            self.character.complete_quest(quest_id);
        }
        if effects.quests.gold_reward > 0 {
            effects.gold_gained += self
                .character
                .add_gold(effects.quests.gold_reward, cfg.economy.max_gold);
        }

        if !effects.events.is_empty() || !effects.quests.is_empty() {
            self.autosave_pending = true;
        }
        effects
    }

    /// Recent story entries as a request, newest last.
    pub fn narrative_request(&self, max_tokens: u32, data: &GameData) -> Result<NarrativeRequest, NarrativeError> {
        let window = data.balance.narrative.history_window;
        let start = self.story_log.len().saturating_sub(window);
        let messages = self.story_log[start..]
            .iter()
            .map(|entry| ChatMessage::new(entry.role, entry.content.clone()))
            .collect();
        NarrativeRequest::new(messages, max_tokens, &data.balance)
    }

    /// Sends the player's input to the backend, streams the reply into a
    /// placeholder story entry, then applies the finished text.
    ///
    /// A request that cannot be built (bad token budget, nothing to send)
    /// leaves the story log untouched. On backend failure the placeholder is
    /// removed and the player's entry is kept, so the input can be retried.
    pub fn generate_narrative(
        &mut self,
        user_input: &str,
        max_tokens: u32,
        backend: &mut dyn NarrativeBackend,
        rng: &mut impl Rng,
        data: &GameData,
    ) -> GameResult<NarrativeEffects> {
        if self.is_generating {
            return Err(NarrativeError::AlreadyGenerating.into());
        }

        let before = self.story_log.len();
        self.push_story(Role::User, user_input);
        let request = match self.narrative_request(max_tokens, data) {
            Ok(request) => request,
            Err(err) => {
                self.story_log.truncate(before);
                return Err(err.into());
            }
        };

        self.push_story(Role::Assistant, "");
        let placeholder = self.story_log.len() - 1;
        self.is_generating = true;

        let story_log = &mut self.story_log;
        let result = backend.stream(&request, &mut |partial: &str| {
            if let Some(entry) = story_log.get_mut(placeholder) {
                entry.content.clear();
                entry.content.push_str(partial);
            }
        });
        self.is_generating = false;

        let text = match result {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "narrative generation failed");
                self.story_log.truncate(placeholder);
                return Err(err.into());
            }
        };

        if let Some(entry) = self.story_log.get_mut(placeholder) {
            entry.content = text.clone();
        }
        self.dialogue_tick(rng, data);
        Ok(self.apply_narrative_text(&text, rng, data))
    }
}
