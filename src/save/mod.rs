//! Save and load of a `GameState` through a `SaveStore`.
//!
//! Combat state is never persisted; a game saved mid-battle loads outside
//! combat.

pub mod data;
pub mod store;

pub use data::{ApSnapshot, SaveData, SavedCharacter};
pub use store::{JsonDirStore, MemoryStore, SaveStore};

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

use crate::core::constants::{AUTOSAVE_SLOT, SAVE_VERSION};
use crate::core::game_data::GameData;
use crate::core::game_state::GameState;
use crate::error::{GameResult, SaveError};

pub struct SaveManager<S: SaveStore> {
    store: S,
}

impl<S: SaveStore> SaveManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn to_save_data(state: &GameState) -> SaveData {
        SaveData {
            version: SAVE_VERSION,
            character: (&state.character).into(),
            story_log: state.story_log.clone(),
            current_location: state.current_location.clone(),
            timestamp: Utc::now().timestamp(),
            route_id: state.route_id.clone(),
            shop: state.shop.clone(),
            combat_ap: Some(ApSnapshot {
                current_ap: state.character.current_ap,
                max_ap: state.character.max_ap,
            }),
        }
    }

    /// Writes the state to `slot` and clears the autosave flag.
    pub fn save(&mut self, state: &mut GameState, slot: &str) -> Result<(), SaveError> {
        let save_data = Self::to_save_data(state);
        let json = serde_json::to_string_pretty(&save_data)?;
        self.store.write(slot, &json)?;
        state.autosave_pending = false;
        state.last_save_time = Some(save_data.timestamp);
        info!(slot, "game saved");
        Ok(())
    }

    /// Saves to the autosave slot if something changed. Returns whether it
    /// wrote.
    pub fn autosave(&mut self, state: &mut GameState) -> Result<bool, SaveError> {
        if !state.autosave_pending {
            return Ok(false);
        }
        self.save(state, AUTOSAVE_SLOT)?;
        Ok(true)
    }

    pub fn load(&self, slot: &str, data: &GameData, rng: &mut impl Rng) -> GameResult<GameState> {
        let json = self
            .store
            .read(slot)?
            .ok_or_else(|| SaveError::SlotEmpty(slot.to_string()))?;
        let save_data: SaveData = serde_json::from_str(&json).map_err(SaveError::from)?;
        Ok(Self::restore(save_data, data, rng))
    }

    /// Builds a session from a parsed save, migrating older formats.
    pub fn restore(save_data: SaveData, data: &GameData, rng: &mut impl Rng) -> GameState {
        if !save_data.is_current_version() {
            warn!(
                found = save_data.version,
                expected = SAVE_VERSION,
                "save version mismatch, loading best-effort"
            );
        }

        let character = save_data
            .character
            .into_character(save_data.combat_ap, rng, &data.balance);
        let mut state = GameState::new(character);
        state.story_log = save_data.story_log;
        state.current_location = save_data.current_location;
        state.route_id = save_data.route_id;
        state.shop = save_data.shop;
        state.last_save_time = Some(save_data.timestamp);
        state.refresh_stats_bonus(data);
        state
    }

    pub fn list_slots(&self) -> Result<Vec<String>, SaveError> {
        self.store.list()
    }

    pub fn delete(&mut self, slot: &str) -> Result<(), SaveError> {
        self.store.delete(slot)
    }
}
