// Fixed rules that are not balance knobs. Tunable numbers live in
// `core::balance::BalanceConfig`.

// Leveling
pub const MAX_LEVEL: u32 = 99;
pub const MIN_LEVEL: u32 = 1;

// Consumables the combat engine looks up by display name
pub const HEAL_POTION_KEY: &str = "heal_potion";
pub const HEAL_POTION_NAME: &str = "治疗药水";
pub const ARCANE_TONIC_KEY: &str = "arcane_tonic";
pub const ARCANE_TONIC_NAME: &str = "奥术补剂";

// Save format
pub const SAVE_VERSION: u32 = 3;
pub const SAVE_DIR_NAME: &str = ".saga";
pub const AUTOSAVE_SLOT: &str = "autosave";

// Combat
pub const FIRST_TURN: u32 = 1;
pub const TIMEOUT_FAILURE_REASON: &str = "回合耗尽，敌人逃走了";
pub const RETREAT_FAILURE_REASON: &str = "你选择了撤退";
pub const DEFEAT_FAILURE_REASON: &str = "AP耗尽，战斗失败";

// Starting character
pub const STARTING_GOLD: u32 = 100;
pub const STARTING_LOCATION: &str = "青石村";
pub const DEFAULT_ROUTE_ID: &str = "classic";
