//! Narrative text boundary and the heuristics that read it back.

pub mod detector;
pub mod generation;
pub mod quests;

pub use detector::{NarrativeEvent, NarrativeEventDetector};
pub use generation::{ChatMessage, NarrativeBackend, NarrativeRequest, Role};
pub use quests::{QuestBook, QuestCompletion, QuestDefinition};
