//! The player character: attributes, inventory and quest bookkeeping.

pub mod attributes;
pub mod types;

pub use attributes::*;
pub use types::*;
