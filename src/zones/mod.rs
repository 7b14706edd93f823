//! World regions: level ranges, tiers and biomes used by enemy generation.

mod data;

pub use data::*;
