//! Oracle Village - an autonomous settlement on a tile grid
//!
//! A seeded grid of trees is analysed for clusters and a spawn point, an
//! oracle plans each villager's day from a rule book (optionally asking an
//! LLM advisor first), and a tick executor applies the plan atomically.

pub mod analysis;
pub mod core;
pub mod llm;
pub mod oracle;
pub mod simulation;
pub mod village;
pub mod world;

pub use crate::core::config::{ConfigFile, SimulationConfig};
pub use crate::core::error::{Result, VillageError};
pub use crate::simulation::Settlement;
