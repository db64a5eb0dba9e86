use thiserror::Error;

use crate::core::types::Coord;

#[derive(Error, Debug)]
pub enum VillageError {
    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Position out of bounds: {0}")]
    InvalidPosition(Coord),

    #[error("Entity {entity} not found at {at}")]
    UnknownEntity { at: Coord, entity: u32 },

    #[error("Villager not found: {0}")]
    UnknownVillager(String),

    #[error("Villager already registered: {0}")]
    DuplicateVillager(String),

    #[error("Insufficient resources to build {0}")]
    InsufficientResources(String),

    #[error("Advisory timed out after {0} ms")]
    AdvisoryTimeout(u128),

    #[error("Advisory reply malformed: {0}")]
    AdvisoryMalformed(String),

    #[error("Advisory error: {0}")]
    Advisory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VillageError>;
