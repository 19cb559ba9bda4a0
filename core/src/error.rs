use crate::{species::{FoodType, SpeciesId}, types::ReptileIndex};
use thiserror::Error;

/// Rejected player or host input. Never mutates state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No reptile at index {index} (count {count})")]
    NotFound { index: ReptileIndex, count: usize },

    #[error("Collection is full (capacity {capacity})")]
    AtCapacity { capacity: usize },

    #[error("{food:?} is not part of the {species:?} diet")]
    InappropriateFood { food: FoodType, species: SpeciesId },

    #[error("Species {species:?} has no catalog data")]
    UncataloguedSpecies { species: SpeciesId },

    #[error("Breeding is not possible for this pair")]
    BreedingUnavailable,
}

/// Failure of the durable key-value backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store {op} failed for '{key}': {reason}")]
    Backend {
        op:     &'static str,
        key:    String,
        reason: String,
    },
}

/// A stored record that cannot be trusted. Hosts treat this like "no save".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Checksum mismatch: header {expected:#010x}, payload {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Record truncated: {len} bytes, expected {expected}")]
    Truncated { len: usize, expected: usize },

    #[error("Save version {found} is newer than supported version {current}")]
    UnsupportedVersion { found: u32, current: u32 },

    #[error("Stored count {count} exceeds maximum {max}")]
    CapacityExceeded { count: usize, max: usize },

    #[error("Malformed record: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for SimError {
    fn from(e: rusqlite::Error) -> Self {
        SimError::Storage(StorageError::Database(e))
    }
}

pub type SimResult<T> = Result<T, SimError>;
