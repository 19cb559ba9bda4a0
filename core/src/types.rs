//! Shared primitive types used across the entire simulation.

/// Simulation time in milliseconds since the clock was created.
pub type Timestamp = u64;

/// Position of a reptile in the engine's collection.
/// Only valid until the next removal.
pub type ReptileIndex = usize;

pub const MS_PER_HOUR: Timestamp = 60 * 60 * 1000;
pub const MS_PER_DAY: Timestamp = 24 * MS_PER_HOUR;
