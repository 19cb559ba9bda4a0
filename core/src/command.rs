//! Player commands: the keeper actions a UI or host can submit.

use crate::{
    health::Diagnosis,
    species::{FoodType, SpeciesId},
    types::ReptileIndex,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Collection ─────────────────────────────────
    Add { species: SpeciesId, name: String },
    Remove { index: ReptileIndex },
    Select { index: ReptileIndex },

    // ── Care ───────────────────────────────────────
    Feed { index: ReptileIndex, food: FoodType },
    AdjustTemperature { index: ReptileIndex, value: f32 },
    AdjustHumidity { index: ReptileIndex, value: f32 },
    ToggleLighting { index: ReptileIndex },
    Clean { index: ReptileIndex },

    // ── Veterinary ─────────────────────────────────
    Diagnose { index: ReptileIndex },
    Treat { index: ReptileIndex, treatment: String },

    // ── Breeding ───────────────────────────────────
    Breed { female: ReptileIndex, male: ReptileIndex },
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Add { .. }               => "add",
            Self::Remove { .. }            => "remove",
            Self::Select { .. }            => "select",
            Self::Feed { .. }              => "feed",
            Self::AdjustTemperature { .. } => "adjust_temperature",
            Self::AdjustHumidity { .. }    => "adjust_humidity",
            Self::ToggleLighting { .. }    => "toggle_lighting",
            Self::Clean { .. }             => "clean",
            Self::Diagnose { .. }          => "diagnose",
            Self::Treat { .. }             => "treat",
            Self::Breed { .. }             => "breed",
        }
    }
}

/// What a successful command produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    Added { index: ReptileIndex },
    Diagnosis { diagnosis: Diagnosis },
}
