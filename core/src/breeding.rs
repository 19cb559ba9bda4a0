//! Breeding contract.
//!
//! The phases and compatibility grades are declared so that hosts and
//! saves can name them, but no breeding state machine ships yet.
//! `NoBreeding` is the policy the engine uses by default and it refuses
//! every pair.

use crate::reptile::{Behavior, Reptile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BreedingPhase {
    NotBreeding,
    Conditioning,
    Courtship,
    Mating,
    Gestation,
    EggLaying,
    Incubation,
    Hatching,
    Recovery,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    Incompatible,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

/// The seam a breeding state machine plugs into.
pub trait BreedingPolicy {
    fn name(&self) -> &'static str;

    fn compatibility(&self, female: &Reptile, male: &Reptile) -> Compatibility;

    fn can_breed(&self, female: &Reptile, male: &Reptile) -> bool {
        self.compatibility(female, male) > Compatibility::Incompatible
    }

    /// Where `reptile` stands in the cycle. Courting reptiles are in courtship.
    fn phase(&self, reptile: &Reptile) -> BreedingPhase {
        if reptile.behavior == Behavior::Courting {
            BreedingPhase::Courtship
        } else {
            BreedingPhase::NotBreeding
        }
    }
}

pub struct NoBreeding;

impl BreedingPolicy for NoBreeding {
    fn name(&self) -> &'static str { "none" }

    fn compatibility(&self, _female: &Reptile, _male: &Reptile) -> Compatibility {
        Compatibility::Incompatible
    }

    fn phase(&self, _reptile: &Reptile) -> BreedingPhase {
        BreedingPhase::NotBreeding
    }
}
