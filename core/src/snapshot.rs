//! Read-only view of the engine for display collaborators.
//!
//! A snapshot is taken between ticks and serialized as-is (the runner
//! writes one per IPC response). It never feeds back into the engine.

use crate::{
    breeding::BreedingPhase,
    engine::SimEngine,
    health::{self, calculate_environment_fitness, HealthTier, Symptom},
    reptile::{Behavior, HabitatState, HealthState, LifeStage},
    species::{get_species_data, SpeciesId},
    types::{ReptileIndex, Timestamp},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ReptileView {
    pub index:             ReptileIndex,
    pub name:              String,
    pub species:           SpeciesId,
    pub common_name:       &'static str,
    pub life_stage:        LifeStage,
    pub age_days:          u32,
    pub mass_g:            f32,
    pub length_mm:         f32,
    pub behavior:          Behavior,
    pub breeding_phase:    BreedingPhase,
    pub health:            HealthState,
    pub habitat:           HabitatState,
    pub environment_fitness: u8,
    pub tier:              HealthTier,
    pub symptoms:          Vec<Symptom>,
    pub genetics_quality:  u8,
    pub experience_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub now_ms:           Timestamp,
    pub ticks_run:        u64,
    pub hour_of_day:      u32,
    pub selected:         ReptileIndex,
    pub total_experience: u64,
    pub keeper_level:     u32,
    pub reptiles:         Vec<ReptileView>,
}

impl EngineSnapshot {
    pub fn capture(engine: &SimEngine) -> Self {
        let reptiles = engine
            .reptiles()
            .iter()
            .enumerate()
            .map(|(index, r)| {
                let data = get_species_data(r.species);
                let diagnosis = health::diagnose(r);
                ReptileView {
                    index,
                    name:                r.name.clone(),
                    species:             r.species,
                    common_name:         data.common_name_en,
                    life_stage:          r.life_stage,
                    age_days:            r.age_days(),
                    mass_g:              r.mass_g,
                    length_mm:           r.length_mm,
                    behavior:            r.behavior,
                    breeding_phase:      engine
                        .breeding_phase(index)
                        .unwrap_or(BreedingPhase::NotBreeding),
                    health:              r.health.clone(),
                    habitat:             r.habitat.clone(),
                    environment_fitness: calculate_environment_fitness(data, &r.habitat),
                    tier:                diagnosis.tier,
                    symptoms:            diagnosis.symptoms,
                    genetics_quality:    r.genetics_quality,
                    experience_points:   r.experience_points(),
                }
            })
            .collect();

        Self {
            now_ms:           engine.clock.now_ms,
            ticks_run:        engine.clock.ticks_run,
            hour_of_day:      engine.clock.hour_of_day(),
            selected:         engine.selected_index(),
            total_experience: engine.total_experience(),
            keeper_level:     engine.keeper_level(),
            reptiles,
        }
    }
}
