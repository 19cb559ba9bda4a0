use crate::{
    reptile::{LifeStage, Reptile},
    species::SpeciesData,
};

/// Growth only accrues above this overall health.
pub const GROWTH_HEALTH_GATE: u8 = 70;
pub const MIN_GROWTH_RATE: f32 = 0.1;
pub const MASS_PER_TICK_G: f32 = 0.5;
pub const LENGTH_PER_TICK_MM: f32 = 0.2;

/// Linear slowdown toward sexual maturity, never below `MIN_GROWTH_RATE`.
pub fn growth_rate(age_days: u32, species: &SpeciesData) -> f32 {
    let maturity = species.maturity_days().max(1) as f32;
    (1.0 - age_days as f32 / maturity).max(MIN_GROWTH_RATE)
}

pub fn life_stage_for_age(age_days: u32, species: &SpeciesData) -> LifeStage {
    let senior_from = species.lifespan_days() as f32 * 0.8;
    if age_days < 30 {
        LifeStage::Hatchling
    } else if age_days < 180 {
        LifeStage::Juvenile
    } else if age_days < species.maturity_days() {
        LifeStage::SubAdult
    } else if (age_days as f32) < senior_from {
        LifeStage::Adult
    } else {
        LifeStage::Senior
    }
}

/// Grow (if healthy enough) and re-derive the life stage.
/// Returns the new stage when it changed.
pub fn apply_growth(reptile: &mut Reptile, species: &SpeciesData) -> Option<LifeStage> {
    let age = reptile.age_days();

    if reptile.health.overall_health > GROWTH_HEALTH_GATE {
        let rate = growth_rate(age, species);
        let bio = &species.biology;
        reptile.mass_g = (reptile.mass_g + rate * MASS_PER_TICK_G).min(bio.adult_mass_max_g as f32);
        reptile.length_mm =
            (reptile.length_mm + rate * LENGTH_PER_TICK_MM).min(bio.adult_length_max_mm as f32);
    }

    let stage = life_stage_for_age(age, species);
    if stage != reptile.life_stage {
        reptile.life_stage = stage;
        Some(stage)
    } else {
        None
    }
}
