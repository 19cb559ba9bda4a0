//! Health evaluator: environment fitness, range checks and diagnosis.
//!
//! Fitness starts at 100 and loses a fixed penalty per parameter that sits
//! outside the species' optimum range:
//!   day temperature  −20
//!   humidity         −15
//!   UVB index        −10

use crate::{
    reptile::{HabitatState, Reptile},
    species::{get_species_data, SpeciesData},
};
use serde::{Deserialize, Serialize};

pub const TEMPERATURE_PENALTY: u8 = 20;
pub const HUMIDITY_PENALTY:    u8 = 15;
pub const UVB_PENALTY:         u8 = 10;

/// Fitness below this raises stress each tick; at or above it stress eases.
pub const FITNESS_STRESS_THRESHOLD: u8 = 80;

pub fn calculate_environment_fitness(species: &SpeciesData, habitat: &HabitatState) -> u8 {
    let env = &species.environment;
    let mut penalty: u8 = 0;

    if !(env.temp_day_min..=env.temp_day_max).contains(&habitat.temperature_day) {
        penalty = penalty.saturating_add(TEMPERATURE_PENALTY);
    }
    if !(env.humidity_min..=env.humidity_max).contains(&habitat.humidity) {
        penalty = penalty.saturating_add(HUMIDITY_PENALTY);
    }
    if !(env.uvb_min..=env.uvb_max).contains(&habitat.uvb_index) {
        penalty = penalty.saturating_add(UVB_PENALTY);
    }

    100u8.saturating_sub(penalty)
}

pub fn is_temperature_optimal(reptile: &Reptile, temperature: f32) -> bool {
    let env = &get_species_data(reptile.species).environment;
    (env.temp_day_min..=env.temp_day_max).contains(&temperature)
}

pub fn is_humidity_optimal(reptile: &Reptile, humidity: f32) -> bool {
    let env = &get_species_data(reptile.species).environment;
    (env.humidity_min..=env.humidity_max).contains(&humidity)
}

// ── Diagnosis ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    /// hunger > 80
    Starving,
    /// hydration < 30
    Dehydrated,
    /// stress > 70
    Stressed,
    Parasites,
    RespiratoryInfection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    Critical,
    Poor,
    Fair,
    Good,
}

impl HealthTier {
    pub fn from_score(overall_health: u8) -> Self {
        match overall_health {
            0..=24  => Self::Critical,
            25..=49 => Self::Poor,
            50..=74 => Self::Fair,
            _       => Self::Good,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub symptoms: Vec<Symptom>,
    pub tier:     HealthTier,
}

impl Diagnosis {
    pub fn is_healthy(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn has(&self, symptom: Symptom) -> bool {
        self.symptoms.contains(&symptom)
    }
}

/// Read-only scan of the symptom thresholds currently crossed.
pub fn diagnose(reptile: &Reptile) -> Diagnosis {
    let h = &reptile.health;
    let checks = [
        (h.hunger > 80,             Symptom::Starving),
        (h.hydration < 30,          Symptom::Dehydrated),
        (h.stress > 70,             Symptom::Stressed),
        (h.has_parasites,           Symptom::Parasites),
        (h.respiratory_infection,   Symptom::RespiratoryInfection),
    ];
    Diagnosis {
        symptoms: checks.iter().filter(|(hit, _)| *hit).map(|(_, s)| *s).collect(),
        tier:     HealthTier::from_score(h.overall_health),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesId;

    fn gecko() -> Reptile {
        Reptile::hatchling(get_species_data(SpeciesId::LeopardGecko), "Luna", 0, 80)
    }

    #[test]
    fn midpoint_habitat_is_fully_fit() {
        let r = gecko();
        let data = get_species_data(r.species);
        assert_eq!(calculate_environment_fitness(data, &r.habitat), 100);
    }

    #[test]
    fn penalties_are_additive() {
        let mut r = gecko();
        let data = get_species_data(r.species);
        r.habitat.temperature_day = 10.0;
        assert_eq!(calculate_environment_fitness(data, &r.habitat), 80);
        r.habitat.humidity = 90.0;
        assert_eq!(calculate_environment_fitness(data, &r.habitat), 65);
        r.habitat.uvb_index = 14;
        assert_eq!(calculate_environment_fitness(data, &r.habitat), 55);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let r = gecko();
        assert!(is_temperature_optimal(&r, 28.0));
        assert!(is_temperature_optimal(&r, 32.0));
        assert!(!is_temperature_optimal(&r, 32.5));
        assert!(is_humidity_optimal(&r, 40.0));
        assert!(!is_humidity_optimal(&r, 29.9));
    }

    #[test]
    fn diagnosis_reports_crossed_thresholds_only() {
        let mut r = gecko();
        assert!(diagnose(&r).is_healthy());

        r.health.hunger = 81;
        r.health.hydration = 29;
        r.health.has_parasites = true;
        r.health.overall_health = 40;
        let d = diagnose(&r);
        assert_eq!(d.symptoms, vec![Symptom::Starving, Symptom::Dehydrated, Symptom::Parasites]);
        assert_eq!(d.tier, HealthTier::Poor);
        assert!(!d.has(Symptom::Stressed));
    }
}
