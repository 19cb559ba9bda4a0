//! The reptile entity and the state structs it is made of.

use crate::{
    species::{SpeciesData, SpeciesId},
    types::{Timestamp, MS_PER_DAY},
};
use serde::{Deserialize, Serialize};

/// Longest display name in bytes. Matches the 32-byte NUL-padded save field.
pub const MAX_NAME_LEN: usize = 31;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Egg,
    Hatchling,
    Juvenile,
    SubAdult,
    Adult,
    Senior,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Basking,
    Hiding,
    Exploring,
    Feeding,
    Sleeping,
    Shedding,
    Courting,
    Aggressive,
    Stressed,
    Brumation,
}

/// Physiological state. Every percentage is kept in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthState {
    pub overall_health:         u8,
    /// 100 = starving.
    pub hunger:                 u8,
    pub hydration:              u8,
    pub stress:                 u8,
    pub reproductive_condition: u8,
    pub is_shedding:            bool,
    pub has_parasites:          bool,
    pub respiratory_infection:  bool,
    pub last_feeding:           Timestamp,
    pub last_defecation:        Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitatState {
    pub temperature_day:   f32,
    pub temperature_night: f32,
    pub humidity:          f32,
    pub uvb_index:         u8,
    pub photoperiod_hours: u16,
    pub has_water_dish:    bool,
    pub has_warm_hide:     bool,
    pub has_cool_hide:     bool,
}

impl HabitatState {
    /// Midpoint of the species' optima, fully furnished, summer lighting.
    pub fn for_species(data: &SpeciesData) -> Self {
        let env = &data.environment;
        Self {
            temperature_day:   (env.temp_day_min + env.temp_day_max) / 2.0,
            temperature_night: (env.temp_night_min + env.temp_night_max) / 2.0,
            humidity:          (env.humidity_min + env.humidity_max) / 2.0,
            uvb_index:         ((env.uvb_min as u16 + env.uvb_max as u16) / 2) as u8,
            photoperiod_hours: env.photoperiod_summer,
            has_water_dish:    true,
            has_warm_hide:     true,
            has_cool_hide:     true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reptile {
    pub name:              String,
    pub species:           SpeciesId,
    pub life_stage:        LifeStage,
    pub mass_g:            f32,
    pub length_mm:         f32,
    pub health:            HealthState,
    pub habitat:           HabitatState,
    pub behavior:          Behavior,
    pub is_gravid:         bool,
    pub genetics_quality:  u8,
    experience_points:     u32,
    birth_timestamp:       Timestamp,
    last_update:           Timestamp,
}

impl Reptile {
    /// A fresh hatchling born at `now`. `genetics_quality` is clamped to 100.
    pub fn hatchling(data: &SpeciesData, name: &str, now: Timestamp, genetics_quality: u8) -> Self {
        Self {
            name: truncate_name(name),
            species: data.id,
            life_stage: LifeStage::Hatchling,
            mass_g: (data.biology.adult_mass_min_g / 10) as f32,
            length_mm: (data.biology.adult_length_min_mm / 3) as f32,
            health: HealthState {
                overall_health: 100,
                hunger: 50,
                hydration: 80,
                stress: 20,
                reproductive_condition: 0,
                is_shedding: false,
                has_parasites: false,
                respiratory_infection: false,
                last_feeding: now,
                last_defecation: now,
            },
            habitat: HabitatState::for_species(data),
            behavior: Behavior::Exploring,
            is_gravid: false,
            genetics_quality: genetics_quality.min(100),
            experience_points: 0,
            birth_timestamp: now,
            last_update: now,
        }
    }

    /// Rebuild from stored parts. `last_update` is raised to `birth` if older.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: String,
        species: SpeciesId,
        life_stage: LifeStage,
        mass_g: f32,
        length_mm: f32,
        health: HealthState,
        habitat: HabitatState,
        behavior: Behavior,
        is_gravid: bool,
        genetics_quality: u8,
        experience_points: u32,
        birth_timestamp: Timestamp,
        last_update: Timestamp,
    ) -> Self {
        Self {
            name,
            species,
            life_stage,
            mass_g,
            length_mm,
            health,
            habitat,
            behavior,
            is_gravid,
            genetics_quality,
            experience_points,
            birth_timestamp,
            last_update: last_update.max(birth_timestamp),
        }
    }

    pub fn experience_points(&self) -> u32 { self.experience_points }
    pub fn birth_timestamp(&self) -> Timestamp { self.birth_timestamp }
    pub fn last_update(&self) -> Timestamp { self.last_update }

    /// Whole days between birth and the last update.
    pub fn age_days(&self) -> u32 {
        (self.last_update.saturating_sub(self.birth_timestamp) / MS_PER_DAY) as u32
    }

    pub fn grant_experience(&mut self, points: u32) {
        self.experience_points = self.experience_points.saturating_add(points);
    }

    /// Moves the update stamp forward. Earlier values are ignored.
    pub(crate) fn stamp_update(&mut self, now: Timestamp) {
        self.last_update = self.last_update.max(now);
    }

    /// Percentages to [0, 100], mass and length to [0, adult maximum].
    pub(crate) fn clamp_to_species(&mut self, data: &SpeciesData) {
        let h = &mut self.health;
        h.overall_health = h.overall_health.min(100);
        h.hunger = h.hunger.min(100);
        h.hydration = h.hydration.min(100);
        h.stress = h.stress.min(100);
        h.reproductive_condition = h.reproductive_condition.min(100);
        self.genetics_quality = self.genetics_quality.min(100);

        let bio = &data.biology;
        self.mass_g = self.mass_g.clamp(0.0, bio.adult_mass_max_g as f32);
        self.length_mm = self.length_mm.clamp(0.0, bio.adult_length_max_mm as f32);
    }
}

/// NUL bytes are dropped: the save field is NUL-terminated.
pub(crate) fn truncate_name(name: &str) -> String {
    let name: String = name.chars().filter(|&c| c != '\0').collect();
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}
