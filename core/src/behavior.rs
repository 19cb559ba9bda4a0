//! Behavior selector and the shedding cycle.
//!
//! Selection is a fixed priority list:
//!   1. hunger > 70                → Feeding
//!   2. shedding                   → Shedding
//!   3. day (08:00–18:59)          → Hiding / Basking / Exploring
//!   4. night                      → Sleeping
//!
//! Shedding is toggled separately, after selection, every tick.

use crate::{
    reptile::{Behavior, HabitatState, HealthState},
    rng::RandomSource,
    species::SpeciesData,
};

pub const FEEDING_HUNGER_THRESHOLD: u8 = 70;
pub const THIRSTY_HYDRATION_THRESHOLD: u8 = 30;
/// Degrees above the species' day minimum below which a reptile basks.
pub const BASKING_MARGIN_C: f32 = 2.0;
pub const DAY_START_HOUR: u32 = 8;
pub const DAY_END_HOUR: u32 = 18;

pub const SHEDDING_CYCLE_DAYS: u32 = 45;
/// Percent chance per tick that an ongoing shed completes.
pub const SHEDDING_END_CHANCE_PCT: u32 = 10;

pub fn select_behavior(
    health: &HealthState,
    habitat: &HabitatState,
    species: &SpeciesData,
    hour_of_day: u32,
) -> Behavior {
    if health.hunger > FEEDING_HUNGER_THRESHOLD {
        return Behavior::Feeding;
    }
    if health.is_shedding {
        return Behavior::Shedding;
    }
    if (DAY_START_HOUR..=DAY_END_HOUR).contains(&hour_of_day) {
        if health.hydration < THIRSTY_HYDRATION_THRESHOLD {
            Behavior::Hiding
        } else if habitat.temperature_day < species.environment.temp_day_min + BASKING_MARGIN_C {
            Behavior::Basking
        } else {
            Behavior::Exploring
        }
    } else {
        Behavior::Sleeping
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShedChange {
    Started,
    Ended,
}

/// Start a shed on cycle days, then give an ongoing shed its chance to end.
/// A shed started this tick may also end this tick.
pub fn update_shedding(
    health: &mut HealthState,
    age_days: u32,
    rng: &mut dyn RandomSource,
) -> Option<ShedChange> {
    let was_shedding = health.is_shedding;

    if age_days > 0 && age_days % SHEDDING_CYCLE_DAYS == 0 {
        health.is_shedding = true;
    }
    if health.is_shedding && rng.next_below(100) < SHEDDING_END_CHANCE_PCT {
        health.is_shedding = false;
    }

    match (was_shedding, health.is_shedding) {
        (false, true) => Some(ShedChange::Started),
        (true, false) => Some(ShedChange::Ended),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        reptile::Reptile,
        species::{get_species_data, SpeciesId},
    };

    struct Fixed(u32);

    impl RandomSource for Fixed {
        fn next_below(&mut self, n: u32) -> u32 { self.0 % n }
    }

    fn dragon() -> Reptile {
        Reptile::hatchling(get_species_data(SpeciesId::PogonaVitticeps), "Sunny", 0, 80)
    }

    #[test]
    fn hunger_overrides_time_of_day() {
        let mut r = dragon();
        r.health.hunger = 75;
        let data = get_species_data(r.species);
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 12), Behavior::Feeding);
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 2), Behavior::Feeding);
    }

    #[test]
    fn daytime_branches() {
        let mut r = dragon();
        let data = get_species_data(r.species);
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 8), Behavior::Exploring);

        r.habitat.temperature_day = 36.0; // below 35 + 2
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 18), Behavior::Basking);

        r.health.hydration = 20;
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 10), Behavior::Hiding);
    }

    #[test]
    fn night_means_sleep_unless_shedding() {
        let mut r = dragon();
        let data = get_species_data(r.species);
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 19), Behavior::Sleeping);
        r.health.is_shedding = true;
        assert_eq!(select_behavior(&r.health, &r.habitat, data, 19), Behavior::Shedding);
    }

    #[test]
    fn shed_starts_on_cycle_day() {
        let mut r = dragon();
        assert_eq!(update_shedding(&mut r.health, 45, &mut Fixed(50)), Some(ShedChange::Started));
        assert!(r.health.is_shedding);
    }

    #[test]
    fn no_shed_on_day_zero_or_off_cycle() {
        let mut r = dragon();
        assert_eq!(update_shedding(&mut r.health, 0, &mut Fixed(50)), None);
        assert_eq!(update_shedding(&mut r.health, 44, &mut Fixed(50)), None);
        assert!(!r.health.is_shedding);
    }

    #[test]
    fn shed_ends_on_low_roll() {
        let mut r = dragon();
        r.health.is_shedding = true;
        assert_eq!(update_shedding(&mut r.health, 3, &mut Fixed(9)), Some(ShedChange::Ended));
        assert!(!r.health.is_shedding);
    }
}
