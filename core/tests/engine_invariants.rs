use reptile_core::{
    config::SimConfig,
    engine::SimEngine,
    error::{SimError, ValidationError},
    event::SimEvent,
    reptile::Reptile,
    rng::RandomSource,
    species::{get_species_data, FoodType, SpeciesId},
    types::MS_PER_HOUR,
};

/// Constant draw. 50 never fires a random event and never ends a shed.
struct Fixed(u32);

impl RandomSource for Fixed {
    fn next_below(&mut self, n: u32) -> u32 { self.0 % n }
}

fn quiet_engine(config: SimConfig) -> SimEngine {
    SimEngine::with_random(config, Box::new(Fixed(50)))
}

fn assert_within_bounds(r: &Reptile) {
    let h = &r.health;
    for (label, v) in [
        ("overall_health", h.overall_health),
        ("hunger", h.hunger),
        ("hydration", h.hydration),
        ("stress", h.stress),
        ("reproductive_condition", h.reproductive_condition),
        ("genetics_quality", r.genetics_quality),
    ] {
        assert!(v <= 100, "{}: {label} = {v}", r.name);
    }
    let bio = &get_species_data(r.species).biology;
    assert!(r.mass_g <= bio.adult_mass_max_g as f32, "{}: mass {}", r.name, r.mass_g);
    assert!(r.length_mm <= bio.adult_length_max_mm as f32, "{}: length {}", r.name, r.length_mm);
    assert!(r.last_update() >= r.birth_timestamp());
}

#[test]
fn state_stays_in_bounds_under_hostile_habitats() {
    let mut engine = SimEngine::new(SimConfig::with_seed(7));
    engine.add(SpeciesId::PogonaVitticeps, "Sunny").unwrap();
    engine.add(SpeciesId::LeopardGecko, "Luna").unwrap();
    engine.add(SpeciesId::BallPython, "Orion").unwrap();
    engine.adjust_temperature(0, 80.0).unwrap();
    engine.adjust_humidity(1, -20.0).unwrap();
    engine.toggle_lighting(2).unwrap();

    for tick in 0..3_000 {
        engine.tick(MS_PER_HOUR);
        if tick % 97 == 0 {
            // Keep one of them fed so both branches of the health formula run.
            let _ = engine.feed(1, FoodType::Crickets);
        }
        for r in engine.reptiles() {
            assert_within_bounds(r);
        }
    }
}

#[test]
fn long_healthy_run_stops_at_adult_maximum() {
    let mut engine = quiet_engine(SimConfig::default());
    engine.add(SpeciesId::LeopardGecko, "Luna").unwrap();
    for _ in 0..(24 * 400) {
        engine.tick(MS_PER_HOUR);
        engine.feed(0, FoodType::Crickets).unwrap();
    }
    let luna = engine.reptile(0).unwrap();
    assert_within_bounds(luna);
    assert!(luna.age_days() >= 400);
}

#[test]
fn add_beyond_capacity_fails_without_mutation() {
    let mut engine = quiet_engine(SimConfig::default());
    for i in 0..10 {
        assert_eq!(engine.add(SpeciesId::LeopardGecko, &format!("g{i}")).unwrap(), i);
    }
    let before = engine.reptiles().to_vec();

    let err = engine.add(SpeciesId::LeopardGecko, "extra").unwrap_err();
    assert!(matches!(
        err,
        SimError::Validation(ValidationError::AtCapacity { capacity: 10 })
    ));
    assert_eq!(engine.count(), 10);
    assert_eq!(engine.reptiles(), before.as_slice());
}

#[test]
fn configured_capacity_is_honoured() {
    let mut engine = quiet_engine(SimConfig { capacity: 2, ..SimConfig::default() });
    engine.add(SpeciesId::LeopardGecko, "a").unwrap();
    engine.add(SpeciesId::LeopardGecko, "b").unwrap();
    assert!(engine.add(SpeciesId::LeopardGecko, "c").is_err());
    assert_eq!(engine.count(), 2);
}

#[test]
fn uncatalogued_species_are_refused() {
    let mut engine = quiet_engine(SimConfig::default());
    let err = engine.add(SpeciesId::CornSnake, "Maisy").unwrap_err();
    assert!(matches!(
        err,
        SimError::Validation(ValidationError::UncataloguedSpecies { species: SpeciesId::CornSnake })
    ));
    assert_eq!(engine.count(), 0);
}

#[test]
fn remove_compacts_and_clamps_selection() {
    let mut engine = quiet_engine(SimConfig::default());
    for name in ["a", "b", "c", "d"] {
        engine.add(SpeciesId::LeopardGecko, name).unwrap();
    }
    engine.select(3).unwrap();

    engine.remove(1).unwrap();
    let names: Vec<&str> = engine.reptiles().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a", "c", "d"]);
    assert_eq!(engine.selected_index(), 2);
    assert_eq!(engine.selected().unwrap().name, "d");

    engine.remove(2).unwrap();
    engine.remove(0).unwrap();
    engine.remove(0).unwrap();
    assert_eq!(engine.count(), 0);
    assert_eq!(engine.selected_index(), 0);
    assert!(engine.selected().is_none());
}

#[test]
fn bad_indices_are_rejected_without_side_effects() {
    let mut engine = quiet_engine(SimConfig::default());
    engine.add(SpeciesId::LeopardGecko, "Luna").unwrap();
    let before = engine.reptiles().to_vec();
    let events_before = engine.events().len();

    let not_found = |r: Result<(), SimError>| {
        matches!(r, Err(SimError::Validation(ValidationError::NotFound { index: 5, count: 1 })))
    };
    assert!(not_found(engine.remove(5)));
    assert!(not_found(engine.feed(5, FoodType::Crickets)));
    assert!(not_found(engine.adjust_temperature(5, 30.0)));
    assert!(not_found(engine.adjust_humidity(5, 30.0)));
    assert!(not_found(engine.toggle_lighting(5)));
    assert!(not_found(engine.clean(5)));
    assert!(not_found(engine.treat(5, "antiparasitic")));
    assert!(not_found(engine.select(5)));
    assert!(not_found(engine.award_experience(5, 10)));
    assert!(engine.diagnose(5).is_err());
    assert!(engine.reptile(5).is_err());

    assert_eq!(engine.reptiles(), before.as_slice());
    assert_eq!(engine.events().len(), events_before);
}

#[test]
fn event_history_keeps_only_the_newest_entries() {
    let mut engine = quiet_engine(SimConfig { event_history: 4, ..SimConfig::default() });
    for name in ["a", "b", "c", "d", "e", "f"] {
        engine.add(SpeciesId::LeopardGecko, name).unwrap();
    }
    let names: Vec<String> = engine
        .events()
        .iter()
        .map(|e| match e {
            SimEvent::ReptileAdded { name, .. } => name.clone(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(names, ["c", "d", "e", "f"]);
}

#[test]
fn restore_rejects_more_than_capacity() {
    let mut engine = quiet_engine(SimConfig { capacity: 1, ..SimConfig::default() });
    let data = get_species_data(SpeciesId::LeopardGecko);
    let many = vec![
        Reptile::hatchling(data, "a", 0, 80),
        Reptile::hatchling(data, "b", 0, 80),
    ];
    assert!(engine.restore(many).is_err());
    assert_eq!(engine.count(), 0);
}

#[test]
fn restore_clamps_oversized_reptiles_even_when_too_sick_to_grow() {
    let data = get_species_data(SpeciesId::LeopardGecko);
    let mut giant = Reptile::hatchling(data, "Luna", 0, 80);
    giant.mass_g = 5_000.0;
    giant.length_mm = 9_000.0;
    giant.health.hunger = 100;
    giant.health.stress = 100;

    let mut engine = quiet_engine(SimConfig::default());
    engine.restore(vec![giant]).unwrap();
    assert_within_bounds(engine.reptile(0).unwrap());

    engine.tick(MS_PER_HOUR);
    let luna = engine.reptile(0).unwrap();
    assert!(luna.health.overall_health <= 70, "health {}", luna.health.overall_health);
    assert_within_bounds(luna);
    assert_eq!(luna.mass_g, 110.0);
    assert_eq!(luna.length_mm, 250.0);
}

#[test]
fn capacity_above_the_save_limit_is_capped() {
    let mut engine = quiet_engine(SimConfig { capacity: 50, ..SimConfig::default() });
    assert_eq!(engine.config.capacity, 10);
    for i in 0..10 {
        engine.add(SpeciesId::LeopardGecko, &format!("g{i}")).unwrap();
    }
    assert!(matches!(
        engine.add(SpeciesId::LeopardGecko, "extra"),
        Err(SimError::Validation(ValidationError::AtCapacity { capacity: 10 }))
    ));
}
