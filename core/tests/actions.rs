use reptile_core::{
    breeding::{BreedingPhase, BreedingPolicy, Compatibility},
    command::{CommandOutcome, PlayerCommand},
    config::SimConfig,
    engine::SimEngine,
    error::{SimError, ValidationError},
    event::SimEvent,
    health::Symptom,
    reptile::{Behavior, Reptile},
    rng::RandomSource,
    species::{get_species_data, FoodType, SpeciesId},
    types::MS_PER_HOUR,
};

struct Fixed(u32);

impl RandomSource for Fixed {
    fn next_below(&mut self, n: u32) -> u32 { self.0 % n }
}

fn keeper() -> SimEngine {
    let mut engine = SimEngine::with_random(SimConfig::default(), Box::new(Fixed(50)));
    engine.add(SpeciesId::LeopardGecko, "Luna").unwrap();
    engine.add(SpeciesId::BallPython, "Orion").unwrap();
    engine
}

// ── Feeding ─────────────────────────────────────────────────────

#[test]
fn accepted_food_relieves_hunger_and_stamps_the_clock() {
    let mut engine = keeper();
    engine.tick(3 * MS_PER_HOUR);
    let before = engine.reptile(0).unwrap().health.clone();

    engine.feed(0, FoodType::Crickets).unwrap();

    let after = &engine.reptile(0).unwrap().health;
    assert_eq!(after.hunger, before.hunger - 30);
    assert_eq!(after.last_feeding, engine.now());
    assert_eq!(after.overall_health, (before.overall_health + 5).min(100));
    assert!(matches!(
        engine.events().iter().last(),
        Some(SimEvent::Fed { food: FoodType::Crickets, .. })
    ));
}

#[test]
fn hunger_floors_at_zero() {
    let mut engine = keeper();
    engine.feed(0, FoodType::Mealworms).unwrap();
    engine.feed(0, FoodType::Mealworms).unwrap();
    assert_eq!(engine.reptile(0).unwrap().health.hunger, 0);
}

#[test]
fn food_outside_the_diet_is_refused() {
    let mut engine = keeper();
    let before = engine.reptile(1).unwrap().clone();

    let err = engine.feed(1, FoodType::Crickets).unwrap_err();
    assert!(matches!(
        err,
        SimError::Validation(ValidationError::InappropriateFood {
            food: FoodType::Crickets,
            species: SpeciesId::BallPython,
        })
    ));
    assert_eq!(engine.reptile(1).unwrap(), &before);

    engine.feed(1, FoodType::FrozenMiceFuzzy).unwrap();
    assert_eq!(engine.reptile(1).unwrap().health.hunger, 20);
}

#[test]
fn feeding_succeeds_iff_food_is_preferred() {
    for species in [SpeciesId::PogonaVitticeps, SpeciesId::LeopardGecko, SpeciesId::BallPython] {
        let preferred = get_species_data(species).diet.preferred_foods;
        for food in [
            FoodType::Crickets, FoodType::Mealworms, FoodType::DubiaRoaches, FoodType::Waxworms,
            FoodType::FrozenMicePinkie, FoodType::FrozenMiceFuzzy, FoodType::FrozenMiceAdult,
            FoodType::LeafyGreens, FoodType::Vegetables, FoodType::Fruits,
            FoodType::CalciumSupplement, FoodType::D3Supplement, FoodType::Multivitamin,
        ] {
            let mut engine = SimEngine::with_random(SimConfig::default(), Box::new(Fixed(50)));
            engine.add(species, "x").unwrap();
            assert_eq!(
                engine.feed(0, food).is_ok(),
                preferred.contains(&food),
                "{species:?} / {food:?}"
            );
        }
    }
}

// ── Habitat ─────────────────────────────────────────────────────

#[test]
fn habitat_adjustments_are_applied_verbatim() {
    let mut engine = keeper();
    engine.adjust_temperature(0, -5.5).unwrap();
    engine.adjust_humidity(0, 140.0).unwrap();
    let habitat = &engine.reptile(0).unwrap().habitat;
    assert_eq!(habitat.temperature_day, -5.5);
    assert_eq!(habitat.humidity, 140.0);
}

#[test]
fn lighting_toggles_between_off_and_summer_photoperiod() {
    let mut engine = keeper();
    assert_eq!(engine.reptile(0).unwrap().habitat.photoperiod_hours, 12);
    engine.toggle_lighting(0).unwrap();
    assert_eq!(engine.reptile(0).unwrap().habitat.photoperiod_hours, 0);
    engine.toggle_lighting(0).unwrap();
    assert_eq!(engine.reptile(0).unwrap().habitat.photoperiod_hours, 12);
}

#[test]
fn cleaning_relieves_stress_down_to_zero() {
    let mut engine = keeper();
    engine.clean(0).unwrap();
    assert_eq!(engine.reptile(0).unwrap().health.stress, 10);
    engine.clean(0).unwrap();
    engine.clean(0).unwrap();
    assert_eq!(engine.reptile(0).unwrap().health.stress, 0);
}

// ── Veterinary ──────────────────────────────────────────────────

#[test]
fn treatment_heals_and_grants_experience() {
    let mut engine = keeper();
    let data = get_species_data(SpeciesId::LeopardGecko);
    let mut sick = Reptile::hatchling(data, "Luna", 0, 80);
    sick.health.overall_health = 40;
    sick.health.has_parasites = true;
    engine.restore(vec![sick]).unwrap();

    engine.treat(0, "antiparasitic").unwrap();
    let luna = engine.reptile(0).unwrap();
    assert_eq!(luna.health.overall_health, 45);
    assert_eq!(luna.experience_points(), 2);
    // Treatment kinds are not differentiated yet.
    assert!(luna.health.has_parasites);

    for _ in 0..20 {
        engine.treat(0, "vitamins").unwrap();
    }
    assert_eq!(engine.reptile(0).unwrap().health.overall_health, 100);
    assert_eq!(engine.reptile(0).unwrap().experience_points(), 42);
}

#[test]
fn diagnosis_is_read_only() {
    let mut engine = keeper();
    let data = get_species_data(SpeciesId::LeopardGecko);
    let mut r = Reptile::hatchling(data, "Luna", 0, 80);
    r.health.hunger = 90;
    r.health.hydration = 10;
    engine.restore(vec![r]).unwrap();
    let before = engine.reptiles().to_vec();

    let diagnosis = engine.diagnose(0).unwrap();
    assert!(diagnosis.has(Symptom::Starving));
    assert!(diagnosis.has(Symptom::Dehydrated));
    assert!(!diagnosis.has(Symptom::Parasites));
    assert!(!diagnosis.is_healthy());
    assert_eq!(engine.reptiles(), before.as_slice());
}

// ── Breeding ────────────────────────────────────────────────────

#[test]
fn shipped_breeding_contract_refuses_every_pair() {
    let mut engine = keeper();
    assert!(!engine.can_breed(0, 1).unwrap());
    let err = engine.initiate_breeding(0, 1).unwrap_err();
    assert!(matches!(err, SimError::Validation(ValidationError::BreedingUnavailable)));
    assert!(matches!(
        engine.can_breed(0, 7),
        Err(SimError::Validation(ValidationError::NotFound { index: 7, .. }))
    ));
}

struct SameSpecies;

impl BreedingPolicy for SameSpecies {
    fn name(&self) -> &'static str { "same_species" }

    fn compatibility(&self, female: &Reptile, male: &Reptile) -> Compatibility {
        if female.species == male.species {
            Compatibility::Good
        } else {
            Compatibility::Incompatible
        }
    }
}

#[test]
fn breeding_policy_is_pluggable() {
    let mut engine = SimEngine::with_random(SimConfig::default(), Box::new(Fixed(50)))
        .with_breeding_policy(Box::new(SameSpecies));
    engine.add(SpeciesId::LeopardGecko, "Luna").unwrap();
    engine.add(SpeciesId::LeopardGecko, "Sol").unwrap();
    engine.add(SpeciesId::BallPython, "Orion").unwrap();

    assert!(engine.can_breed(0, 1).unwrap());
    assert!(!engine.can_breed(0, 0).unwrap());
    assert!(!engine.can_breed(0, 2).unwrap());

    engine.initiate_breeding(0, 1).unwrap();
    assert_eq!(engine.reptile(0).unwrap().behavior, Behavior::Courting);
    assert_eq!(engine.reptile(1).unwrap().behavior, Behavior::Courting);
}

#[test]
fn breeding_phase_follows_the_policy() {
    let mut engine = SimEngine::with_random(SimConfig::default(), Box::new(Fixed(50)))
        .with_breeding_policy(Box::new(SameSpecies));
    engine.add(SpeciesId::LeopardGecko, "Luna").unwrap();
    engine.add(SpeciesId::LeopardGecko, "Sol").unwrap();
    engine.add(SpeciesId::LeopardGecko, "Nox").unwrap();
    assert_eq!(engine.breeding_phase(0).unwrap(), BreedingPhase::NotBreeding);

    engine.initiate_breeding(0, 1).unwrap();
    assert_eq!(engine.breeding_phase(0).unwrap(), BreedingPhase::Courtship);
    assert_eq!(engine.breeding_phase(2).unwrap(), BreedingPhase::NotBreeding);
    let phases: Vec<BreedingPhase> =
        engine.snapshot().reptiles.iter().map(|r| r.breeding_phase).collect();
    assert_eq!(phases, [BreedingPhase::Courtship, BreedingPhase::Courtship, BreedingPhase::NotBreeding]);

    let shipped = keeper();
    assert_eq!(shipped.breeding_phase(1).unwrap(), BreedingPhase::NotBreeding);
    assert!(shipped.breeding_phase(5).is_err());
}

// ── Commands ────────────────────────────────────────────────────

#[test]
fn json_commands_dispatch_to_actions() {
    let mut engine = keeper();
    let commands = [
        r#"{ "action": "feed", "index": 0, "food": "crickets" }"#,
        r#"{ "action": "clean", "index": 0 }"#,
        r#"{ "action": "select", "index": 1 }"#,
        r#"{ "action": "add", "species": "pogona_vitticeps", "name": "Sunny" }"#,
        r#"{ "action": "diagnose", "index": 2 }"#,
    ];
    let outcomes: Vec<CommandOutcome> = commands
        .iter()
        .map(|json| {
            let cmd: PlayerCommand = serde_json::from_str(json).expect("parse command");
            engine.apply(cmd).expect("apply command")
        })
        .collect();

    assert_eq!(outcomes[0], CommandOutcome::Done);
    assert_eq!(outcomes[3], CommandOutcome::Added { index: 2 });
    assert!(matches!(outcomes[4], CommandOutcome::Diagnosis { .. }));
    assert_eq!(engine.reptile(0).unwrap().health.hunger, 20);
    assert_eq!(engine.reptile(0).unwrap().health.stress, 10);
    assert_eq!(engine.selected().unwrap().name, "Orion");
    assert_eq!(engine.count(), 3);
}

#[test]
fn rejected_commands_surface_validation_errors() {
    let mut engine = keeper();
    let result = engine.apply(PlayerCommand::Feed { index: 1, food: FoodType::Fruits });
    assert!(matches!(
        result,
        Err(SimError::Validation(ValidationError::InappropriateFood { .. }))
    ));
}
