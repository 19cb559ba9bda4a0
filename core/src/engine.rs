//! The simulation engine.
//!
//! TICK ORDER (fixed, never reordered):
//!   1. advance the clock
//!   2. per reptile, in collection order:
//!        physiology → behavior → shedding → growth → clamp → stamp
//!   3. at most one random event
//!
//! RULES:
//!   - All randomness flows through the injected `RandomSource`.
//!   - Index-taking operations validate before touching state.
//!   - Every state change worth surfacing is recorded as a `SimEvent`.

use crate::{
    behavior::{self, ShedChange},
    breeding::{BreedingPhase, BreedingPolicy, NoBreeding},
    clock::SimClock,
    command::{CommandOutcome, PlayerCommand},
    config::SimConfig,
    error::{SimResult, ValidationError},
    event::{event_type_name, EventLog, SimEvent},
    growth,
    health::{self, Diagnosis, FITNESS_STRESS_THRESHOLD},
    reptile::{Behavior, Reptile},
    rng::{RandomSource, RngStream, SimRng},
    save::{SaveManager, MAX_SAVED_REPTILES},
    snapshot::EngineSnapshot,
    species::{get_species_data, FoodType, SpeciesId},
    store::KvStore,
    types::{ReptileIndex, Timestamp, MS_PER_DAY, MS_PER_HOUR},
};

/// A random event fires when a draw in [0, 10000) lands below this.
pub const RANDOM_EVENT_CHANCE_PER_10K: u32 = 5;
/// Cumulative bands for the event-kind draw in [0, 100).
pub const STRESS_EVENT_BAND: u32 = 10;
pub const GENETICS_EVENT_BAND: u32 = 15;
pub const PARASITE_EVENT_BAND: u32 = 18;

pub const STRESS_EVENT_AMOUNT: u8 = 20;
pub const GENETICS_EVENT_AMOUNT: u8 = 5;

pub const FEED_HUNGER_RELIEF: u8 = 30;
pub const FEED_HEALTH_BONUS: u8 = 5;
pub const CLEAN_STRESS_RELIEF: u8 = 10;
pub const TREAT_HEALTH_BONUS: u8 = 5;
pub const TREAT_EXPERIENCE: u32 = 2;

pub const EXPERIENCE_PER_KEEPER_LEVEL: u64 = 100;

pub struct SimEngine {
    pub config: SimConfig,
    pub clock:  SimClock,
    reptiles:   Vec<Reptile>,
    selected:   ReptileIndex,
    rng:        Box<dyn RandomSource>,
    breeding:   Box<dyn BreedingPolicy>,
    events:     EventLog,
}

impl SimEngine {
    /// Engine seeded from `config.seed` on the engine stream.
    pub fn new(config: SimConfig) -> Self {
        let rng = SimRng::new(config.seed, RngStream::Engine);
        Self::with_random(config, Box::new(rng))
    }

    /// Capacity is capped at `MAX_SAVED_REPTILES` so every collection stays saveable.
    pub fn with_random(mut config: SimConfig, rng: Box<dyn RandomSource>) -> Self {
        if config.capacity > MAX_SAVED_REPTILES {
            log::warn!(
                "capacity {} exceeds the save limit; using {MAX_SAVED_REPTILES}",
                config.capacity
            );
            config.capacity = MAX_SAVED_REPTILES;
        }
        Self {
            events:   EventLog::with_capacity(config.event_history),
            clock:    SimClock::new(0),
            reptiles: Vec::with_capacity(config.capacity),
            selected: 0,
            rng,
            breeding: Box::new(NoBreeding),
            config,
        }
    }

    /// Swap the breeding contract consulted by `can_breed`.
    pub fn with_breeding_policy(mut self, policy: Box<dyn BreedingPolicy>) -> Self {
        self.breeding = policy;
        self
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now_ms
    }

    // ── Tick ───────────────────────────────────────────────────

    /// Advance the simulation by `elapsed_ms`. Returns the events it produced.
    pub fn tick(&mut self, elapsed_ms: Timestamp) -> Vec<SimEvent> {
        let now = self.clock.advance(elapsed_ms);
        let hour = self.clock.hour_of_day();
        let mut tick_events = Vec::new();

        for reptile in &mut self.reptiles {
            tick_reptile(reptile, now, hour, self.rng.as_mut(), &mut tick_events);
        }

        if self.rng.next_below(10_000) < RANDOM_EVENT_CHANCE_PER_10K {
            if let Some(event) = self.trigger_random_event(now) {
                tick_events.push(event);
            }
        }

        for event in &tick_events {
            log::debug!("t={now} {}", event_type_name(event));
        }
        self.events.extend(tick_events.iter().cloned());
        tick_events
    }

    /// Run `n` ticks of `elapsed_ms` each. Used for tests and fast-forward.
    pub fn run_ticks(&mut self, n: u64, elapsed_ms: Timestamp) -> Vec<SimEvent> {
        (0..n).flat_map(|_| self.tick(elapsed_ms)).collect()
    }

    fn trigger_random_event(&mut self, now: Timestamp) -> Option<SimEvent> {
        if self.reptiles.is_empty() {
            return None;
        }
        let index = self.rng.next_below(self.reptiles.len() as u32) as usize;
        let draw = self.rng.next_below(100);
        let reptile = &mut self.reptiles[index];
        let name = reptile.name.clone();

        let event = if draw < STRESS_EVENT_BAND {
            let h = &mut reptile.health;
            h.stress = h.stress.saturating_add(STRESS_EVENT_AMOUNT).min(100);
            log::info!("Random event: {name} is stressed");
            SimEvent::StressSpike { at: now, name, stress: h.stress }
        } else if draw < GENETICS_EVENT_BAND {
            reptile.genetics_quality =
                reptile.genetics_quality.saturating_add(GENETICS_EVENT_AMOUNT).min(100);
            log::info!("Random event: {name} develops a stronger constitution");
            SimEvent::GeneticsImproved {
                at: now,
                name,
                genetics_quality: reptile.genetics_quality,
            }
        } else if draw < PARASITE_EVENT_BAND {
            reptile.health.has_parasites = true;
            log::warn!("Random event: {name} has parasites");
            SimEvent::ParasitesContracted { at: now, name }
        } else {
            return None;
        };
        Some(event)
    }

    // ── Collection ─────────────────────────────────────────────

    pub fn add(&mut self, species: SpeciesId, name: &str) -> SimResult<ReptileIndex> {
        if self.reptiles.len() >= self.config.capacity {
            log::warn!("add '{name}' rejected: collection full");
            return Err(ValidationError::AtCapacity { capacity: self.config.capacity }.into());
        }
        let data = get_species_data(species);
        if !data.is_catalogued() {
            log::warn!("add '{name}' rejected: {species:?} is not catalogued");
            return Err(ValidationError::UncataloguedSpecies { species }.into());
        }

        let genetics = 70 + self.rng.next_below(30) as u8;
        let now = self.now();
        let reptile = Reptile::hatchling(data, name, now, genetics);
        log::info!("Added {} ({})", reptile.name, data.common_name_en);
        self.record(SimEvent::ReptileAdded {
            at: now,
            name: reptile.name.clone(),
            species,
        });
        self.reptiles.push(reptile);
        Ok(self.reptiles.len() - 1)
    }

    /// Compacting erase. The selection is clamped to the new last index.
    pub fn remove(&mut self, index: ReptileIndex) -> SimResult<()> {
        self.check_index(index)?;
        let removed = self.reptiles.remove(index);
        self.selected = self.selected.min(self.reptiles.len().saturating_sub(1));
        log::info!("Removed {}", removed.name);
        let now = self.now();
        self.record(SimEvent::ReptileRemoved { at: now, name: removed.name });
        Ok(())
    }

    /// Replace the collection with previously saved reptiles, clamped to
    /// their species' bounds.
    /// The clock moves forward to the newest stored update if it is behind.
    pub fn restore(&mut self, mut reptiles: Vec<Reptile>) -> SimResult<()> {
        if reptiles.len() > self.config.capacity {
            return Err(ValidationError::AtCapacity { capacity: self.config.capacity }.into());
        }
        if let Some(r) = reptiles.iter().find(|r| !get_species_data(r.species).is_catalogued()) {
            return Err(ValidationError::UncataloguedSpecies { species: r.species }.into());
        }
        for r in &mut reptiles {
            r.clamp_to_species(get_species_data(r.species));
        }
        let newest = reptiles.iter().map(Reptile::last_update).max().unwrap_or(0);
        self.clock.now_ms = self.clock.now_ms.max(newest);
        self.reptiles = reptiles;
        self.selected = 0;
        log::info!("Restored {} reptiles", self.reptiles.len());
        Ok(())
    }

    /// Load the last save into the engine. Any failure is treated as
    /// "no save data": the collection is emptied and `false` returned.
    pub fn restore_or_default<S: KvStore>(&mut self, saves: &SaveManager<S>) -> bool {
        let outcome = saves.load().and_then(|loaded| match loaded {
            Some(save) => {
                self.clock.now_ms = self.clock.now_ms.max(save.timestamp);
                self.restore(save.reptiles).map(|_| true)
            }
            None => Ok(false),
        });
        match outcome {
            Ok(restored) => {
                if !restored {
                    self.reptiles.clear();
                    self.selected = 0;
                }
                restored
            }
            Err(e) => {
                log::warn!("Ignoring unusable save: {e}");
                self.reptiles.clear();
                self.selected = 0;
                false
            }
        }
    }

    pub fn select(&mut self, index: ReptileIndex) -> SimResult<()> {
        self.check_index(index)?;
        self.selected = index;
        Ok(())
    }

    pub fn selected_index(&self) -> ReptileIndex {
        self.selected
    }

    pub fn selected(&self) -> Option<&Reptile> {
        self.reptiles.get(self.selected)
    }

    pub fn reptile(&self, index: ReptileIndex) -> SimResult<&Reptile> {
        self.check_index(index)?;
        Ok(&self.reptiles[index])
    }

    pub fn reptiles(&self) -> &[Reptile] {
        &self.reptiles
    }

    pub fn count(&self) -> usize {
        self.reptiles.len()
    }

    // ── Keeper actions ─────────────────────────────────────────

    pub fn feed(&mut self, index: ReptileIndex, food: FoodType) -> SimResult<()> {
        self.check_index(index)?;
        let now = self.now();
        let reptile = &mut self.reptiles[index];
        if !get_species_data(reptile.species).accepts(food) {
            log::warn!("{} refuses {food:?}", reptile.name);
            return Err(ValidationError::InappropriateFood { food, species: reptile.species }.into());
        }
        let h = &mut reptile.health;
        h.hunger = h.hunger.saturating_sub(FEED_HUNGER_RELIEF);
        h.last_feeding = now;
        h.overall_health = h.overall_health.saturating_add(FEED_HEALTH_BONUS).min(100);
        let event = SimEvent::Fed { at: now, name: reptile.name.clone(), food, hunger: h.hunger };
        self.record(event);
        Ok(())
    }

    pub fn adjust_temperature(&mut self, index: ReptileIndex, value: f32) -> SimResult<()> {
        self.check_index(index)?;
        self.reptiles[index].habitat.temperature_day = value;
        Ok(())
    }

    pub fn adjust_humidity(&mut self, index: ReptileIndex, value: f32) -> SimResult<()> {
        self.check_index(index)?;
        self.reptiles[index].habitat.humidity = value;
        Ok(())
    }

    /// Lights off (0 h) or back on at the summer photoperiod.
    pub fn toggle_lighting(&mut self, index: ReptileIndex) -> SimResult<()> {
        self.check_index(index)?;
        let reptile = &mut self.reptiles[index];
        let habitat = &mut reptile.habitat;
        habitat.photoperiod_hours = if habitat.photoperiod_hours == 0 {
            get_species_data(reptile.species).environment.photoperiod_summer
        } else {
            0
        };
        Ok(())
    }

    pub fn clean(&mut self, index: ReptileIndex) -> SimResult<()> {
        self.check_index(index)?;
        let h = &mut self.reptiles[index].health;
        h.stress = h.stress.saturating_sub(CLEAN_STRESS_RELIEF);
        Ok(())
    }

    pub fn diagnose(&self, index: ReptileIndex) -> SimResult<Diagnosis> {
        Ok(health::diagnose(self.reptile(index)?))
    }

    /// Every treatment has the same effect for now.
    pub fn treat(&mut self, index: ReptileIndex, treatment: &str) -> SimResult<()> {
        self.check_index(index)?;
        let now = self.now();
        let reptile = &mut self.reptiles[index];
        let h = &mut reptile.health;
        h.overall_health = h.overall_health.saturating_add(TREAT_HEALTH_BONUS).min(100);
        reptile.grant_experience(TREAT_EXPERIENCE);
        let event = SimEvent::Treated {
            at: now,
            name: reptile.name.clone(),
            treatment: treatment.to_string(),
            overall_health: reptile.health.overall_health,
        };
        self.record(event);
        Ok(())
    }

    // ── Breeding ───────────────────────────────────────────────

    pub fn can_breed(&self, female: ReptileIndex, male: ReptileIndex) -> SimResult<bool> {
        self.check_index(female)?;
        self.check_index(male)?;
        if female == male {
            return Ok(false);
        }
        Ok(self.breeding.can_breed(&self.reptiles[female], &self.reptiles[male]))
    }

    pub fn breeding_phase(&self, index: ReptileIndex) -> SimResult<BreedingPhase> {
        Ok(self.breeding.phase(self.reptile(index)?))
    }

    pub fn initiate_breeding(&mut self, female: ReptileIndex, male: ReptileIndex) -> SimResult<()> {
        if !self.can_breed(female, male)? {
            log::warn!("Breeding refused by policy '{}'", self.breeding.name());
            return Err(ValidationError::BreedingUnavailable.into());
        }
        self.reptiles[female].behavior = Behavior::Courting;
        self.reptiles[male].behavior = Behavior::Courting;
        Ok(())
    }

    // ── Progression ────────────────────────────────────────────

    pub fn award_experience(&mut self, index: ReptileIndex, points: u32) -> SimResult<()> {
        self.check_index(index)?;
        self.reptiles[index].grant_experience(points);
        Ok(())
    }

    pub fn total_experience(&self) -> u64 {
        self.reptiles.iter().map(|r| r.experience_points() as u64).sum()
    }

    pub fn keeper_level(&self) -> u32 {
        (self.total_experience() / EXPERIENCE_PER_KEEPER_LEVEL) as u32
    }

    // ── Commands / readers ─────────────────────────────────────

    /// Dispatch a serialized player command.
    pub fn apply(&mut self, command: PlayerCommand) -> SimResult<CommandOutcome> {
        log::debug!("command: {}", command.type_name());
        match command {
            PlayerCommand::Add { species, name } => {
                let index = self.add(species, &name)?;
                return Ok(CommandOutcome::Added { index });
            }
            PlayerCommand::Remove { index } => self.remove(index)?,
            PlayerCommand::Select { index } => self.select(index)?,
            PlayerCommand::Feed { index, food } => self.feed(index, food)?,
            PlayerCommand::AdjustTemperature { index, value } => self.adjust_temperature(index, value)?,
            PlayerCommand::AdjustHumidity { index, value } => self.adjust_humidity(index, value)?,
            PlayerCommand::ToggleLighting { index } => self.toggle_lighting(index)?,
            PlayerCommand::Clean { index } => self.clean(index)?,
            PlayerCommand::Diagnose { index } => {
                let diagnosis = self.diagnose(index)?;
                return Ok(CommandOutcome::Diagnosis { diagnosis });
            }
            PlayerCommand::Treat { index, treatment } => self.treat(index, &treatment)?,
            PlayerCommand::Breed { female, male } => self.initiate_breeding(female, male)?,
        }
        Ok(CommandOutcome::Done)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::capture(self)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn record(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    fn check_index(&self, index: ReptileIndex) -> Result<(), ValidationError> {
        if index < self.reptiles.len() {
            Ok(())
        } else {
            Err(ValidationError::NotFound { index, count: self.reptiles.len() })
        }
    }
}

/// Number of `period` boundaries, counted from `origin`, crossed in (from, to].
fn boundaries_crossed(origin: Timestamp, from: Timestamp, to: Timestamp, period: Timestamp) -> u64 {
    let a = from.saturating_sub(origin) / period;
    let b = to.saturating_sub(origin) / period;
    b.saturating_sub(a)
}

fn tick_reptile(
    reptile: &mut Reptile,
    now: Timestamp,
    hour_of_day: u32,
    rng: &mut dyn RandomSource,
    events: &mut Vec<SimEvent>,
) {
    let data = get_species_data(reptile.species);
    let previous = reptile.last_update();
    reptile.stamp_update(now);
    let birth = reptile.birth_timestamp();

    // Physiology.
    let feeding_window = data.feeding_interval_days(reptile.life_stage) as Timestamp * MS_PER_DAY;
    let h = &mut reptile.health;
    // Hunger only counts hours after the feeding window has run out.
    let hungry_from = previous.max(h.last_feeding.saturating_add(feeding_window));
    if now > hungry_from {
        let hours = boundaries_crossed(birth, hungry_from, now, MS_PER_HOUR);
        h.hunger = (h.hunger as u64 + hours).min(100) as u8;
    }
    let dry_spells = boundaries_crossed(birth, previous, now, 2 * MS_PER_HOUR);
    h.hydration = (h.hydration as u64).saturating_sub(dry_spells) as u8;

    let fitness = health::calculate_environment_fitness(data, &reptile.habitat);
    h.stress = if fitness < FITNESS_STRESS_THRESHOLD {
        h.stress.saturating_add(1).min(100)
    } else {
        h.stress.saturating_sub(1)
    };
    let score = (100 - h.hunger as i32 / 2 + h.hydration as i32 - h.stress as i32) / 2;
    h.overall_health = score.clamp(0, 100) as u8;

    reptile.behavior = behavior::select_behavior(&reptile.health, &reptile.habitat, data, hour_of_day);

    let age_days = reptile.age_days();
    match behavior::update_shedding(&mut reptile.health, age_days, rng) {
        Some(ShedChange::Started) => {
            events.push(SimEvent::SheddingStarted { at: now, name: reptile.name.clone() });
        }
        Some(ShedChange::Ended) => {
            events.push(SimEvent::SheddingEnded { at: now, name: reptile.name.clone() });
        }
        None => {}
    }

    if let Some(stage) = growth::apply_growth(reptile, data) {
        log::info!("{} is now {stage:?}", reptile.name);
        events.push(SimEvent::LifeStageChanged { at: now, name: reptile.name.clone(), stage });
    }

    reptile.clamp_to_species(data);
}
