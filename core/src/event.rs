//! Simulation events and the bounded event history.
//!
//! Events are informational: the engine has already applied the state
//! change by the time it emits one. Hosts use them for alerts and logs.

use crate::{
    reptile::LifeStage,
    species::{FoodType, SpeciesId},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Collection ─────────────────────────────────
    ReptileAdded {
        at:      Timestamp,
        name:    String,
        species: SpeciesId,
    },
    ReptileRemoved {
        at:   Timestamp,
        name: String,
    },

    // ── Tick ───────────────────────────────────────
    LifeStageChanged {
        at:    Timestamp,
        name:  String,
        stage: LifeStage,
    },
    SheddingStarted {
        at:   Timestamp,
        name: String,
    },
    SheddingEnded {
        at:   Timestamp,
        name: String,
    },

    // ── Random events ──────────────────────────────
    StressSpike {
        at:     Timestamp,
        name:   String,
        stress: u8,
    },
    GeneticsImproved {
        at:               Timestamp,
        name:             String,
        genetics_quality: u8,
    },
    ParasitesContracted {
        at:   Timestamp,
        name: String,
    },

    // ── Keeper actions ─────────────────────────────
    Fed {
        at:     Timestamp,
        name:   String,
        food:   FoodType,
        hunger: u8,
    },
    Treated {
        at:             Timestamp,
        name:           String,
        treatment:      String,
        overall_health: u8,
    },
}

/// Stable string name of a variant, for logs and the runner's output.
pub fn event_type_name(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::ReptileAdded { .. }        => "reptile_added",
        SimEvent::ReptileRemoved { .. }      => "reptile_removed",
        SimEvent::LifeStageChanged { .. }    => "life_stage_changed",
        SimEvent::SheddingStarted { .. }     => "shedding_started",
        SimEvent::SheddingEnded { .. }       => "shedding_ended",
        SimEvent::StressSpike { .. }         => "stress_spike",
        SimEvent::GeneticsImproved { .. }    => "genetics_improved",
        SimEvent::ParasitesContracted { .. } => "parasites_contracted",
        SimEvent::Fed { .. }                 => "fed",
        SimEvent::Treated { .. }             => "treated",
    }
}

/// Fixed-capacity history. When full, the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    entries:  VecDeque<SimEvent>,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, event: SimEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn extend<I: IntoIterator<Item = SimEvent>>(&mut self, events: I) {
        for event in events {
            self.push(event);
        }
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn capacity(&self) -> usize { self.capacity }
}
