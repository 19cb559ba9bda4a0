//! Simulation clock, plus the monotonic clock seam used by hosts.

use crate::types::{Timestamp, MS_PER_HOUR};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub now_ms:       Timestamp,
    pub ticks_run:    u64,
}

impl SimClock {
    pub fn new(start_ms: Timestamp) -> Self {
        Self { now_ms: start_ms, ticks_run: 0 }
    }

    /// Advance by `elapsed_ms`. Returns the new clock value.
    pub fn advance(&mut self, elapsed_ms: Timestamp) -> Timestamp {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        self.ticks_run += 1;
        self.now_ms
    }

    /// Hour of the simulated day, 0..24.
    pub fn hour_of_day(&self) -> u32 {
        ((self.now_ms / MS_PER_HOUR) % 24) as u32
    }
}

/// Monotonic millisecond source. Owned by the host, never by the engine.
pub trait ClockSource {
    fn now_ms(&self) -> Timestamp;
}

/// Wall-time source backed by `Instant`, zeroed at construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self { Self::new() }
}

impl ClockSource for SystemClock {
    fn now_ms(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: std::cell::Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start_ms: Timestamp) -> Self {
        Self { now: std::cell::Cell::new(start_ms) }
    }

    pub fn advance(&self, ms: Timestamp) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> Timestamp { self.now.get() }
}
