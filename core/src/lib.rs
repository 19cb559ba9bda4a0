//! Reptile keeper simulation core.
//!
//! A tick-driven model of captive reptiles (physiology, behavior, growth,
//! health) plus an integrity-checked, versioned save format on top of a
//! small key-value store seam. Rendering, input and scheduling live in
//! the host; see the `keeper-runner` binary.

pub mod behavior;
pub mod breeding;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod growth;
pub mod health;
pub mod reptile;
pub mod rng;
pub mod save;
pub mod snapshot;
pub mod species;
pub mod store;
pub mod types;
