//! Random number generation.
//!
//! RULE: Nothing in the simulation may call a platform RNG.
//! The engine draws only through a `RandomSource` it was handed at
//! construction. `SimRng` is the shipped source: a PCG stream seeded
//! from (seed XOR stream index), so separate streams never overlap and
//! a run is reproducible from its seed.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Bounded random integer source consumed by the engine.
pub trait RandomSource {
    /// Uniform integer in [0, n). `n` must be > 0.
    fn next_below(&mut self, n: u32) -> u32;
}

/// Stable stream assignments. Append only: reordering changes every seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    Engine = 0,
}

impl RngStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Engine => "engine",
        }
    }
}

/// Deterministic PCG-backed source.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(seed: u64, stream: RngStream) -> Self {
        let derived_seed = seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name:  stream.name(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

impl RandomSource for SimRng {
    fn next_below(&mut self, n: u32) -> u32 {
        assert!(n > 0, "n must be > 0");
        (self.inner.next_u64() % n as u64) as u32
    }
}
