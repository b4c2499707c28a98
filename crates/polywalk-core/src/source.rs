//! Injectable uniform random sources.

use rand::{Rng, RngCore, SeedableRng, rngs::SmallRng};
use serde::Serialize;

use crate::WalkError;

/// Producer of uniform reals in `[0, 1)`; every sampler draws through this.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed list of uniforms, cycling when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
    draws: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Result<Self, WalkError> {
        let values = values.into();
        if values.is_empty() {
            return Err(WalkError::InvalidConfig(
                "scripted source needs at least one value",
            ));
        }
        if values.iter().any(|v| !(0.0..1.0).contains(v)) {
            return Err(WalkError::InvalidConfig(
                "scripted values must lie in [0, 1)",
            ));
        }
        Ok(Self {
            values,
            cursor: 0,
            draws: 0,
        })
    }

    /// Total values handed out so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.draws
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        self.draws += 1;
        value
    }
}

/// Linear congruential generator `r <- (a*r + c) mod m`, yielding `r / m`.
///
/// Small moduli have short periods, which shows up as visible structure in walks driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LcgSource {
    pub r0: i64,
    pub a: i64,
    pub c: i64,
    pub m: i64,
    #[serde(skip)]
    state: i64,
}

impl LcgSource {
    pub fn new(r0: i64, a: i64, c: i64, m: i64) -> Result<Self, WalkError> {
        if m <= 0 {
            return Err(WalkError::InvalidConfig("lcg modulus must be positive"));
        }
        Ok(Self {
            r0,
            a,
            c,
            m,
            state: r0,
        })
    }
}

impl Default for LcgSource {
    fn default() -> Self {
        Self {
            r0: 1,
            a: 3,
            c: 4,
            m: 128,
            state: 1,
        }
    }
}

impl UniformSource for LcgSource {
    fn next_uniform(&mut self) -> f64 {
        let next = (i128::from(self.a) * i128::from(self.state) + i128::from(self.c))
            .rem_euclid(i128::from(self.m));
        // rem_euclid keeps the value in [0, m), which fits back into i64.
        self.state = next as i64;
        self.state as f64 / self.m as f64
    }
}

/// splitmix64 finalizer; decorrelates per-stream seeds derived from one base seed.
#[must_use]
pub const fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut z = base
        .wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seeded generator, or one seeded from entropy when `seed` is absent.
#[must_use]
pub fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => {
            let seed: u64 = rand::random();
            SmallRng::seed_from_u64(seed)
        }
    }
}
