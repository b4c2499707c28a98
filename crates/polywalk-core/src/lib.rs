//! Core types for lattice and continuum random walks, self-avoiding or free.

use polywalk_index::IndexError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod direction;
pub mod source;
pub mod vector;
pub mod walk;

pub use polywalk_index::IndexKind;

pub use direction::{ContinuumSampler, Direction, LatticeSampler, MAX_REDRAWS};
pub use source::{LcgSource, ScriptedSource, UniformSource, derive_seed, seeded_rng};
pub use vector::{Coordinate, Dimension, LatticePoint, Vec3};
pub use walk::{ContinuumWalk, LatticeWalk, StepResult, Walk, WalkStatus};

/// Errors raised while configuring walks.
#[derive(Debug, Error, PartialEq)]
pub enum WalkError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Geometry of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "geometry", rename_all = "snake_case")]
pub enum WalkVariant {
    /// Unit steps along lattice axes.
    Lattice { dimension: Dimension },
    /// Unit steps in continuous directions; `radius` is the monomer sphere radius.
    Continuum { dimension: Dimension, radius: f64 },
}

impl WalkVariant {
    /// Short human-readable label, e.g. `lattice-3d` or `continuum-2d-r0.2`.
    #[must_use]
    pub fn label(&self) -> String {
        match *self {
            Self::Lattice { dimension } => format!("lattice-{dimension}"),
            Self::Continuum { dimension, radius } => format!("continuum-{dimension}-r{radius}"),
        }
    }
}

impl Default for WalkVariant {
    fn default() -> Self {
        Self::Lattice {
            dimension: Dimension::Three,
        }
    }
}

/// Everything needed to build one walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    pub variant: WalkVariant,
    /// Target number of steps.
    pub length: usize,
    /// Free walks skip every occupancy check.
    pub self_avoiding: bool,
    /// Self-avoiding lattice walks only: propose immediate reversals instead of excluding them.
    #[serde(default)]
    pub allow_reversal: bool,
    /// Exclusion index for self-avoiding continuum walks.
    #[serde(default)]
    pub index: IndexKind,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            variant: WalkVariant::default(),
            length: 10,
            self_avoiding: true,
            allow_reversal: false,
            index: IndexKind::Linear,
        }
    }
}

impl WalkConfig {
    #[must_use]
    pub fn new(variant: WalkVariant, length: usize, self_avoiding: bool) -> Self {
        Self {
            variant,
            length,
            self_avoiding,
            allow_reversal: false,
            index: IndexKind::Linear,
        }
    }

    /// Checks parameters without allocating a walk.
    pub fn validate(&self) -> Result<(), WalkError> {
        if self.length == 0 {
            return Err(WalkError::InvalidConfig("length must be positive"));
        }
        if let WalkVariant::Continuum { radius, .. } = self.variant {
            if self.self_avoiding && !(radius.is_finite() && radius > 0.0) {
                return Err(WalkError::InvalidConfig("radius must be positive and finite"));
            }
        }
        Ok(())
    }

    /// Allocate a fresh walk in progress at the origin.
    pub fn build(&self) -> Result<AnyWalk, WalkError> {
        let walk = match self.variant {
            WalkVariant::Lattice { dimension } => {
                AnyWalk::Lattice(
                    LatticeWalk::new(dimension, self.length, self.self_avoiding)?
                        .allowing_reversal(self.allow_reversal),
                )
            }
            WalkVariant::Continuum { dimension, radius } if self.self_avoiding => {
                AnyWalk::Continuum(ContinuumWalk::self_avoiding_with_index(
                    dimension,
                    self.length,
                    radius,
                    self.index,
                )?)
            }
            WalkVariant::Continuum { dimension, .. } => {
                AnyWalk::Continuum(ContinuumWalk::free(dimension, self.length)?)
            }
        };
        Ok(walk)
    }
}

/// A walk of either geometry, for callers that pick the variant at runtime.
#[derive(Debug, Clone)]
pub enum AnyWalk {
    Lattice(LatticeWalk),
    Continuum(ContinuumWalk),
}

impl AnyWalk {
    pub fn run<S: UniformSource + ?Sized>(&mut self, source: &mut S) -> WalkStatus {
        match self {
            Self::Lattice(walk) => walk.run(source),
            Self::Continuum(walk) => walk.run(source),
        }
    }

    #[must_use]
    pub fn end_to_end_sq(&self) -> f64 {
        match self {
            Self::Lattice(walk) => walk.end_to_end_sq(),
            Self::Continuum(walk) => walk.end_to_end_sq(),
        }
    }

    /// Accepted path as real coordinates.
    #[must_use]
    pub fn trace(&self) -> Vec<Vec3> {
        match self {
            Self::Lattice(walk) => walk.path().iter().copied().map(Vec3::from).collect(),
            Self::Continuum(walk) => walk.path().to_vec(),
        }
    }
}
