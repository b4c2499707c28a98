//! Discrete lattice directions and the samplers that draw steps.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::WalkError;
use crate::source::UniformSource;
use crate::vector::{Dimension, LatticePoint, Vec3};

/// Re-draws spent on the excluded direction before falling back to a direct pick among the rest.
pub const MAX_REDRAWS: usize = 64;

/// Axis-aligned unit move. UP/DOWN act on y, LEFT/RIGHT on x, FRONT/BACK on z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Front,
    Back,
}

use Direction::{Back, Down, Front, Left, Right, Up};

const ANTAGONISTS: [Direction; 6] = [Down, Up, Right, Left, Back, Front];

const OFFSETS: [LatticePoint; 6] = [
    LatticePoint::new(0, 1, 0),
    LatticePoint::new(0, -1, 0),
    LatticePoint::new(-1, 0, 0),
    LatticePoint::new(1, 0, 0),
    LatticePoint::new(0, 0, 1),
    LatticePoint::new(0, 0, -1),
];

impl Direction {
    pub const ALL: [Self; 6] = [Up, Down, Left, Right, Front, Back];
    pub const PLANAR: [Self; 4] = [Up, Down, Left, Right];

    /// The direction exactly opposite this one.
    #[must_use]
    pub const fn antagonist(self) -> Self {
        ANTAGONISTS[self as usize]
    }

    /// Unit lattice displacement for this direction.
    #[must_use]
    pub const fn offset(self) -> LatticePoint {
        OFFSETS[self as usize]
    }

    /// Full direction set for a dimensionality.
    #[must_use]
    pub const fn for_dimension(dimension: Dimension) -> &'static [Self] {
        match dimension {
            Dimension::Two => &Self::PLANAR,
            Dimension::Three => &Self::ALL,
        }
    }
}

fn pick_index(u: f64, count: usize) -> usize {
    ((u * count as f64) as usize).min(count - 1)
}

/// Uniform draw over a discrete direction set with optional single-direction exclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeSampler {
    directions: Vec<Direction>,
}

impl LatticeSampler {
    /// Sampler over the full direction set of `dimension`.
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            directions: Direction::for_dimension(dimension).to_vec(),
        }
    }

    /// Sampler over a custom set. Duplicates are dropped; order of first appearance is kept.
    pub fn with_directions(directions: &[Direction]) -> Result<Self, WalkError> {
        let mut unique = Vec::with_capacity(directions.len());
        for &direction in directions {
            if !unique.contains(&direction) {
                unique.push(direction);
            }
        }
        if unique.is_empty() {
            return Err(WalkError::InvalidConfig("direction set must not be empty"));
        }
        Ok(Self { directions: unique })
    }

    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Draw a direction, never returning `exclude` when another choice exists.
    pub fn sample<S: UniformSource + ?Sized>(
        &self,
        source: &mut S,
        exclude: Option<Direction>,
    ) -> Direction {
        let count = self.directions.len();
        let first = self.directions[pick_index(source.next_uniform(), count)];
        let Some(excluded) = exclude else {
            return first;
        };
        if first != excluded {
            return first;
        }
        for _ in 0..MAX_REDRAWS {
            let candidate = self.directions[pick_index(source.next_uniform(), count)];
            if candidate != excluded {
                return candidate;
            }
        }

        let mut remaining = [Up; 6];
        let mut len = 0;
        for &direction in &self.directions {
            if direction != excluded {
                remaining[len] = direction;
                len += 1;
            }
        }
        if len == 0 {
            return first;
        }
        remaining[pick_index(source.next_uniform(), len)]
    }
}

/// Uniform unit vectors on the circle (2D) or sphere (3D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuumSampler {
    dimension: Dimension,
}

impl ContinuumSampler {
    #[must_use]
    pub const fn new(dimension: Dimension) -> Self {
        Self { dimension }
    }

    /// Azimuth first, then (3D only) the z component uniform in [-1, 1].
    pub fn sample<S: UniformSource + ?Sized>(&self, source: &mut S) -> Vec3 {
        let theta = source.next_uniform() * TAU;
        match self.dimension {
            Dimension::Two => Vec3::planar(theta.cos(), theta.sin()),
            Dimension::Three => {
                let z = source.next_uniform() * 2.0 - 1.0;
                let rho = (1.0 - z * z).max(0.0).sqrt();
                Vec3::new(rho * theta.cos(), rho * theta.sin(), z)
            }
        }
    }
}
