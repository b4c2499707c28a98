//! Proximity indices answering "is any stored point too close?" for continuum walks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Plain coordinate triple; planar walks keep `z` at zero.
pub type Point3 = [f64; 3];

/// Errors emitted by index implementations.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// Indicates configuration values that cannot be used (e.g., non-positive cell size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn distance_sq(a: Point3, b: Point3) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Common behaviour exposed by exclusion indices.
pub trait ExclusionIndex {
    /// Record an accepted point.
    fn insert(&mut self, point: Point3);

    /// Number of recorded points.
    fn len(&self) -> usize;

    /// True when any recorded point lies strictly closer than `sqrt(threshold_sq)` to `candidate`.
    fn collides(&self, candidate: Point3, threshold_sq: f64) -> bool;
}

/// Reference index: scans every recorded point.
#[derive(Debug, Clone, Default)]
pub struct LinearScan {
    points: Vec<Point3>,
}

impl LinearScan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the backing storage for a walk of known length.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }
}

impl ExclusionIndex for LinearScan {
    fn insert(&mut self, point: Point3) {
        self.points.push(point);
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn collides(&self, candidate: Point3, threshold_sq: f64) -> bool {
        self.points
            .iter()
            .any(|&other| distance_sq(candidate, other) < threshold_sq)
    }
}

/// Uniform hash grid bucketing points by cell; queries visit only the cells within reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformGridIndex {
    /// Edge length of each grid cell.
    pub cell_size: f64,
    #[serde(skip)]
    cells: HashMap<[i64; 3], Vec<Point3>>,
    #[serde(skip)]
    len: usize,
}

impl UniformGridIndex {
    /// Create a new grid with the provided cell size.
    pub fn new(cell_size: f64) -> Result<Self, IndexError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(IndexError::InvalidConfig("cell_size must be positive and finite"));
        }
        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        })
    }

    /// Cell key of `point`. Coordinates far beyond the cell size saturate at the `i64` range; the
    /// clamp is monotone, so neighbouring points still land in neighbouring keys.
    fn cell_of(&self, point: Point3) -> [i64; 3] {
        [
            (point[0] / self.cell_size).floor() as i64,
            (point[1] / self.cell_size).floor() as i64,
            (point[2] / self.cell_size).floor() as i64,
        ]
    }
}

impl ExclusionIndex for UniformGridIndex {
    fn insert(&mut self, point: Point3) {
        let key = self.cell_of(point);
        self.cells.entry(key).or_default().push(point);
        self.len += 1;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn collides(&self, candidate: Point3, threshold_sq: f64) -> bool {
        if threshold_sq <= 0.0 || self.len == 0 {
            return false;
        }
        let hits = |bucket: &Vec<Point3>| {
            bucket
                .iter()
                .any(|&other| distance_sq(candidate, other) < threshold_sq)
        };

        let reach = (threshold_sq.sqrt() / self.cell_size).ceil().max(1.0);
        let span = 2.0 * reach + 1.0;
        if span * span * span >= self.cells.len() as f64 {
            return self.cells.values().any(&hits);
        }

        let reach = reach as i64;
        let [cx, cy, cz] = self.cell_of(candidate);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let key = [
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    ];
                    if self.cells.get(&key).is_some_and(&hits) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Selects which index backs a continuum walk.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    #[default]
    Linear,
    Grid,
}

impl IndexKind {
    /// Build an index whose grid cells (if any) match the exclusion diameter.
    pub fn build(self, exclusion_diameter: f64, capacity: usize) -> Result<AnyIndex, IndexError> {
        match self {
            Self::Linear => Ok(AnyIndex::Linear(LinearScan::with_capacity(capacity))),
            Self::Grid => UniformGridIndex::new(exclusion_diameter).map(AnyIndex::Grid),
        }
    }
}

/// Statically dispatched union of the available indices.
#[derive(Debug, Clone)]
pub enum AnyIndex {
    Linear(LinearScan),
    Grid(UniformGridIndex),
}

impl ExclusionIndex for AnyIndex {
    fn insert(&mut self, point: Point3) {
        match self {
            Self::Linear(index) => index.insert(point),
            Self::Grid(index) => index.insert(point),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Linear(index) => index.len(),
            Self::Grid(index) => index.len(),
        }
    }

    fn collides(&self, candidate: Point3, threshold_sq: f64) -> bool {
        match self {
            Self::Linear(index) => index.collides(candidate, threshold_sq),
            Self::Grid(index) => index.collides(candidate, threshold_sq),
        }
    }
}
