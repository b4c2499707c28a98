//! Coordinate primitives shared by lattice and continuum walks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Spatial dimensionality of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimension {
    Two,
    #[default]
    Three,
}

impl Dimension {
    /// Number of spatial axes.
    #[must_use]
    pub const fn axes(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl TryFrom<u8> for Dimension {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("unsupported dimension {other}; expected 2 or 3")),
        }
    }
}

impl From<Dimension> for u8 {
    fn from(value: Dimension) -> Self {
        value.axes() as u8
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.axes())
    }
}

/// Something with a squared distance from the origin.
pub trait Coordinate: Copy {
    /// Squared Euclidean norm.
    fn norm_sq(&self) -> f64;
}

/// Exact integer lattice site. Planar walks keep `z == 0`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct LatticePoint {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl LatticePoint {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Squared distance to another site, exact.
    #[must_use]
    pub const fn distance_sq_to(self, other: Self) -> i64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

impl Coordinate for LatticePoint {
    fn norm_sq(&self) -> f64 {
        self.distance_sq_to(Self::ORIGIN) as f64
    }
}

impl Add for LatticePoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Real-valued position or displacement.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[must_use]
    pub fn distance_sq_to(self, other: Self) -> f64 {
        (self - other).norm_sq()
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Coordinate for Vec3 {
    fn norm_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
}

impl From<LatticePoint> for Vec3 {
    fn from(point: LatticePoint) -> Self {
        Self::new(point.x as f64, point.y as f64, point.z as f64)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_points_hash_by_value() {
        let mut seen = std::collections::HashSet::new();
        seen.insert(LatticePoint::new(1, -2, 3));
        assert!(seen.contains(&(LatticePoint::new(1, -2, 0) + LatticePoint::new(0, 0, 3))));
        assert!(!seen.contains(&LatticePoint::ORIGIN));
    }

    #[test]
    fn norms_agree_across_representations() {
        let lattice = LatticePoint::new(2, -3, 6);
        assert_eq!(lattice.norm_sq(), 49.0);
        assert_eq!(Vec3::from(lattice).norm_sq(), 49.0);
        assert_eq!(Vec3::planar(3.0, 4.0).distance_sq_to(Vec3::ORIGIN), 25.0);
    }

    #[test]
    fn dimension_round_trips_through_integers() {
        assert_eq!(Dimension::try_from(2), Ok(Dimension::Two));
        assert!(Dimension::try_from(4).is_err());
        let json = serde_json::to_string(&Dimension::Three).expect("serialize");
        assert_eq!(json, "3");
        assert_eq!(Dimension::Two.to_string(), "2d");
    }
}
