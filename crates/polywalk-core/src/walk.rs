//! Incremental walkers: lattice walks with exact occupancy and continuum walks with sphere exclusion.

use polywalk_index::{AnyIndex, ExclusionIndex, IndexKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::WalkError;
use crate::direction::{ContinuumSampler, Direction, LatticeSampler};
use crate::source::UniformSource;
use crate::vector::{Coordinate, Dimension, LatticePoint, Vec3};

/// Lifecycle of a walk. Walks are in progress from construction; the other two states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    InProgress,
    Succeeded,
    Failed,
}

impl WalkStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Outcome of a single `step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Continue,
    Succeeded,
    Failed,
}

impl From<WalkStatus> for StepResult {
    fn from(status: WalkStatus) -> Self {
        match status {
            WalkStatus::InProgress => Self::Continue,
            WalkStatus::Succeeded => Self::Succeeded,
            WalkStatus::Failed => Self::Failed,
        }
    }
}

/// Shared interface of every walker.
pub trait Walk {
    type Position: Coordinate;

    /// Propose and (if allowed) accept one step. Terminal walks return their final result unchanged.
    fn step<S: UniformSource + ?Sized>(&mut self, source: &mut S) -> StepResult;

    fn status(&self) -> WalkStatus;

    /// Accepted path, origin first.
    fn path(&self) -> &[Self::Position];

    /// Accepted steps so far.
    fn steps_taken(&self) -> usize {
        self.path().len() - 1
    }

    /// Current end point.
    fn position(&self) -> Self::Position {
        self.path()[self.path().len() - 1]
    }

    /// Squared end-to-end distance.
    fn end_to_end_sq(&self) -> f64 {
        self.position().norm_sq()
    }

    /// Drive the walk until it reaches a terminal state.
    fn run<S: UniformSource + ?Sized>(&mut self, source: &mut S) -> WalkStatus {
        while self.step(source) == StepResult::Continue {}
        self.status()
    }
}

fn check_length(length: usize) -> Result<(), WalkError> {
    if length == 0 {
        return Err(WalkError::InvalidConfig("length must be positive"));
    }
    Ok(())
}

/// Unit steps along lattice axes.
///
/// When self-avoiding, the walk fails as soon as a proposal lands on an occupied site. By default a
/// step also never reverses the previous one; [`LatticeWalk::allowing_reversal`] turns that off so an
/// immediate fold-back is proposed, and fails, like any other revisit.
#[derive(Debug, Clone)]
pub struct LatticeWalk {
    sampler: LatticeSampler,
    length: usize,
    self_avoiding: bool,
    allow_reversal: bool,
    occupied: HashSet<LatticePoint>,
    path: Vec<LatticePoint>,
    moves: Vec<Direction>,
    status: WalkStatus,
}

impl LatticeWalk {
    pub fn new(dimension: Dimension, length: usize, self_avoiding: bool) -> Result<Self, WalkError> {
        Self::with_sampler(LatticeSampler::new(dimension), length, self_avoiding)
    }

    pub fn with_sampler(
        sampler: LatticeSampler,
        length: usize,
        self_avoiding: bool,
    ) -> Result<Self, WalkError> {
        check_length(length)?;
        let mut occupied = HashSet::new();
        if self_avoiding {
            occupied.reserve(length + 1);
            occupied.insert(LatticePoint::ORIGIN);
        }
        let mut path = Vec::with_capacity(length + 1);
        path.push(LatticePoint::ORIGIN);
        Ok(Self {
            sampler,
            length,
            self_avoiding,
            allow_reversal: false,
            occupied,
            path,
            moves: Vec::with_capacity(length),
            status: WalkStatus::InProgress,
        })
    }

    /// Directions of the accepted steps, in order.
    #[must_use]
    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    /// Draw from the full direction set on every step, reversals included.
    #[must_use]
    pub const fn allowing_reversal(mut self, allow: bool) -> Self {
        self.allow_reversal = allow;
        self
    }

    /// Size of the occupancy registry; equals the path length for self-avoiding walks.
    #[must_use]
    pub fn registry_len(&self) -> usize {
        if self.self_avoiding {
            self.occupied.len()
        } else {
            self.path.len()
        }
    }
}

impl Walk for LatticeWalk {
    type Position = LatticePoint;

    fn step<S: UniformSource + ?Sized>(&mut self, source: &mut S) -> StepResult {
        if self.status.is_terminal() {
            return self.status.into();
        }

        let exclude = if self.self_avoiding && !self.allow_reversal {
            self.moves.last().map(|last| last.antagonist())
        } else {
            None
        };
        let direction = self.sampler.sample(source, exclude);
        let candidate = self.position() + direction.offset();

        if self.self_avoiding && !self.occupied.insert(candidate) {
            self.status = WalkStatus::Failed;
            return StepResult::Failed;
        }

        self.path.push(candidate);
        self.moves.push(direction);
        if self.moves.len() == self.length {
            self.status = WalkStatus::Succeeded;
        }
        self.status.into()
    }

    fn status(&self) -> WalkStatus {
        self.status
    }

    fn path(&self) -> &[LatticePoint] {
        &self.path
    }
}

/// Unit steps in uniformly random directions.
///
/// When self-avoiding, each monomer is a sphere of radius `r`; a proposal closer than `2r` to any
/// accepted point fails the walk. The first step cannot collide and is not checked.
#[derive(Debug, Clone)]
pub struct ContinuumWalk {
    sampler: ContinuumSampler,
    length: usize,
    exclusion_sq: f64,
    index: Option<AnyIndex>,
    path: Vec<Vec3>,
    status: WalkStatus,
}

impl ContinuumWalk {
    /// Free walk with no exclusion.
    pub fn free(dimension: Dimension, length: usize) -> Result<Self, WalkError> {
        check_length(length)?;
        Ok(Self::assemble(dimension, length, 0.0, None))
    }

    /// Self-avoiding walk of spheres with the given radius, checked by a linear scan.
    pub fn self_avoiding(dimension: Dimension, length: usize, radius: f64) -> Result<Self, WalkError> {
        Self::self_avoiding_with_index(dimension, length, radius, IndexKind::Linear)
    }

    pub fn self_avoiding_with_index(
        dimension: Dimension,
        length: usize,
        radius: f64,
        kind: IndexKind,
    ) -> Result<Self, WalkError> {
        check_length(length)?;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(WalkError::InvalidConfig("radius must be positive and finite"));
        }
        let mut index = kind.build(2.0 * radius, length + 1)?;
        index.insert(Vec3::ORIGIN.to_array());
        Ok(Self::assemble(dimension, length, 2.0 * radius, Some(index)))
    }

    fn assemble(
        dimension: Dimension,
        length: usize,
        diameter: f64,
        index: Option<AnyIndex>,
    ) -> Self {
        let mut path = Vec::with_capacity(length + 1);
        path.push(Vec3::ORIGIN);
        Self {
            sampler: ContinuumSampler::new(dimension),
            length,
            exclusion_sq: diameter * diameter,
            index,
            path,
            status: WalkStatus::InProgress,
        }
    }

    /// Points held by the exclusion index (equal to the path length for self-avoiding walks).
    #[must_use]
    pub fn registry_len(&self) -> usize {
        self.index
            .as_ref()
            .map_or(self.path.len(), |index| index.len())
    }
}

impl Walk for ContinuumWalk {
    type Position = Vec3;

    fn step<S: UniformSource + ?Sized>(&mut self, source: &mut S) -> StepResult {
        if self.status.is_terminal() {
            return self.status.into();
        }

        let candidate = self.position() + self.sampler.sample(source);
        let first_step = self.path.len() == 1;

        if let Some(index) = self.index.as_mut() {
            if !first_step && index.collides(candidate.to_array(), self.exclusion_sq) {
                self.status = WalkStatus::Failed;
                return StepResult::Failed;
            }
            index.insert(candidate.to_array());
        }

        self.path.push(candidate);
        if self.path.len() - 1 == self.length {
            self.status = WalkStatus::Succeeded;
        }
        self.status.into()
    }

    fn status(&self) -> WalkStatus {
        self.status
    }

    fn path(&self) -> &[Vec3] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ScriptedSource, seeded_rng};

    #[test]
    fn zero_length_is_rejected() {
        assert_eq!(
            LatticeWalk::new(Dimension::Three, 0, true).unwrap_err(),
            WalkError::InvalidConfig("length must be positive")
        );
        assert!(ContinuumWalk::free(Dimension::Two, 0).is_err());
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        for radius in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert_eq!(
                ContinuumWalk::self_avoiding(Dimension::Three, 4, radius).unwrap_err(),
                WalkError::InvalidConfig("radius must be positive and finite")
            );
        }
    }

    #[test]
    fn single_lattice_step_always_succeeds() {
        let mut rng = seeded_rng(Some(1));
        for _ in 0..200 {
            let mut walk = LatticeWalk::new(Dimension::Three, 1, true).expect("walk");
            assert_eq!(walk.step(&mut rng), StepResult::Succeeded);
            assert_eq!(walk.registry_len(), 2);
            assert_eq!(walk.end_to_end_sq(), 1.0);
        }
    }

    #[test]
    fn terminal_walks_ignore_further_steps() {
        let mut source = ScriptedSource::new([0.0]).expect("source");
        let mut walk = LatticeWalk::new(Dimension::Two, 1, true).expect("walk");
        assert_eq!(walk.run(&mut source), WalkStatus::Succeeded);
        let draws = source.draws();
        assert_eq!(walk.step(&mut source), StepResult::Succeeded);
        assert_eq!(source.draws(), draws);
        assert_eq!(walk.path().len(), 2);
    }

    #[test]
    fn lattice_collision_leaves_state_untouched() {
        // RIGHT, UP, LEFT, then DOWN lands back on the origin.
        let sampler = LatticeSampler::new(Dimension::Two);
        let mut source = ScriptedSource::new([0.8, 0.0, 0.6, 0.3]).expect("source");
        let mut walk = LatticeWalk::with_sampler(sampler, 10, true).expect("walk");
        assert_eq!(walk.step(&mut source), StepResult::Continue);
        assert_eq!(walk.step(&mut source), StepResult::Continue);
        assert_eq!(walk.step(&mut source), StepResult::Continue);
        assert_eq!(walk.position(), LatticePoint::new(0, 1, 0));
        assert_eq!(walk.step(&mut source), StepResult::Failed);
        assert_eq!(walk.status(), WalkStatus::Failed);
        assert_eq!(walk.position(), LatticePoint::new(0, 1, 0));
        assert_eq!(walk.registry_len(), 4);
        assert_eq!(walk.steps_taken(), 3);
    }

    #[test]
    fn plain_lattice_walk_fails_on_fold_back() {
        // UP then DOWN: the plain walk proposes the reversal and lands on the origin.
        let script = [0.0, 0.3];
        let mut plain = LatticeWalk::new(Dimension::Two, 5, true)
            .expect("walk")
            .allowing_reversal(true);
        let mut source = ScriptedSource::new(script).expect("source");
        assert_eq!(plain.run(&mut source), WalkStatus::Failed);
        assert_eq!(plain.steps_taken(), 1);
        assert_eq!(source.draws(), 2);

        // The default walk re-draws DOWN and keeps going.
        let mut guarded = LatticeWalk::new(Dimension::Two, 2, true).expect("walk");
        let mut source = ScriptedSource::new(script).expect("source");
        assert_eq!(guarded.run(&mut source), WalkStatus::Succeeded);
        assert_eq!(guarded.moves(), &[Direction::Up, Direction::Up]);
    }

    #[test]
    fn free_lattice_walk_may_revisit() {
        // RIGHT then LEFT: allowed without avoidance.
        let mut source = ScriptedSource::new([0.8, 0.6]).expect("source");
        let mut walk = LatticeWalk::new(Dimension::Two, 2, false).expect("walk");
        assert_eq!(walk.run(&mut source), WalkStatus::Succeeded);
        assert_eq!(walk.position(), LatticePoint::ORIGIN);
        assert_eq!(walk.registry_len(), 3);
    }

    #[test]
    fn straight_continuum_walk_succeeds() {
        let mut source = ScriptedSource::new([0.0]).expect("source");
        let mut walk = ContinuumWalk::self_avoiding(Dimension::Two, 2, 0.5).expect("walk");
        assert_eq!(walk.run(&mut source), WalkStatus::Succeeded);
        assert_eq!(walk.position(), Vec3::planar(2.0, 0.0));
        assert_eq!(walk.end_to_end_sq(), 4.0);
        assert_eq!(walk.registry_len(), 3);
    }

    #[test]
    fn continuum_fold_back_fails_without_moving() {
        // theta = 0 then theta = pi puts the second monomer on the origin.
        let mut source = ScriptedSource::new([0.0, 0.5]).expect("source");
        let mut walk = ContinuumWalk::self_avoiding(Dimension::Two, 5, 0.1).expect("walk");
        assert_eq!(walk.step(&mut source), StepResult::Continue);
        assert_eq!(walk.step(&mut source), StepResult::Failed);
        assert_eq!(walk.position(), Vec3::planar(1.0, 0.0));
        assert_eq!(walk.registry_len(), 2);
    }

    #[test]
    fn first_continuum_step_is_never_checked() {
        // Diameter 3 would reject any step from the origin.
        let mut source = ScriptedSource::new([0.25]).expect("source");
        let mut walk = ContinuumWalk::self_avoiding(Dimension::Two, 1, 1.5).expect("walk");
        assert_eq!(walk.step(&mut source), StepResult::Succeeded);
    }

    #[test]
    fn exclusion_uses_diameter_not_radius() {
        // Turns of 100 degrees bring the third point about 0.653 from the origin.
        let script = [0.0, 100.0 / 360.0, 200.0 / 360.0];

        let mut tight = ContinuumWalk::self_avoiding(Dimension::Two, 3, 0.4).expect("walk");
        let mut source = ScriptedSource::new(script).expect("source");
        assert_eq!(tight.run(&mut source), WalkStatus::Failed);
        assert_eq!(tight.steps_taken(), 2);

        let mut loose = ContinuumWalk::self_avoiding(Dimension::Two, 3, 0.3).expect("walk");
        let mut source = ScriptedSource::new(script).expect("source");
        assert_eq!(loose.run(&mut source), WalkStatus::Succeeded);
    }

    #[test]
    fn bond_length_counts_against_large_spheres() {
        // Neighbouring monomers sit exactly 1 apart, so r > 0.5 cannot get past the second step.
        let mut source = ScriptedSource::new([0.0, 0.25]).expect("source");
        let mut walk = ContinuumWalk::self_avoiding(Dimension::Two, 2, 0.6).expect("walk");
        assert_eq!(walk.run(&mut source), WalkStatus::Failed);

        let mut source = ScriptedSource::new([0.0, 0.25]).expect("source");
        let mut walk = ContinuumWalk::self_avoiding(Dimension::Two, 2, 0.5).expect("walk");
        assert_eq!(walk.run(&mut source), WalkStatus::Succeeded);
    }

    #[test]
    fn grid_and_linear_indices_trace_identical_paths() {
        for seed in 0..20 {
            let mut rng_a = seeded_rng(Some(seed));
            let mut rng_b = seeded_rng(Some(seed));
            let mut linear = ContinuumWalk::self_avoiding(Dimension::Three, 60, 0.3).expect("linear");
            let mut grid =
                ContinuumWalk::self_avoiding_with_index(Dimension::Three, 60, 0.3, IndexKind::Grid)
                    .expect("grid");
            assert_eq!(linear.run(&mut rng_a), grid.run(&mut rng_b));
            assert_eq!(linear.path(), grid.path());
        }
    }

    #[test]
    fn grid_handles_vanishing_radius() {
        for seed in 0..5 {
            let mut rng_a = seeded_rng(Some(seed));
            let mut rng_b = seeded_rng(Some(seed));
            let mut linear = ContinuumWalk::self_avoiding(Dimension::Three, 40, 1e-20).expect("linear");
            let mut grid =
                ContinuumWalk::self_avoiding_with_index(Dimension::Three, 40, 1e-20, IndexKind::Grid)
                    .expect("grid");
            assert_eq!(linear.run(&mut rng_a), WalkStatus::Succeeded);
            assert_eq!(grid.run(&mut rng_b), WalkStatus::Succeeded);
            assert_eq!(linear.path(), grid.path());
        }
    }
}
