//! Trial driver: runs fresh walks per target length and aggregates end-to-end statistics.

use polywalk_core::{
    IndexKind, LcgSource, UniformSource, Vec3, WalkConfig, WalkError, WalkStatus, WalkVariant,
    derive_seed, seeded_rng,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod moments;
pub mod study;

pub use moments::Moments;
pub use study::{Series, Study, StudyReport, StudySettings, run_study};

/// Errors raised by sweeps.
#[derive(Debug, Error, PartialEq)]
pub enum SweepError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Walk(#[from] WalkError),
    /// The success quota could not be met within the attempt cap.
    #[error(
        "length {length}: only {successes} of {quota} walks succeeded after {attempts} attempts"
    )]
    QuotaUnreachable {
        length: usize,
        successes: u64,
        quota: u64,
        attempts: u64,
    },
}

/// How many walks a length receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Keep drawing walks until `trials_per_length` of them succeed; failures are retried.
    #[default]
    SuccessQuota,
    /// Draw exactly `trials_per_length` walks and count how many finish.
    FixedTrials,
}

/// Parameters of a sweep over target lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub variant: WalkVariant,
    pub self_avoiding: bool,
    /// Let self-avoiding lattice walks propose immediate reversals.
    pub allow_reversal: bool,
    pub index: IndexKind,
    /// Target lengths, reported in this order.
    pub lengths: Vec<usize>,
    /// Success quota or trial count, depending on `mode`.
    pub trials_per_length: u64,
    pub mode: SweepMode,
    /// Upper bound on walks drawn for a single length in quota mode.
    pub max_attempts_per_length: u64,
    /// Optional RNG seed for reproducible sweeps.
    pub seed: Option<u64>,
    /// Spread lengths across the rayon pool.
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            variant: WalkVariant::default(),
            self_avoiding: true,
            allow_reversal: false,
            index: IndexKind::Linear,
            lengths: (1..=15).collect(),
            trials_per_length: 1_000,
            mode: SweepMode::SuccessQuota,
            max_attempts_per_length: 10_000_000,
            seed: None,
            parallel: true,
        }
    }
}

impl SweepConfig {
    /// Walk settings for one target length.
    #[must_use]
    pub fn walk_config(&self, length: usize) -> WalkConfig {
        WalkConfig {
            variant: self.variant,
            length,
            self_avoiding: self.self_avoiding,
            allow_reversal: self.allow_reversal,
            index: self.index,
        }
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.lengths.is_empty() {
            return Err(SweepError::InvalidConfig("lengths must not be empty"));
        }
        if self.trials_per_length == 0 {
            return Err(SweepError::InvalidConfig(
                "trials_per_length must be positive",
            ));
        }
        if self.mode == SweepMode::SuccessQuota
            && self.max_attempts_per_length < self.trials_per_length
        {
            return Err(SweepError::InvalidConfig(
                "max_attempts_per_length cannot be below trials_per_length",
            ));
        }
        for &length in &self.lengths {
            self.walk_config(length).validate()?;
        }
        Ok(())
    }
}

/// Aggregated outcome for one target length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub length: usize,
    /// Walks drawn, successful or not.
    pub attempts: u64,
    pub successes: u64,
    /// `successes / attempts`.
    pub success_fraction: f64,
    /// Root-mean-square end-to-end distance over successful walks.
    pub rmsd: Option<f64>,
    /// Bessel-corrected fluctuation of the end-to-end distance; absent below two samples.
    pub rmsf: Option<f64>,
    /// Standard error estimate, `rmsf / sqrt(successes)`.
    pub see: Option<f64>,
    pub moments: Moments,
}

impl LengthStats {
    fn from_counts(length: usize, attempts: u64, moments: Moments) -> Self {
        let success_fraction = if attempts == 0 {
            0.0
        } else {
            moments.samples as f64 / attempts as f64
        };
        Self {
            length,
            attempts,
            successes: moments.samples,
            success_fraction,
            rmsd: moments.rmsd(),
            rmsf: moments.rmsf(),
            see: moments.see(),
            moments,
        }
    }
}

/// Completed sweep, read-only once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub variant: WalkVariant,
    pub self_avoiding: bool,
    pub allow_reversal: bool,
    pub index: IndexKind,
    pub mode: SweepMode,
    pub trials_per_length: u64,
    /// Base seed actually used (drawn from entropy when none was configured).
    pub seed: u64,
    pub points: Vec<LengthStats>,
}

impl SweepReport {
    /// `(length, success_fraction)` pairs in sweep order.
    #[must_use]
    pub fn success_series(&self) -> Vec<(usize, f64)> {
        self.points
            .iter()
            .map(|p| (p.length, p.success_fraction))
            .collect()
    }

    /// `(length, rmsd)` pairs, skipping lengths without successes.
    #[must_use]
    pub fn rmsd_series(&self) -> Vec<(usize, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.rmsd.map(|v| (p.length, v)))
            .collect()
    }

    /// `(length, rmsf)` pairs, skipping lengths with fewer than two successes.
    #[must_use]
    pub fn rmsf_series(&self) -> Vec<(usize, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.rmsf.map(|v| (p.length, v)))
            .collect()
    }
}

/// Run every length of `config`, each on its own generator derived from the base seed.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepReport, SweepError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        variant = %config.variant.label(),
        self_avoiding = config.self_avoiding,
        mode = ?config.mode,
        lengths = config.lengths.len(),
        trials = config.trials_per_length,
        seed,
        "starting sweep",
    );

    let run = |&length: &usize| {
        let mut rng = seeded_rng(Some(derive_seed(seed, length as u64)));
        run_length(config, length, &mut rng)
    };
    let points = if config.parallel {
        config
            .lengths
            .par_iter()
            .map(run)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        config
            .lengths
            .iter()
            .map(run)
            .collect::<Result<Vec<_>, _>>()?
    };

    info!(
        variant = %config.variant.label(),
        total_attempts = points.iter().map(|p| p.attempts).sum::<u64>(),
        "sweep complete",
    );

    Ok(SweepReport {
        variant: config.variant,
        self_avoiding: config.self_avoiding,
        allow_reversal: config.allow_reversal,
        index: config.index,
        mode: config.mode,
        trials_per_length: config.trials_per_length,
        seed,
        points,
    })
}

/// Drive walks of one length against `source` until the mode's stopping rule is met.
pub fn run_length<S: UniformSource + ?Sized>(
    config: &SweepConfig,
    length: usize,
    source: &mut S,
) -> Result<LengthStats, SweepError> {
    let walk_config = walk_config_checked(config, length)?;
    let quota = config.trials_per_length;
    let mut moments = Moments::default();
    let mut attempts = 0_u64;

    match config.mode {
        SweepMode::SuccessQuota => {
            let cap = config.max_attempts_per_length;
            while moments.samples < quota {
                if attempts >= cap {
                    warn!(
                        length,
                        successes = moments.samples,
                        quota,
                        attempts,
                        "success quota unreachable within attempt cap",
                    );
                    return Err(SweepError::QuotaUnreachable {
                        length,
                        successes: moments.samples,
                        quota,
                        attempts,
                    });
                }
                attempts += 1;
                if attempts == cap / 2 {
                    warn!(
                        length,
                        successes = moments.samples,
                        quota,
                        attempts,
                        "half of the attempt cap spent",
                    );
                }
                let mut walk = walk_config.build()?;
                if walk.run(source) == WalkStatus::Succeeded {
                    moments.record(walk.end_to_end_sq());
                }
            }
        }
        SweepMode::FixedTrials => {
            for _ in 0..quota {
                attempts += 1;
                let mut walk = walk_config.build()?;
                if walk.run(source) == WalkStatus::Succeeded {
                    moments.record(walk.end_to_end_sq());
                }
            }
        }
    }

    let stats = LengthStats::from_counts(length, attempts, moments);
    debug!(
        length,
        attempts,
        successes = stats.successes,
        success_fraction = stats.success_fraction,
        rmsd = ?stats.rmsd,
        "length finished",
    );
    Ok(stats)
}

/// Where the uniforms behind a trace came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceSource {
    Seeded { seed: u64 },
    Lcg(LcgSource),
}

/// A single finished walk kept for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub config: WalkConfig,
    pub source: TraceSource,
    /// Walks drawn before one finished.
    pub attempts: u64,
    pub end_to_end_sq: f64,
    pub points: Vec<Vec3>,
}

/// Draw walks until one finishes and return its path.
pub fn trace_walk(
    config: &WalkConfig,
    seed: Option<u64>,
    max_attempts: u64,
) -> Result<Trace, SweepError> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = seeded_rng(Some(seed));
    first_success(config, &mut rng, max_attempts, TraceSource::Seeded { seed })
}

/// [`trace_walk`] driven by a linear congruential generator instead of the seeded RNG.
pub fn trace_walk_lcg(
    config: &WalkConfig,
    lcg: LcgSource,
    max_attempts: u64,
) -> Result<Trace, SweepError> {
    let mut source = lcg;
    first_success(config, &mut source, max_attempts, TraceSource::Lcg(lcg))
}

fn first_success<S: UniformSource + ?Sized>(
    config: &WalkConfig,
    source: &mut S,
    max_attempts: u64,
    origin: TraceSource,
) -> Result<Trace, SweepError> {
    config.validate()?;
    if max_attempts == 0 {
        return Err(SweepError::InvalidConfig("max_attempts must be positive"));
    }
    for attempt in 1..=max_attempts {
        let mut walk = config.build()?;
        if walk.run(source) == WalkStatus::Succeeded {
            debug!(attempts = attempt, length = config.length, "trace finished");
            return Ok(Trace {
                config: *config,
                source: origin,
                attempts: attempt,
                end_to_end_sq: walk.end_to_end_sq(),
                points: walk.trace(),
            });
        }
    }
    Err(SweepError::QuotaUnreachable {
        length: config.length,
        successes: 0,
        quota: 1,
        attempts: max_attempts,
    })
}

fn walk_config_checked(config: &SweepConfig, length: usize) -> Result<WalkConfig, SweepError> {
    if config.trials_per_length == 0 {
        return Err(SweepError::InvalidConfig(
            "trials_per_length must be positive",
        ));
    }
    let walk_config = config.walk_config(length);
    walk_config.validate()?;
    Ok(walk_config)
}
