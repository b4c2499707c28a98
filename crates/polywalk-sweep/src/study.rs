//! Multi-series studies assembled from sweeps.

use polywalk_core::{Dimension, IndexKind, WalkVariant, derive_seed};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{SweepConfig, SweepError, SweepMode, SweepReport, run_sweep};

/// Settings shared by every series of a study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudySettings {
    pub lengths: Vec<usize>,
    pub trials_per_length: u64,
    pub max_attempts_per_length: u64,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub index: IndexKind,
}

impl Default for StudySettings {
    fn default() -> Self {
        let sweep = SweepConfig::default();
        Self {
            lengths: sweep.lengths,
            trials_per_length: sweep.trials_per_length,
            max_attempts_per_length: sweep.max_attempts_per_length,
            seed: None,
            parallel: sweep.parallel,
            index: sweep.index,
        }
    }
}

/// The polymer experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "study", rename_all = "snake_case")]
pub enum Study {
    /// RMSD and RMSF against length for one walk type over a fixed number of trials.
    Rmsd {
        variant: WalkVariant,
        self_avoiding: bool,
        #[serde(default)]
        allow_reversal: bool,
    },
    /// Fraction of self-avoiding continuum walks that finish, one series per sphere radius.
    Fraction { dimension: Dimension, radii: Vec<f64> },
    /// Fraction of self-avoiding lattice walks that finish, with and without immediate reversals.
    LatticeFraction { dimension: Dimension },
    /// Free and self-avoiding lattice and continuum walks side by side.
    Compare { dimension: Dimension, radius: f64 },
    /// RMSD of successful self-avoiding continuum walks, one series per sphere radius.
    Radii { dimension: Dimension, radii: Vec<f64> },
}

impl Study {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rmsd { .. } => "rmsd",
            Self::Fraction { .. } => "fraction",
            Self::LatticeFraction { .. } => "lattice_fraction",
            Self::Compare { .. } => "compare",
            Self::Radii { .. } => "radii",
        }
    }

    /// Labelled sweeps making up the study, without seeds.
    #[must_use]
    pub fn sweeps(&self, settings: &StudySettings) -> Vec<(String, SweepConfig)> {
        let base = SweepConfig {
            lengths: settings.lengths.clone(),
            trials_per_length: settings.trials_per_length,
            max_attempts_per_length: settings.max_attempts_per_length,
            parallel: settings.parallel,
            index: settings.index,
            seed: None,
            ..SweepConfig::default()
        };
        let saw_continuum = |dimension: Dimension, radius: f64, mode: SweepMode| SweepConfig {
            variant: WalkVariant::Continuum { dimension, radius },
            self_avoiding: true,
            mode,
            ..base.clone()
        };

        match self {
            Self::Rmsd {
                variant,
                self_avoiding,
                allow_reversal,
            } => vec![(
                variant.label(),
                SweepConfig {
                    variant: *variant,
                    self_avoiding: *self_avoiding,
                    allow_reversal: *allow_reversal,
                    mode: SweepMode::FixedTrials,
                    ..base.clone()
                },
            )],
            Self::Fraction { dimension, radii } => radii
                .iter()
                .map(|&r| {
                    (
                        format!("r={r}"),
                        saw_continuum(*dimension, r, SweepMode::FixedTrials),
                    )
                })
                .collect(),
            Self::LatticeFraction { dimension } => [("plain", true), ("non-reversing", false)]
                .into_iter()
                .map(|(label, allow_reversal)| {
                    (
                        label.to_string(),
                        SweepConfig {
                            variant: WalkVariant::Lattice {
                                dimension: *dimension,
                            },
                            self_avoiding: true,
                            allow_reversal,
                            mode: SweepMode::FixedTrials,
                            ..base.clone()
                        },
                    )
                })
                .collect(),
            Self::Compare { dimension, radius } => {
                let lattice = WalkVariant::Lattice {
                    dimension: *dimension,
                };
                let continuum = WalkVariant::Continuum {
                    dimension: *dimension,
                    radius: *radius,
                };
                vec![
                    (
                        "free lattice".to_string(),
                        SweepConfig {
                            variant: lattice,
                            self_avoiding: false,
                            ..base.clone()
                        },
                    ),
                    (
                        "free continuum".to_string(),
                        SweepConfig {
                            variant: continuum,
                            self_avoiding: false,
                            ..base.clone()
                        },
                    ),
                    (
                        "self-avoiding lattice".to_string(),
                        SweepConfig {
                            variant: lattice,
                            self_avoiding: true,
                            ..base.clone()
                        },
                    ),
                    (
                        format!("self-avoiding continuum r={radius}"),
                        saw_continuum(*dimension, *radius, SweepMode::SuccessQuota),
                    ),
                ]
            }
            Self::Radii { dimension, radii } => radii
                .iter()
                .map(|&r| {
                    (
                        format!("r={r}"),
                        saw_continuum(*dimension, r, SweepMode::SuccessQuota),
                    )
                })
                .collect(),
        }
    }
}

/// One labelled line of a study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub report: SweepReport,
}

/// Every series of a completed study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub study: String,
    pub seed: u64,
    pub series: Vec<Series>,
}

/// Run each series in turn; series `i` is seeded from the study seed and `i`.
pub fn run_study(study: &Study, settings: &StudySettings) -> Result<StudyReport, SweepError> {
    let sweeps = study.sweeps(settings);
    if sweeps.is_empty() {
        return Err(SweepError::InvalidConfig("study needs at least one radius"));
    }
    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut series = Vec::with_capacity(sweeps.len());
    for (idx, (label, mut config)) in sweeps.into_iter().enumerate() {
        config.seed = Some(derive_seed(seed, idx as u64));
        info!(study = study.name(), series = %label, "running series");
        let report = run_sweep(&config)?;
        series.push(Series { label, report });
    }
    Ok(StudyReport {
        study: study.name().to_string(),
        seed,
        series,
    })
}
