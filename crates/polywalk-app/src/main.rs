use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use polywalk_app::{
    LengthList, OutputFormat, emit, parse_dimension, parse_lcg, study_csv, sweep_csv, to_json,
    trace_csv,
};
use polywalk_core::{Dimension, IndexKind, LcgSource, WalkConfig, WalkVariant};
use polywalk_sweep::{
    Study, StudySettings, SweepConfig, run_study, run_sweep, trace_walk, trace_walk_lcg,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "polywalk",
    version,
    about = "Random and self-avoiding polymer walks with end-to-end statistics"
)]
struct Cli {
    /// Base seed; every length and series derives its own stream from it.
    #[arg(long, global = true, env = "POLYWALK_SEED")]
    seed: Option<u64>,

    /// Write results to this file instead of stdout.
    #[arg(short, long, global = true, env = "POLYWALK_OUTPUT")]
    output: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Indent JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    /// Run lengths one after another instead of on the rayon pool.
    #[arg(long, global = true)]
    sequential: bool,

    /// Collision index for continuum walks [default: linear].
    #[arg(long, global = true, value_enum)]
    index: Option<IndexArg>,

    /// Walks drawn per length before a success quota is declared unreachable [default: 10000000].
    #[arg(long, global = true)]
    max_attempts: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce the coordinates of one finished walk.
    Trace {
        #[command(flatten)]
        walk: WalkArgs,
        #[arg(long, default_value_t = 1000)]
        length: usize,
        /// Drive the walk with an `r0,a,c,m` linear congruential generator instead of the seeded RNG.
        #[arg(long, value_parser = parse_lcg)]
        lcg: Option<LcgSource>,
    },
    /// RMSD and RMSF against length for one walk type.
    Rmsd {
        #[command(flatten)]
        walk: WalkArgs,
        /// `start:end[:step]` or a comma-separated list.
        #[arg(long, default_value = "10:1000:10")]
        lengths: LengthList,
        #[arg(long, default_value_t = 1000)]
        trials: u64,
    },
    /// Fraction of self-avoiding continuum walks that finish, per sphere radius.
    Fraction {
        #[arg(long, default_value = "3", value_parser = parse_dimension)]
        dimension: Dimension,
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "0.5,0.4,0.3,0.2,0.1,0.05"
        )]
        radii: Vec<f64>,
        #[arg(long, default_value = "1:100")]
        lengths: LengthList,
        #[arg(long, default_value_t = 10_000)]
        trials: u64,
    },
    /// Fraction of self-avoiding lattice walks that finish, with and without reversals.
    LatticeFraction {
        #[arg(long, default_value = "2", value_parser = parse_dimension)]
        dimension: Dimension,
        #[arg(long, default_value = "1:100")]
        lengths: LengthList,
        #[arg(long, default_value_t = 10_000)]
        trials: u64,
    },
    /// Free and self-avoiding lattice and continuum walks side by side.
    Compare {
        #[arg(long, default_value = "3", value_parser = parse_dimension)]
        dimension: Dimension,
        #[arg(long, default_value_t = 0.2)]
        radius: f64,
        #[arg(long, default_value = "1:75")]
        lengths: LengthList,
        #[arg(long, default_value_t = 1000)]
        trials: u64,
    },
    /// RMSD of self-avoiding continuum walks, per sphere radius.
    Radii {
        #[arg(long, default_value = "3", value_parser = parse_dimension)]
        dimension: Dimension,
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "0.5,0.4,0.3,0.2,0.1,0.05,0.01"
        )]
        radii: Vec<f64>,
        #[arg(long, default_value = "1:15")]
        lengths: LengthList,
        #[arg(long, default_value_t = 1000)]
        trials: u64,
    },
    /// Run a sweep described by a JSON file.
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct WalkArgs {
    #[arg(long, value_enum, default_value_t = Geometry::Continuum)]
    geometry: Geometry,
    #[arg(long, default_value = "3", value_parser = parse_dimension)]
    dimension: Dimension,
    /// Sphere radius for self-avoiding continuum walks.
    #[arg(long, default_value_t = 0.5)]
    radius: f64,
    /// Reject walks that revisit a site or overlap a sphere.
    #[arg(long)]
    self_avoiding: bool,
    /// Let self-avoiding lattice walks propose an immediate reversal (which then fails).
    #[arg(long)]
    allow_reversal: bool,
}

impl WalkArgs {
    fn config(self, length: usize, index: IndexKind) -> WalkConfig {
        WalkConfig {
            allow_reversal: self.allow_reversal,
            index,
            ..WalkConfig::new(self.variant(), length, self.self_avoiding)
        }
    }

    fn variant(self) -> WalkVariant {
        match self.geometry {
            Geometry::Lattice => WalkVariant::Lattice {
                dimension: self.dimension,
            },
            Geometry::Continuum => WalkVariant::Continuum {
                dimension: self.dimension,
                radius: self.radius,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Geometry {
    Lattice,
    Continuum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndexArg {
    Linear,
    Grid,
}

impl From<IndexArg> for IndexKind {
    fn from(value: IndexArg) -> Self {
        match value {
            IndexArg::Linear => IndexKind::Linear,
            IndexArg::Grid => IndexKind::Grid,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let rendered = run(&cli)?;
    emit(&rendered, cli.output.as_deref())?;
    if let Some(path) = &cli.output {
        info!(path = %path.display(), "results written");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<String> {
    let defaults = SweepConfig::default();
    let index = cli.index.map_or(defaults.index, IndexKind::from);
    let max_attempts = cli
        .max_attempts
        .unwrap_or(defaults.max_attempts_per_length);
    let study_settings = |lengths: &LengthList, trials: u64| StudySettings {
        lengths: lengths.0.clone(),
        trials_per_length: trials,
        max_attempts_per_length: max_attempts,
        seed: cli.seed,
        parallel: !cli.sequential,
        index,
    };

    let (study, settings) = match &cli.command {
        Command::Trace { walk, length, lcg } => {
            let config = walk.config(*length, index);
            let trace = match lcg {
                Some(lcg) => trace_walk_lcg(&config, *lcg, max_attempts),
                None => trace_walk(&config, cli.seed, max_attempts),
            }
            .context("failed to trace a walk")?;
            return match cli.format {
                OutputFormat::Json => to_json(&trace, cli.pretty),
                OutputFormat::Csv => Ok(trace_csv(&trace)),
            };
        }
        Command::Sweep { config } => {
            let raw = std::fs::read_to_string(config)
                .with_context(|| format!("failed to read {}", config.display()))?;
            let mut sweep: SweepConfig = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse sweep config {}", config.display()))?;
            if cli.seed.is_some() {
                sweep.seed = cli.seed;
            }
            if cli.sequential {
                sweep.parallel = false;
            }
            if let Some(index) = cli.index {
                sweep.index = index.into();
            }
            if let Some(max_attempts) = cli.max_attempts {
                sweep.max_attempts_per_length = max_attempts;
            }
            let report = run_sweep(&sweep).context("sweep failed")?;
            return match cli.format {
                OutputFormat::Json => to_json(&report, cli.pretty),
                OutputFormat::Csv => Ok(sweep_csv(&report)),
            };
        }
        Command::Rmsd {
            walk,
            lengths,
            trials,
        } => (
            Study::Rmsd {
                variant: walk.variant(),
                self_avoiding: walk.self_avoiding,
                allow_reversal: walk.allow_reversal,
            },
            study_settings(lengths, *trials),
        ),
        Command::Fraction {
            dimension,
            radii,
            lengths,
            trials,
        } => (
            Study::Fraction {
                dimension: *dimension,
                radii: radii.clone(),
            },
            study_settings(lengths, *trials),
        ),
        Command::LatticeFraction {
            dimension,
            lengths,
            trials,
        } => (
            Study::LatticeFraction {
                dimension: *dimension,
            },
            study_settings(lengths, *trials),
        ),
        Command::Compare {
            dimension,
            radius,
            lengths,
            trials,
        } => (
            Study::Compare {
                dimension: *dimension,
                radius: *radius,
            },
            study_settings(lengths, *trials),
        ),
        Command::Radii {
            dimension,
            radii,
            lengths,
            trials,
        } => (
            Study::Radii {
                dimension: *dimension,
                radii: radii.clone(),
            },
            study_settings(lengths, *trials),
        ),
    };

    let report = run_study(&study, &settings)
        .with_context(|| format!("{} study failed", study.name()))?;
    match cli.format {
        OutputFormat::Json => to_json(&report, cli.pretty),
        OutputFormat::Csv => Ok(study_csv(&report)),
    }
}
