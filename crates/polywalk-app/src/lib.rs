//! Shared plumbing for the polywalk command line: argument parsing helpers and output writers.

use anyhow::{Context, Result};
use clap::ValueEnum;
use polywalk_core::{Dimension, LcgSource};
use polywalk_sweep::{StudyReport, SweepReport, Trace};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Target lengths given as `start:end[:step]` (inclusive) or a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthList(pub Vec<usize>);

impl FromStr for LengthList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |t: &str| {
            t.trim()
                .parse::<usize>()
                .map_err(|err| format!("invalid length `{}`: {err}", t.trim()))
        };

        let lengths = if s.contains(':') {
            let parts: Vec<&str> = s.split(':').collect();
            let (start, end, step) = match parts.as_slice() {
                [start, end] => (parse(start)?, parse(end)?, 1),
                [start, end, step] => (parse(start)?, parse(end)?, parse(step)?),
                _ => return Err(format!("expected start:end[:step], got `{s}`")),
            };
            if step == 0 {
                return Err("range step must be positive".to_string());
            }
            if start > end {
                return Err(format!("range start {start} exceeds end {end}"));
            }
            (start..=end).step_by(step).collect()
        } else {
            s.split(',').map(parse).collect::<Result<Vec<_>, _>>()?
        };

        if lengths.is_empty() {
            return Err("no lengths given".to_string());
        }
        if lengths.contains(&0) {
            return Err("lengths must be positive".to_string());
        }
        Ok(Self(lengths))
    }
}

/// Accepts `2` or `3`.
pub fn parse_dimension(s: &str) -> Result<Dimension, String> {
    let axes = s
        .trim()
        .parse::<u8>()
        .map_err(|err| format!("invalid dimension `{s}`: {err}"))?;
    Dimension::try_from(axes)
}

/// Accepts `r0,a,c,m` for a linear congruential source.
pub fn parse_lcg(s: &str) -> Result<LcgSource, String> {
    let parts = s
        .split(',')
        .map(|t| {
            t.trim()
                .parse::<i64>()
                .map_err(|err| format!("invalid lcg parameter `{}`: {err}", t.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        &[r0, a, c, m] => LcgSource::new(r0, a, c, m).map_err(|err| err.to_string()),
        _ => Err(format!("expected r0,a,c,m, got `{s}`")),
    }
}

/// Encoding of emitted results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Serialize any report as JSON.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.context("failed to encode results as JSON")
}

fn push_points(out: &mut String, label: &str, report: &SweepReport) {
    let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for point in &report.points {
        let _ = writeln!(
            out,
            "{label},{},{},{},{},{},{},{}",
            point.length,
            point.attempts,
            point.successes,
            point.success_fraction,
            opt(point.rmsd),
            opt(point.rmsf),
            opt(point.see),
        );
    }
}

/// Labels are written bare; no study produces one containing a comma.
const SERIES_HEADER: &str = "series,length,attempts,successes,success_fraction,rmsd,rmsf,see";

/// One row per (series, length).
#[must_use]
pub fn study_csv(report: &StudyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SERIES_HEADER}");
    for series in &report.series {
        push_points(&mut out, &series.label, &series.report);
    }
    out
}

/// Single-series variant of [`study_csv`].
#[must_use]
pub fn sweep_csv(report: &SweepReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SERIES_HEADER}");
    push_points(&mut out, &report.variant.label(), report);
    out
}

/// `step,x,y,z` rows of a traced path.
#[must_use]
pub fn trace_csv(trace: &Trace) -> String {
    let mut out = String::from("step,x,y,z\n");
    for (step, p) in trace.points.iter().enumerate() {
        let _ = writeln!(out, "{step},{},{},{}", p.x, p.y, p.z);
    }
    out
}

/// Write to `path`, or stdout when absent.
pub fn emit(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| {
                    if rendered.ends_with('\n') {
                        Ok(())
                    } else {
                        stdout.write_all(b"\n")
                    }
                })
                .context("failed to write results to stdout")
        }
    }
}
