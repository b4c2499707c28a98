use polywalk_core::{Dimension, IndexKind, WalkVariant};
use polywalk_sweep::{SweepConfig, SweepMode, run_sweep};

fn continuum_fixed(radius: f64, lengths: Vec<usize>) -> SweepConfig {
    SweepConfig {
        variant: WalkVariant::Continuum {
            dimension: Dimension::Three,
            radius,
        },
        self_avoiding: true,
        lengths,
        trials_per_length: 3_000,
        mode: SweepMode::FixedTrials,
        seed: Some(0xDEADBEEF),
        ..SweepConfig::default()
    }
}

#[test]
fn seeded_sweeps_are_deterministic() {
    let config = SweepConfig {
        variant: WalkVariant::Lattice {
            dimension: Dimension::Three,
        },
        lengths: vec![5, 10, 20],
        trials_per_length: 200,
        seed: Some(0xA1B2C3),
        ..SweepConfig::default()
    };
    let sequential = run_sweep(&SweepConfig {
        parallel: false,
        ..config.clone()
    })
    .expect("sequential");
    let parallel = run_sweep(&SweepConfig {
        parallel: true,
        ..config
    })
    .expect("parallel");
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.seed, 0xA1B2C3);
}

#[test]
fn length_order_does_not_change_results() {
    let forward = run_sweep(&continuum_fixed(0.3, vec![4, 8, 12])).expect("forward");
    let reversed = run_sweep(&continuum_fixed(0.3, vec![12, 8, 4])).expect("reversed");
    let mut reordered = reversed.points.clone();
    reordered.reverse();
    assert_eq!(forward.points, reordered);
}

#[test]
fn success_fraction_decreases_with_length() {
    let report = run_sweep(&continuum_fixed(0.4, vec![2, 6, 12, 24])).expect("sweep");
    let fractions: Vec<f64> = report.success_series().into_iter().map(|(_, f)| f).collect();
    for pair in fractions.windows(2) {
        assert!(
            pair[1] <= pair[0] + 0.02,
            "success fraction rose: {fractions:?}"
        );
    }
    assert!(fractions[0] > fractions[3]);
}

#[test]
fn tighter_spheres_finish_more_often() {
    let lengths = vec![10];
    let large = run_sweep(&continuum_fixed(0.45, lengths.clone())).expect("large");
    let small = run_sweep(&continuum_fixed(0.1, lengths)).expect("small");
    assert!(small.points[0].success_fraction > large.points[0].success_fraction);
}

#[test]
fn self_avoidance_swells_the_chain() {
    let lengths = vec![30];
    let base = SweepConfig {
        variant: WalkVariant::Lattice {
            dimension: Dimension::Three,
        },
        lengths,
        trials_per_length: 2_000,
        seed: Some(17),
        ..SweepConfig::default()
    };
    let free = run_sweep(&SweepConfig {
        self_avoiding: false,
        ..base.clone()
    })
    .expect("free");
    let saw = run_sweep(&base).expect("saw");

    let free_rmsd = free.points[0].rmsd.expect("free rmsd");
    let saw_rmsd = saw.points[0].rmsd.expect("saw rmsd");
    // Free lattice walks have <R^2> = N exactly in expectation.
    assert!((free_rmsd - 30_f64.sqrt()).abs() < 0.3, "free rmsd {free_rmsd}");
    assert!(saw_rmsd > free_rmsd, "saw {saw_rmsd} vs free {free_rmsd}");
    assert_eq!(free.points[0].attempts, 2_000);
    assert!(saw.points[0].attempts > 2_000);
}

#[test]
fn grid_index_reproduces_linear_sweep() {
    let linear = continuum_fixed(0.25, vec![10, 20]);
    let grid = SweepConfig {
        index: IndexKind::Grid,
        ..linear.clone()
    };
    let a = run_sweep(&linear).expect("linear");
    let b = run_sweep(&grid).expect("grid");
    assert_eq!(a.points, b.points);
}

#[test]
fn config_and_report_serialize() {
    let json = r#"{
        "variant": { "geometry": "continuum", "dimension": 2, "radius": 0.1 },
        "lengths": [3, 6],
        "trials_per_length": 25,
        "mode": "fixed_trials",
        "seed": 5
    }"#;
    let config: SweepConfig = serde_json::from_str(json).expect("config");
    assert!(config.self_avoiding);
    assert_eq!(config.mode, SweepMode::FixedTrials);
    let report = run_sweep(&config).expect("sweep");
    let encoded = serde_json::to_string(&report).expect("encode");
    assert!(encoded.contains("\"success_fraction\""));
    assert_eq!(report.points.len(), 2);
}
