//! Running end-to-end distance moments.

use serde::{Deserialize, Serialize};

/// Accumulates R and R² over recorded walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub samples: u64,
    pub sum_r: f64,
    pub sum_r2: f64,
}

impl Moments {
    /// Record one squared end-to-end distance.
    pub fn record(&mut self, r2: f64) {
        self.samples += 1;
        self.sum_r += r2.sqrt();
        self.sum_r2 += r2;
    }

    #[must_use]
    pub fn mean_r(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum_r / self.samples as f64)
    }

    #[must_use]
    pub fn mean_r2(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum_r2 / self.samples as f64)
    }

    /// Root-mean-square end-to-end distance.
    #[must_use]
    pub fn rmsd(&self) -> Option<f64> {
        self.mean_r2().map(f64::sqrt)
    }

    /// Bessel-corrected standard deviation of R; needs at least two samples.
    #[must_use]
    pub fn rmsf(&self) -> Option<f64> {
        if self.samples < 2 {
            return None;
        }
        let n = self.samples as f64;
        let (mean_r, mean_r2) = (self.mean_r()?, self.mean_r2()?);
        let variance = mean_r2 - mean_r * mean_r;
        // Cancellation can push a zero variance slightly negative.
        Some((variance.max(0.0) * n / (n - 1.0)).sqrt())
    }

    /// Standard error estimate of R: `rmsf / sqrt(samples)`.
    #[must_use]
    pub fn see(&self) -> Option<f64> {
        self.rmsf().map(|rmsf| rmsf / (self.samples as f64).sqrt())
    }
}
