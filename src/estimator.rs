//! Trimmed-percentile latency estimator.
//!
//! Sorts the duration samples and averages the ranks between a lower and an
//! upper percentile. Degenerate windows never fail: they collapse to a single
//! sample instead.

use anyhow::{bail, Result};
use serde::Serialize;

/// A `[lower, upper)` window of percentile ranks, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileWindow {
    lower: f64,
    upper: f64,
}

impl PercentileWindow {
    /// Validates `0 <= lower < upper <= 100`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(upper > 0.0 && upper <= 100.0) {
            bail!("Upper percentile must be between 0 and 100");
        }
        if !(lower >= 0.0 && lower < 100.0) {
            bail!("Lower percentile must be between 0 and 100");
        }
        if lower >= upper {
            bail!("Lower percentile must be less than upper percentile");
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Resolves the window to rank positions in a sorted population of `len`.
    pub fn indices(&self, len: usize) -> WindowIndices {
        let mut lower_index = (len as f64 * self.lower / 100.0) as usize;
        let mut upper_index = (len as f64 * self.upper / 100.0) as usize;

        // hi = 100 maps to len, which must select the last valid rank instead.
        if upper_index >= len {
            upper_index = len.saturating_sub(1);
        }

        // Collapsed window: widen downwards by one rank, or pin to the front.
        if lower_index >= upper_index {
            lower_index = if upper_index > 0 { upper_index - 1 } else { 0 };
        }

        // Only reachable with upper_index == 0. Average one element, never zero.
        let mut sample_size = upper_index - lower_index;
        if sample_size < 1 {
            sample_size = 1;
        }

        WindowIndices {
            lower_index,
            upper_index,
            sample_size,
        }
    }
}

impl Default for PercentileWindow {
    fn default() -> Self {
        Self {
            lower: 1.0,
            upper: 10.0,
        }
    }
}

/// Rank positions chosen for one estimate.
///
/// The averaged ranks are `lower_index..lower_index + sample_size`, which is
/// `lower_index..upper_index` unless the window collapsed to a single rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowIndices {
    pub lower_index: usize,
    pub upper_index: usize,
    pub sample_size: usize,
}

impl WindowIndices {
    pub fn ranks(&self) -> std::ops::Range<usize> {
        self.lower_index..self.lower_index + self.sample_size
    }
}

/// Outcome of one estimate, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub indices: WindowIndices,
}

/// Sorts a copy of `samples` and summarizes the window. `None` when there
/// are no samples.
pub fn estimate(samples: &[f64], window: PercentileWindow) -> Option<Estimate> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let indices = window.indices(sorted.len());
    let selected = &sorted[indices.ranks()];
    let sum: f64 = selected.iter().sum();

    Some(Estimate {
        mean: sum / indices.sample_size as f64,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        indices,
    })
}

/// Trimmed mean of `samples` over `window`, in the unit of the input.
pub fn trimmed_mean(samples: &[f64], window: PercentileWindow) -> Option<f64> {
    estimate(samples, window).map(|e| e.mean)
}
