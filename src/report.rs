//! Result rendering: the classic result line, or JSON.

use crate::config::BenchConfig;
use crate::estimator::{Estimate, PercentileWindow};
use serde::Serialize;
use std::fmt;

/// Everything printed for one run. Times are in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub program: String,
    pub iterations: usize,
    pub warmup_iterations: usize,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub lower_index: usize,
    pub upper_index: usize,
    pub samples_averaged: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub trimmed_mean_ms: f64,
}

impl Report {
    pub fn new(
        program: &str,
        config: &BenchConfig,
        window: PercentileWindow,
        estimate: &Estimate,
    ) -> Self {
        Self {
            program: program.to_string(),
            iterations: config.iterations,
            warmup_iterations: config.warmup_iterations,
            lower_percentile: window.lower(),
            upper_percentile: window.upper(),
            lower_index: estimate.indices.lower_index,
            upper_index: estimate.indices.upper_index,
            samples_averaged: estimate.indices.sample_size,
            min_ms: estimate.min * 1000.0,
            max_ms: estimate.max * 1000.0,
            trimmed_mean_ms: estimate.mean * 1000.0,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `<program> <result_ms> ms`
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6} ms", self.program, self.trimmed_mean_ms)
    }
}
