//! Sample collection.
//!
//! Warms the unit of work up, then times each call with a monotonic clock and
//! records the elapsed seconds in call order.

use std::hint::black_box;
use std::time::Instant;

/// Warmup iterations run before measuring, unless configured otherwise
pub const DEFAULT_WARMUP_ITERATIONS: usize = 50;

#[derive(Debug, Clone)]
pub struct Collector {
    warmup_iterations: usize,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP_ITERATIONS)
    }
}

impl Collector {
    pub fn new(warmup_iterations: usize) -> Self {
        Self { warmup_iterations }
    }

    fn warmup<F, T>(&self, work: &mut F)
    where
        F: FnMut() -> T,
    {
        for _ in 0..self.warmup_iterations {
            black_box(work());
        }
    }

    /// Runs the warmup, then returns exactly `iterations` durations in seconds.
    ///
    /// Nothing but the call itself happens between the two clock reads.
    pub fn collect<F, T>(&self, iterations: usize, mut work: F) -> Vec<f64>
    where
        F: FnMut() -> T,
    {
        self.warmup(&mut work);
        log::debug!("Warmup done ({} iterations)", self.warmup_iterations);

        let mut measurements = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let start = Instant::now();
            let out = work();
            let elapsed = start.elapsed();
            black_box(out);
            measurements.push(elapsed.as_secs_f64());
        }

        log::debug!("Collected {} measurements", measurements.len());
        measurements
    }
}
