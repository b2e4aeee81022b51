//! Steady-state latency benchmark for a fixed-size DSP block.
//!
//! A [`collector::Collector`] times repeated `compute` calls and
//! [`estimator::estimate`] reduces the durations to a trimmed mean over a
//! percentile window.

pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod estimator;
pub mod report;
pub mod workload;

pub use app::run;
pub use collector::Collector;
pub use config::BenchConfig;
pub use estimator::{estimate, trimmed_mean, Estimate, PercentileWindow, WindowIndices};
pub use report::Report;
pub use workload::DspWorkload;
