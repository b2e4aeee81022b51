use crate::collector::DEFAULT_WARMUP_ITERATIONS;
use crate::estimator::PercentileWindow;
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use dspbench_core::constants::{DEFAULT_SAMPLE_RATE, FRAME_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Measurements taken when no count is given
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Benchmark configuration. Every field is optional in the JSON file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BenchConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_warmup_iterations")]
    pub warmup_iterations: usize,
    #[serde(default = "default_upper_percentile")]
    pub upper_percentile: f64,
    #[serde(default = "default_lower_percentile")]
    pub lower_percentile: f64,
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Frames of `FRAME_SIZE` samples per compute call
    #[serde(default = "default_frames")]
    pub frames: usize,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default)]
    pub eq_low_gain: f32, // dB
    #[serde(default)]
    pub eq_mid_gain: f32, // dB
    #[serde(default)]
    pub eq_high_gain: f32, // dB
    #[serde(default = "default_agc_target")]
    pub agc_target_level: f32,
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_warmup_iterations() -> usize {
    DEFAULT_WARMUP_ITERATIONS
}

fn default_upper_percentile() -> f64 {
    10.0
}

fn default_lower_percentile() -> f64 {
    1.0
}

fn default_channels() -> usize {
    2
}

fn default_frames() -> usize {
    1
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_agc_target() -> f32 {
    0.7 // Approx -3dB
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            warmup_iterations: default_warmup_iterations(),
            upper_percentile: default_upper_percentile(),
            lower_percentile: default_lower_percentile(),
            channels: default_channels(),
            frames: default_frames(),
            sample_rate: default_sample_rate(),
            eq_low_gain: 0.0,
            eq_mid_gain: 0.0,
            eq_high_gain: 0.0,
            agc_target_level: default_agc_target(),
        }
    }
}

impl BenchConfig {
    /// Loads the configuration file.
    ///
    /// An explicit `path` must exist and parse. Without one, the per-user
    /// config file is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match config_path() {
            Some(path) if path.is_file() => match Self::from_file(&path) {
                Ok(cfg) => Ok(cfg),
                Err(e) => {
                    log::warn!("Ignoring {}: {:#}", path.display(), e);
                    Ok(Self::default())
                }
            },
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Checks every field and returns the percentile window to estimate with.
    pub fn validate(&self) -> Result<PercentileWindow> {
        if self.iterations == 0 {
            bail!("Iterations must be at least 1");
        }
        if self.channels == 0 {
            bail!("Channel count must be at least 1");
        }
        if self.frames == 0 {
            bail!("Frames per block must be at least 1");
        }
        if self.sample_rate == 0 {
            bail!("Sample rate must be positive");
        }
        PercentileWindow::new(self.lower_percentile, self.upper_percentile)
    }

    /// Samples per channel in one compute call
    pub fn block_size(&self) -> usize {
        self.frames * FRAME_SIZE
    }

    pub fn eq_params(&self) -> (f32, f32, f32) {
        (self.eq_low_gain, self.eq_mid_gain, self.eq_high_gain)
    }
}

/// Per-user config file location
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "dspbench", "dspbench")
        .map(|dirs| dirs.config_dir().join("config.json"))
}
