//! The unit of work being timed: one block processor with its buffers.

use crate::config::BenchConfig;
use anyhow::{Context, Result};
use dspbench_core::BlockProcessor;

/// Owns the processor and caller-side buffers. Every input channel carries a
/// unit impulse at sample 0 and silence after it.
pub struct DspWorkload {
    processor: BlockProcessor,
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
}

impl DspWorkload {
    pub fn new(config: &BenchConfig) -> Result<Self> {
        let processor = BlockProcessor::new(
            config.channels,
            config.sample_rate,
            config.eq_params(),
            config.agc_target_level,
        )
        .context("Failed to create DSP block")?;

        let block_size = config.block_size();
        let inputs = (0..processor.num_inputs())
            .map(|_| {
                let mut buf = vec![0.0f32; block_size];
                buf[0] = 1.0;
                buf
            })
            .collect();
        let outputs = vec![vec![0.0f32; block_size]; processor.num_outputs()];

        Ok(Self {
            processor,
            inputs,
            outputs,
        })
    }

    /// Runs one block through the processor.
    pub fn compute(&mut self) {
        self.processor.compute(&self.inputs, &mut self.outputs);
    }
}
