use crate::constants::{FRAME_SIZE, OUTPUT_CEILING, PCM_SCALE};
use anyhow::{anyhow, Result};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use nnnoiseless::DenoiseState;
use std::ops::Range;

/// Three-band Equalizer using Biquad filters
pub struct ThreeBandEq {
    low_shelf: DirectForm2Transposed<f32>,
    peaking: DirectForm2Transposed<f32>,
    high_shelf: DirectForm2Transposed<f32>,
}

impl ThreeBandEq {
    /// Builds the filter chain for `sample_rate`. Fails when a corner frequency
    /// sits above Nyquist.
    pub fn new(
        sample_rate: u32,
        low_gain_db: f32,
        mid_gain_db: f32,
        high_gain_db: f32,
    ) -> Result<Self> {
        let fs = (sample_rate as f32).hz();

        // Low Shelf: 200 Hz
        let low_coeffs =
            Coefficients::<f32>::from_params(Type::LowShelf(low_gain_db), fs, 200.0.hz(), 0.707)
                .map_err(|e| anyhow!("Failed to create low shelf filter: {:?}", e))?;

        // Peaking: 1000 Hz
        let mid_coeffs =
            Coefficients::<f32>::from_params(Type::PeakingEQ(mid_gain_db), fs, 1000.0.hz(), 1.0)
                .map_err(|e| anyhow!("Failed to create peaking filter: {:?}", e))?;

        // High Shelf: 4000 Hz
        let high_coeffs =
            Coefficients::<f32>::from_params(Type::HighShelf(high_gain_db), fs, 4000.0.hz(), 0.707)
                .map_err(|e| anyhow!("Failed to create high shelf filter: {:?}", e))?;

        Ok(Self {
            low_shelf: DirectForm2Transposed::<f32>::new(low_coeffs),
            peaking: DirectForm2Transposed::<f32>::new(mid_coeffs),
            high_shelf: DirectForm2Transposed::<f32>::new(high_coeffs),
        })
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        let l = self.low_shelf.run(sample);
        let m = self.peaking.run(l);
        self.high_shelf.run(m)
    }
}

/// Linked gain control across all channels of a block
pub struct LookaheadLimiter {
    target_level: f32,
    current_gain: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl LookaheadLimiter {
    pub fn new(target_level: f32) -> Self {
        Self {
            target_level,
            current_gain: 1.0,
            attack_coeff: 0.1,
            release_coeff: 0.005,
        }
    }

    pub fn gain(&self) -> f32 {
        self.current_gain
    }

    /// Applies one gain step to `range` of every channel. The level is the
    /// RMS of the per-sample peak across channels, so all channels move together.
    pub fn process_frame(&mut self, channels: &mut [Vec<f32>], range: Range<usize>) {
        if channels.is_empty() || range.is_empty() {
            return;
        }

        let frame_len = range.len();
        let mut sum_sq = 0.0;
        for k in range.clone() {
            let mut sample_max = 0.0f32;
            for channel in channels.iter() {
                if let Some(s) = channel.get(k) {
                    sample_max = sample_max.max(s.abs());
                }
            }
            sum_sq += sample_max * sample_max;
        }
        let max_rms = (sum_sq / frame_len as f32).sqrt();

        if max_rms > 0.0001 {
            let error = self.target_level / max_rms;
            let target_gain = if error < 1.0 { error } else { error.min(3.0) };

            if target_gain < self.current_gain {
                self.current_gain += (target_gain - self.current_gain) * self.attack_coeff;
            } else {
                self.current_gain += (target_gain - self.current_gain) * self.release_coeff;
            }
        } else if self.current_gain > 1.0 {
            self.current_gain -= 0.001;
        }

        for channel in channels.iter_mut() {
            let end = range.end.min(channel.len());
            if range.start >= end {
                continue;
            }
            for sample in channel[range.start..end].iter_mut() {
                let val = *sample * self.current_gain;
                *sample = val.clamp(-OUTPUT_CEILING, OUTPUT_CEILING);
            }
        }
    }
}

/// The block under measurement: per-channel EQ and RNNoise, then a linked limiter.
///
/// Blocks are processed in whole frames of `FRAME_SIZE` samples. Samples past
/// the last whole frame are written as silence.
pub struct BlockProcessor {
    denoise: Vec<Box<DenoiseState<'static>>>,
    eq: Vec<ThreeBandEq>,
    limiter: LookaheadLimiter,
    channels: usize,
    frame_in: [f32; FRAME_SIZE],
    frame_out: [f32; FRAME_SIZE],
}

impl BlockProcessor {
    pub fn new(
        channels: usize,
        sample_rate: u32,
        eq_params: (f32, f32, f32),
        agc_target_level: f32,
    ) -> Result<Self> {
        let mut denoise = Vec::with_capacity(channels);
        let mut eq = Vec::with_capacity(channels);
        for _ in 0..channels {
            denoise.push(DenoiseState::new());
            eq.push(ThreeBandEq::new(sample_rate, eq_params.0, eq_params.1, eq_params.2)?);
        }

        log::debug!(
            "Block processor ready: {} channel(s) at {} Hz",
            channels,
            sample_rate
        );

        Ok(Self {
            denoise,
            eq,
            limiter: LookaheadLimiter::new(agc_target_level),
            channels,
            frame_in: [0.0; FRAME_SIZE],
            frame_out: [0.0; FRAME_SIZE],
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.channels
    }

    pub fn num_outputs(&self) -> usize {
        self.channels
    }

    /// Processes one block. `inputs` and `outputs` hold one buffer per channel.
    pub fn compute(&mut self, inputs: &[Vec<f32>], outputs: &mut [Vec<f32>]) {
        let channels = self.channels;
        if inputs.len() != channels || outputs.len() != channels {
            // Mismatch: output silence rather than crashing the caller
            log::error!(
                "Channel count mismatch: expected {}, got input={} output={}",
                channels,
                inputs.len(),
                outputs.len()
            );
            for out_ch in outputs.iter_mut() {
                out_ch.fill(0.0);
            }
            return;
        }

        let block_len = inputs
            .iter()
            .zip(outputs.iter())
            .map(|(i, o)| i.len().min(o.len()))
            .min()
            .unwrap_or(0);
        let whole = block_len - block_len % FRAME_SIZE;

        for start in (0..whole).step_by(FRAME_SIZE) {
            let range = start..start + FRAME_SIZE;

            for ch in 0..channels {
                let eq = &mut self.eq[ch];
                for (dst, &src) in self.frame_in.iter_mut().zip(&inputs[ch][range.clone()]) {
                    *dst = eq.process(src) * PCM_SCALE;
                }

                self.denoise[ch].process_frame(&mut self.frame_out, &self.frame_in);

                let out = &mut outputs[ch][range.clone()];
                for (dst, &src) in out.iter_mut().zip(self.frame_out.iter()) {
                    *dst = src / PCM_SCALE;
                }
            }

            self.limiter.process_frame(outputs, range);
        }

        for out_ch in outputs.iter_mut() {
            if whole < out_ch.len() {
                out_ch[whole..].fill(0.0);
            }
        }
    }
}
