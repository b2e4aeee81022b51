//! Shared constants for the benchmarked DSP block.

/// Sample rate handed to the block when none is configured (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Frame size in samples. RNNoise only accepts frames of exactly this length.
pub const FRAME_SIZE: usize = 480;

/// RNNoise works on samples scaled to the 16-bit PCM range.
pub const PCM_SCALE: f32 = 32768.0;

/// Ceiling applied by the output limiter.
pub const OUTPUT_CEILING: f32 = 0.99;
