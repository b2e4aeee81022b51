pub mod constants;
pub mod processor;

pub use processor::{BlockProcessor, LookaheadLimiter, ThreeBandEq};
