//! Renderer constants.

/// Default escape-time iteration cap
pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
/// Clear color behind the fractal quad
pub const CLEAR_COLOR: [f32; 4] = [0.65, 0.65, 0.65, 1.0];
/// Number of floats in the per-frame parameter block
pub const FRAME_BLOCK_LEN: usize = 5;
