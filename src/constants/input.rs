//! Gesture and input constants.

/// Smallest pinch scale factor forwarded to the viewport
pub const MIN_PINCH_SCALE: f64 = 1e-3;
/// Zoom factor per scroll-wheel line
pub const WHEEL_ZOOM_STEP: f64 = 1.1;
/// Scroll pixels that count as one wheel line (trackpads report pixels)
pub const WHEEL_PIXELS_PER_LINE: f64 = 40.0;
/// Zoom factor for a single +/- key press
pub const KEY_ZOOM_STEP: f64 = 1.5;
/// Two-finger distance (pixels) below which pinch samples are ignored
pub const MIN_PINCH_DISTANCE: f64 = 10.0;
