//! Viewport model constants.

/// Height of the visible plane window at zoom 1.0, in plane units.
/// The vertical half-extent (`delta.y`) is half of this.
pub const VIEW_VERTICAL_SPAN: f64 = 2.5;
/// Resolution is divided by this to get the pan translation scale
pub const TRANSLATION_DIVISOR: f64 = 2.0;
/// Plane point drawn at the window center on startup and after reset
pub const INITIAL_CENTER: [f64; 2] = [-0.5, 0.0];
/// Zoom on startup and after reset
pub const INITIAL_ZOOM: f64 = 1.0;
/// Floor applied to the zoom accumulator if caller error drives it to zero
pub const MIN_ZOOM: f64 = 1e-6;
