//! Viewport state: the mapping from the window onto the complex plane.
//!
//! `origin` is an anchor accumulator, not the visual center. Zoom never
//! rescales `delta` directly; it is divided in at read time so zoom sequences
//! stay invertible.

use crate::config::ViewerConfig;
use crate::constants::*;
use glam::DVec2;

pub struct Viewport {
    origin: DVec2,
    /// Half-extent of the visible window at zoom 1.0
    delta: DVec2,
    zoom: f64,
    resolution: DVec2,
    translation_scale: DVec2,
    // Construction-time values for reset
    initial_origin: DVec2,
    initial_delta: DVec2,
    initial_zoom: f64,
}

impl Viewport {
    /// Viewport for a surface of `width` x `height` physical pixels, using
    /// the built-in span, divisor and center.
    #[cfg(test)]
    pub fn new(width: f64, height: f64) -> Self {
        Self::framed(
            DVec2::new(width, height),
            VIEW_VERTICAL_SPAN,
            TRANSLATION_DIVISOR,
            DVec2::from(INITIAL_CENTER),
        )
    }

    pub fn from_config(width: f64, height: f64, config: &ViewerConfig) -> Self {
        Self::framed(
            DVec2::new(width, height),
            config.vertical_span,
            config.translation_divisor,
            DVec2::from(config.initial_center),
        )
    }

    /// Explicit anchor and half-extent. `delta` is taken as given rather than
    /// derived from the aspect ratio.
    pub fn with_params(
        resolution: DVec2,
        origin: DVec2,
        delta: DVec2,
        translation_divisor: f64,
    ) -> Self {
        Self {
            origin,
            delta,
            zoom: INITIAL_ZOOM,
            resolution,
            translation_scale: resolution / translation_divisor,
            initial_origin: origin,
            initial_delta: delta,
            initial_zoom: INITIAL_ZOOM,
        }
    }

    fn framed(resolution: DVec2, vertical_span: f64, translation_divisor: f64, center: DVec2) -> Self {
        let half_span = vertical_span / 2.0;
        let aspect = if resolution.y > 0.0 {
            resolution.x / resolution.y
        } else {
            1.0
        };
        let delta = DVec2::new(half_span * aspect, half_span);
        // get_origin() subtracts half of delta, so the anchor sits that far
        // past the requested center.
        let origin = center + delta / 2.0;
        Self::with_params(resolution, origin, delta, translation_divisor)
    }

    /// Viewport for a new surface size that keeps the current center and
    /// zoom. `delta` and the translation scale come from the new size, and
    /// `reset` still returns to the configured start view.
    pub fn refit(&self, width: f64, height: f64, config: &ViewerConfig) -> Self {
        let mut next = Self::from_config(width, height, config);
        next.zoom = self.zoom;
        next.origin = self.get_origin() + (next.delta / next.zoom) / 2.0;
        next
    }

    /// Apply a pinch scale factor sampled since the last call (1.0 = no change).
    ///
    /// Callers must pass `scale_factor > 0` and reset their own accumulator
    /// to 1.0 afterwards so successive calls compose multiplicatively.
    pub fn set_zoom(&mut self, scale_factor: f64) {
        let zoom = self.zoom + (scale_factor - 1.0) * self.zoom;
        // NaN also lands on the floor here
        self.zoom = zoom.max(MIN_ZOOM);
    }

    /// Shift the anchor by an incremental pan distance in physical pixels.
    pub fn set_origin(&mut self, dx: f64, dy: f64) {
        let plane_dx = (-dx / self.translation_scale.x) / self.zoom;
        let plane_dy = (dy / self.translation_scale.y) / self.zoom;

        self.origin.x += plane_dx;
        self.origin.y += plane_dy;
    }

    /// Plane point at the center of the visible window.
    pub fn get_origin(&self) -> DVec2 {
        self.origin - (self.delta / self.zoom) / 2.0
    }

    /// Visible half-extent at the current zoom.
    pub fn get_delta(&self) -> DVec2 {
        self.delta / self.zoom
    }

    pub fn reset(&mut self) {
        self.origin = self.initial_origin;
        self.zoom = self.initial_zoom;
        self.delta = self.initial_delta;
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn resolution(&self) -> DVec2 {
        self.resolution
    }

    pub fn translation_scale(&self) -> DVec2 {
        self.translation_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn scenario_viewport() -> Viewport {
        Viewport::with_params(
            DVec2::new(320.0, 480.0),
            DVec2::new(-2.5, -1.0),
            DVec2::new(3.5, 2.0),
            2.0,
        )
    }

    #[test]
    fn test_scenario_zoom_then_pan() {
        let mut vp = scenario_viewport();
        assert_eq!(vp.translation_scale(), DVec2::new(160.0, 240.0));

        vp.set_zoom(2.0);
        assert_eq!(vp.zoom(), 2.0);

        let delta = vp.get_delta();
        assert!(approx_eq(delta.x, 1.75));
        assert!(approx_eq(delta.y, 1.0));

        vp.set_origin(32.0, 0.0);
        assert!(approx_eq(vp.origin.x, -2.6));
        assert!(approx_eq(vp.origin.y, -1.0));
    }

    #[test]
    fn test_zoom_composition() {
        let mut vp = Viewport::new(1280.0, 720.0);
        let samples = [1.1, 0.95, 1.3, 1.0, 0.5, 2.25, 1.02];
        let mut expected = vp.zoom();
        for s in samples {
            vp.set_zoom(s);
            expected *= s;
        }
        assert!((vp.zoom() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_zoom_invertible() {
        let mut vp = Viewport::new(1280.0, 720.0);
        vp.set_zoom(3.7);
        let before = vp.zoom();
        for s in [1.25, 0.3, 17.0, 1.0001] {
            vp.set_zoom(s);
            vp.set_zoom(1.0 / s);
            assert!((vp.zoom() - before).abs() / before < 1e-9);
        }
    }

    #[test]
    fn test_pan_linearity() {
        let mut vp = Viewport::new(1280.0, 720.0);
        vp.set_zoom(4.0);
        let before = vp.origin;
        vp.set_origin(37.5, -12.25);
        assert_ne!(vp.origin, before);
        vp.set_origin(-37.5, 12.25);
        assert!(approx_eq(vp.origin.x, before.x));
        assert!(approx_eq(vp.origin.y, before.y));
    }

    #[test]
    fn test_pan_shift_inversely_proportional_to_zoom() {
        let mut a = Viewport::new(1280.0, 720.0);
        let mut b = Viewport::new(1280.0, 720.0);
        b.set_zoom(2.0);

        let start_a = a.origin;
        let start_b = b.origin;
        a.set_origin(100.0, 50.0);
        b.set_origin(100.0, 50.0);

        let shift_a = a.origin - start_a;
        let shift_b = b.origin - start_b;
        assert!(approx_eq(shift_b.x, shift_a.x / 2.0));
        assert!(approx_eq(shift_b.y, shift_a.y / 2.0));
    }

    #[test]
    fn test_pan_sign_convention() {
        let mut vp = Viewport::new(1280.0, 720.0);
        let start = vp.origin;
        vp.set_origin(10.0, 10.0);
        // x is flipped, y is not
        assert!(vp.origin.x < start.x);
        assert!(vp.origin.y > start.y);
    }

    #[test]
    fn test_delta_field_never_rescaled() {
        let mut vp = Viewport::new(1280.0, 720.0);
        let delta = vp.delta;
        for i in 0..100 {
            vp.set_zoom(1.0 + (i % 7) as f64 * 0.1);
            vp.set_origin(i as f64, -(i as f64));
        }
        assert_eq!(vp.delta, delta);
        assert_ne!(vp.get_delta(), delta);
    }

    #[test]
    fn test_reads_are_pure() {
        let mut vp = Viewport::new(1280.0, 720.0);
        vp.set_zoom(1.7);
        vp.set_origin(3.0, 4.0);
        let origin = vp.get_origin();
        let delta = vp.get_delta();
        for _ in 0..10 {
            assert_eq!(vp.get_origin().to_array(), origin.to_array());
            assert_eq!(vp.get_delta().to_array(), delta.to_array());
        }
    }

    #[test]
    fn test_initial_view_is_centered() {
        let vp = Viewport::new(1280.0, 720.0);
        let center = vp.get_origin();
        assert!(approx_eq(center.x, INITIAL_CENTER[0]));
        assert!(approx_eq(center.y, INITIAL_CENTER[1]));

        let delta = vp.get_delta();
        assert!(approx_eq(delta.y, VIEW_VERTICAL_SPAN / 2.0));
        assert!(approx_eq(delta.x, VIEW_VERTICAL_SPAN / 2.0 * 1280.0 / 720.0));
    }

    #[test]
    fn test_degenerate_zoom_clamped() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_zoom(0.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.set_zoom(-3.0);
        assert!(vp.zoom() > 0.0);
        vp.set_zoom(f64::NAN);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert!(vp.get_delta().is_finite());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut vp = Viewport::new(800.0, 600.0);
        let origin = vp.get_origin();
        let delta = vp.get_delta();
        vp.set_zoom(5.0);
        vp.set_origin(-250.0, 90.0);
        vp.reset();
        assert_eq!(vp.zoom(), INITIAL_ZOOM);
        assert_eq!(vp.get_origin(), origin);
        assert_eq!(vp.get_delta(), delta);
    }

    #[test]
    fn test_from_config_uses_config_constants() {
        let config = ViewerConfig {
            vertical_span: 4.0,
            translation_divisor: 4.0,
            initial_center: [0.25, -0.5],
            ..ViewerConfig::default()
        };
        let vp = Viewport::from_config(400.0, 400.0, &config);
        assert_eq!(vp.translation_scale(), DVec2::new(100.0, 100.0));
        assert_eq!(vp.get_delta(), DVec2::new(2.0, 2.0));
        assert!(approx_eq(vp.get_origin().x, 0.25));
        assert!(approx_eq(vp.get_origin().y, -0.5));
    }

    #[test]
    fn test_refit_keeps_center_and_follows_aspect() {
        let config = ViewerConfig::default();
        let mut vp = Viewport::from_config(1280.0, 720.0, &config);
        vp.set_zoom(4.0);
        vp.set_origin(-300.0, 120.0);
        let center = vp.get_origin();

        let refit = vp.refit(1920.0, 1200.0, &config);
        assert!(approx_eq(refit.zoom(), 4.0));
        assert!((refit.get_origin() - center).length() < EPSILON);
        assert!(approx_eq(refit.get_delta().x / refit.get_delta().y, 1920.0 / 1200.0));
        assert!(approx_eq(refit.get_delta().y, vp.get_delta().y));
        assert_eq!(refit.translation_scale(), DVec2::new(960.0, 600.0));

        // Reset goes to the start view framed for the new size
        let mut refit = refit;
        refit.reset();
        let fresh = Viewport::from_config(1920.0, 1200.0, &config);
        assert_eq!(refit.get_origin(), fresh.get_origin());
        assert_eq!(refit.get_delta(), fresh.get_delta());
    }
}
