//! View session context.
//!
//! Owns the one viewport of an active view together with its gesture
//! translator and frame publisher. Input handlers borrow it mutably, the
//! redraw borrows it to publish, and both run on the event-loop thread.

use crate::config::ViewerConfig;
use crate::error::RenderError;
use crate::frame::{FrameParams, FramePublisher, FrameSink};
use crate::gesture::GestureTranslator;
use crate::input::{PanSample, PinchRecognizer};
use crate::viewport::Viewport;
use glam::DVec2;

pub struct ViewSession {
    pub viewport: Viewport,
    gestures: GestureTranslator,
    publisher: FramePublisher,
}

impl ViewSession {
    /// Start a session for a surface of the given physical size.
    pub fn new(width: f64, height: f64, config: &ViewerConfig) -> Self {
        let viewport = Viewport::from_config(width, height, config);
        let resolution = viewport.resolution();
        let delta = viewport.get_delta();
        let pan_scale = viewport.translation_scale();
        tracing::info!(
            width = resolution.x,
            height = resolution.y,
            half_width = delta.x,
            half_height = delta.y,
            pan_scale_x = pan_scale.x,
            pan_scale_y = pan_scale.y,
            "view session started"
        );
        Self {
            viewport,
            gestures: GestureTranslator::new(),
            publisher: FramePublisher::new(),
        }
    }

    /// Refit the view to a new surface size. Center and zoom carry over and
    /// any pan in flight continues, since its samples are in pixels.
    pub fn resize(&mut self, width: f64, height: f64, config: &ViewerConfig) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        if self.viewport.resolution() == DVec2::new(width, height) {
            return;
        }
        self.viewport = self.viewport.refit(width, height, config);
        let delta = self.viewport.get_delta();
        tracing::info!(
            width,
            height,
            half_width = delta.x,
            half_height = delta.y,
            "view refit to new surface size"
        );
    }

    pub fn pan(&mut self, sample: PanSample) {
        self.gestures
            .pan(&mut self.viewport, sample.translation, sample.phase);
    }

    /// Apply whatever scale the recognizer has gathered and reset it.
    pub fn pinch(&mut self, recognizer: &mut PinchRecognizer) {
        if recognizer.is_idle() {
            return;
        }
        let reset = self.gestures.pinch(&mut self.viewport, recognizer.scale());
        recognizer.set_scale(reset);
    }

    /// Zoom by a fixed factor (keyboard), bypassing any recognizer.
    pub fn zoom_by(&mut self, factor: f64) {
        self.gestures.pinch(&mut self.viewport, factor);
    }

    pub fn reset(&mut self) {
        self.gestures.cancel();
        self.viewport.reset();
        tracing::info!("view reset");
    }

    /// Hand this frame's parameters to the renderer.
    pub fn publish<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<FrameParams, RenderError> {
        self.publisher.publish(&self.viewport, sink)
    }

    pub fn frames(&self) -> u64 {
        self.publisher.frames()
    }

    pub fn last_frame(&self) -> Option<&FrameParams> {
        self.publisher.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GesturePhase;

    struct NullSink;

    impl FrameSink for NullSink {
        fn submit(&mut self, _params: &FrameParams) -> Result<(), RenderError> {
            Ok(())
        }
    }

    fn session() -> ViewSession {
        ViewSession::new(1280.0, 720.0, &ViewerConfig::default())
    }

    #[test]
    fn test_pinch_resets_recognizer() {
        let mut session = session();
        let mut pinch = PinchRecognizer::default();
        pinch.accumulate(1.5);
        session.pinch(&mut pinch);
        assert!(pinch.is_idle());
        assert!((session.viewport.zoom() - 1.5).abs() < 1e-12);

        // Idle recognizer leaves zoom alone
        session.pinch(&mut pinch);
        assert!((session.viewport.zoom() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_cancels_pan_in_flight() {
        let mut session = session();
        let initial = session.viewport.get_origin();
        session.pan(PanSample {
            translation: DVec2::new(80.0, 0.0),
            phase: GesturePhase::Changed,
        });
        session.reset();
        assert_eq!(session.viewport.get_origin(), initial);

        // The old gesture's next sample lands on the fresh view in full
        session.pan(PanSample {
            translation: DVec2::new(90.0, 0.0),
            phase: GesturePhase::Changed,
        });
        let mut expected = Viewport::from_config(1280.0, 720.0, &ViewerConfig::default());
        expected.set_origin(90.0, 0.0);
        assert!((session.viewport.get_origin() - expected.get_origin()).length() < 1e-12);
    }

    #[test]
    fn test_resize_keeps_view_undistorted() {
        let config = ViewerConfig::default();
        let mut session = session();
        session.zoom_by(2.0);
        let center = session.viewport.get_origin();

        session.resize(1920.0, 1200.0, &config);
        let params = session.publish(&mut NullSink).unwrap();
        assert_eq!(session.viewport.resolution(), DVec2::new(1920.0, 1200.0));
        assert!((params.delta.x / params.delta.y - 1.6).abs() < 1e-12);
        assert!((params.origin - center).length() < 1e-12);
        assert_eq!(params.scale, 2.0);

        // Minimized windows report zero size
        session.resize(0.0, 0.0, &config);
        assert_eq!(session.viewport.resolution(), DVec2::new(1920.0, 1200.0));
    }

    #[test]
    fn test_pan_continues_across_resize() {
        let config = ViewerConfig::default();
        let mut session = session();
        session.pan(PanSample {
            translation: DVec2::new(40.0, 0.0),
            phase: GesturePhase::Changed,
        });
        session.resize(1920.0, 1080.0, &config);
        let before = session.viewport.get_origin();
        session.pan(PanSample {
            translation: DVec2::new(50.0, 0.0),
            phase: GesturePhase::Changed,
        });

        // Only the 10 px step since the last sample moves the view
        let step = session.viewport.get_origin() - before;
        assert!((step.x - (-10.0 / 960.0)).abs() < 1e-12);
        assert_eq!(step.y, 0.0);
    }

    #[test]
    fn test_publish_snapshots_current_view() {
        let mut session = session();
        session.zoom_by(2.0);
        let params = session.publish(&mut NullSink).unwrap();
        assert_eq!(params.scale, 2.0);
        assert_eq!(session.frames(), 1);
        assert_eq!(session.last_frame(), Some(&params));
    }
}
