//! Gesture-to-viewport translation.
//!
//! Recognizers report pan translation cumulatively from the start of the
//! gesture. The viewport wants increments, so the translator keeps the
//! previous sample and forwards only the difference. The last point must go
//! back to zero when a pan ends, otherwise the next pan starts with a jump.

use crate::constants::MIN_PINCH_SCALE;
use crate::viewport::Viewport;
use glam::DVec2;

/// Where a continuous gesture is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

impl From<winit::event::TouchPhase> for GesturePhase {
    fn from(phase: winit::event::TouchPhase) -> Self {
        use winit::event::TouchPhase;
        match phase {
            TouchPhase::Started => Self::Began,
            TouchPhase::Moved => Self::Changed,
            TouchPhase::Ended => Self::Ended,
            TouchPhase::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Default)]
pub struct GestureTranslator {
    /// Previous cumulative pan sample, zero between gestures
    last_pan: DVec2,
    panning: bool,
}

impl GestureTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a pan sample. `translation` is cumulative since the gesture began.
    pub fn pan(&mut self, viewport: &mut Viewport, translation: DVec2, phase: GesturePhase) {
        let step = translation - self.last_pan;
        if step != DVec2::ZERO {
            viewport.set_origin(step.x, step.y);
        }
        self.last_pan = translation;
        self.panning = true;

        if phase.is_finished() {
            tracing::debug!(?phase, x = translation.x, y = translation.y, "pan finished");
            self.cancel();
        }
    }

    /// Apply a pinch sample and return the value the recognizer's scale
    /// accumulator must be reset to.
    pub fn pinch(&mut self, viewport: &mut Viewport, scale: f64) -> f64 {
        if !scale.is_finite() {
            tracing::warn!(scale, "ignoring non-finite pinch scale");
            return 1.0;
        }
        let scale = if scale <= 0.0 {
            tracing::warn!(scale, "clamping degenerate pinch scale");
            MIN_PINCH_SCALE
        } else {
            scale
        };
        viewport.set_zoom(scale);
        tracing::trace!(scale, zoom = viewport.zoom(), "pinch");
        1.0
    }

    /// Drop any in-flight pan so the next sample starts a fresh gesture.
    pub fn cancel(&mut self) {
        self.last_pan = DVec2::ZERO;
        self.panning = false;
    }

    #[cfg(test)]
    pub fn is_panning(&self) -> bool {
        self.panning
    }
}
