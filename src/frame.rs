//! Per-frame parameter snapshots for the fractal renderer.
//!
//! Once per redraw the publisher reads the viewport and hands an immutable
//! snapshot to a `FrameSink`. The sink sees five numbers in a fixed order:
//! `[scale, delta.x, delta.y, origin.x, origin.y]`.

use crate::constants::FRAME_BLOCK_LEN;
use crate::error::RenderError;
use crate::viewport::Viewport;
use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub scale: f64,
    pub delta: DVec2,
    pub origin: DVec2,
}

impl FrameParams {
    /// Snapshot the viewport. The shared borrow keeps gestures out mid-read.
    pub fn capture(viewport: &Viewport) -> Self {
        Self {
            scale: viewport.zoom(),
            delta: viewport.get_delta(),
            origin: viewport.get_origin(),
        }
    }

    /// Parameter block in upload order, narrowed to what the shader consumes.
    pub fn to_block(&self) -> [f32; FRAME_BLOCK_LEN] {
        [
            self.scale as f32,
            self.delta.x as f32,
            self.delta.y as f32,
            self.origin.x as f32,
            self.origin.y as f32,
        ]
    }

    /// Plane point for normalized window coordinates (0..1, y up).
    ///
    /// Mirrors the fragment shader's mapping.
    #[cfg(test)]
    pub fn plane_point(&self, uv: DVec2) -> DVec2 {
        self.origin + (uv - DVec2::splat(0.5)) * 2.0 * self.delta
    }
}

/// Consumer of per-frame parameters, usually the GPU renderer.
pub trait FrameSink {
    fn submit(&mut self, params: &FrameParams) -> Result<(), RenderError>;
}

#[derive(Debug, Default)]
pub struct FramePublisher {
    frames: u64,
    last: Option<FrameParams>,
}

impl FramePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish<S: FrameSink + ?Sized>(
        &mut self,
        viewport: &Viewport,
        sink: &mut S,
    ) -> Result<FrameParams, RenderError> {
        let params = FrameParams::capture(viewport);
        if self.last != Some(params) {
            tracing::debug!(
                frame = self.frames,
                scale = params.scale,
                x = params.origin.x,
                y = params.origin.y,
                "view changed"
            );
        }
        sink.submit(&params)?;
        self.frames += 1;
        self.last = Some(params);
        Ok(params)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last(&self) -> Option<&FrameParams> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        blocks: Vec<[f32; FRAME_BLOCK_LEN]>,
    }

    impl FrameSink for RecordingSink {
        fn submit(&mut self, params: &FrameParams) -> Result<(), RenderError> {
            self.blocks.push(params.to_block());
            Ok(())
        }
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn submit(&mut self, _params: &FrameParams) -> Result<(), RenderError> {
            Err(RenderError::MissingUniform("uFrame"))
        }
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
    fn test_capture_matches_accessors() {
        let mut vp = scenario_viewport();
        vp.set_zoom(2.0);
        let params = FrameParams::capture(&vp);
        assert_eq!(params.scale, vp.zoom());
        assert_eq!(params.delta, vp.get_delta());
        assert_eq!(params.origin, vp.get_origin());
    }

    #[test]
    fn test_block_order() {
        let mut vp = scenario_viewport();
        vp.set_zoom(2.0);
        let block = FrameParams::capture(&vp).to_block();
        // origin = (-2.5, -1.0) - (1.75, 1.0) / 2
        assert_eq!(block, [2.0, 1.75, 1.0, -3.375, -1.5]);
    }

    #[test]
    fn test_window_center_maps_to_origin() {
        let vp = Viewport::new(1280.0, 720.0);
        let params = FrameParams::capture(&vp);
        assert_eq!(params.plane_point(DVec2::splat(0.5)), vp.get_origin());

        let corner = params.plane_point(DVec2::ONE);
        let expected = vp.get_origin() + vp.get_delta();
        assert!((corner - expected).length() < 1e-12);
    }

    #[test]
    fn test_publish_counts_frames() {
        let mut vp = scenario_viewport();
        let mut publisher = FramePublisher::new();
        let mut sink = RecordingSink::default();

        publisher.publish(&vp, &mut sink).unwrap();
        vp.set_zoom(2.0);
        let params = publisher.publish(&vp, &mut sink).unwrap();

        assert_eq!(publisher.frames(), 2);
        assert_eq!(sink.blocks.len(), 2);
        assert_eq!(sink.blocks[1], params.to_block());
        assert_eq!(publisher.last(), Some(&params));
    }

    #[test]
    fn test_publish_propagates_sink_error() {
        let vp = scenario_viewport();
        let mut publisher = FramePublisher::new();
        assert!(publisher.publish(&vp, &mut FailingSink).is_err());
        assert_eq!(publisher.frames(), 0);
        assert!(publisher.last().is_none());
    }
}
