//! Raw input handling.
//!
//! Turns winit touch, mouse, trackpad and keyboard events into the two
//! gesture samples the viewport understands: a pan translation measured from
//! the start of the gesture, and a pinch scale accumulated since it was last
//! consumed.

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use winit::event::TouchPhase;
use winit::keyboard::KeyCode;

use crate::constants::*;
use crate::gesture::GesturePhase;

/// One pan recognizer update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSample {
    /// Translation in physical pixels since the gesture began
    pub translation: DVec2,
    pub phase: GesturePhase,
}

impl PanSample {
    fn new(translation: DVec2, phase: GesturePhase) -> Self {
        Self { translation, phase }
    }
}

/// Pinch scale accumulator. Whoever consumes the scale sets it back to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchRecognizer {
    scale: f64,
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl PinchRecognizer {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn accumulate(&mut self, factor: f64) {
        self.scale *= factor;
    }

    /// Nothing to apply since the last reset.
    pub fn is_idle(&self) -> bool {
        self.scale == 1.0
    }
}

/// Single-finger (or mouse) pan in progress
#[derive(Debug, Clone, Copy)]
struct ActivePan {
    touch_id: Option<u64>,
    start: DVec2,
    current: DVec2,
}

impl ActivePan {
    fn translation(&self) -> DVec2 {
        self.current - self.start
    }
}

/// Input state tracking
#[derive(Default)]
pub struct InputState {
    pub keys_pressed: HashSet<KeyCode>,
    pub mouse_pos: DVec2,
    pub pinch: PinchRecognizer,
    touches: HashMap<u64, DVec2>,
    pan: Option<ActivePan>,
    /// Finger distance at the previous pinch sample
    pinch_distance: Option<f64>,
    /// Cumulative trackpad pan since the gesture began
    trackpad_pan: DVec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn mouse_moved(&mut self, pos: DVec2) -> Option<PanSample> {
        self.mouse_pos = pos;
        let pan = self.pan.as_mut().filter(|p| p.touch_id.is_none())?;
        pan.current = pos;
        Some(PanSample::new(pan.translation(), GesturePhase::Changed))
    }

    pub fn mouse_pressed(&mut self) -> Option<PanSample> {
        if self.pan.is_some() {
            return None;
        }
        self.pan = Some(ActivePan {
            touch_id: None,
            start: self.mouse_pos,
            current: self.mouse_pos,
        });
        Some(PanSample::new(DVec2::ZERO, GesturePhase::Began))
    }

    pub fn mouse_released(&mut self) -> Option<PanSample> {
        let pan = self.pan.take_if(|p| p.touch_id.is_none())?;
        Some(PanSample::new(pan.translation(), GesturePhase::Ended))
    }

    /// Scroll wheel: `lines` notches, positive zooms in.
    pub fn wheel(&mut self, lines: f64, step: f64) {
        self.pinch.accumulate(step.powf(lines));
    }

    /// Trackpad magnification delta (0.0 = no change).
    pub fn trackpad_pinch(&mut self, delta: f64) {
        self.pinch.accumulate(1.0 + delta);
    }

    /// Trackpad two-finger pan. winit reports per-event deltas; the
    /// recognizer contract is cumulative.
    pub fn trackpad_pan(&mut self, delta: DVec2, phase: TouchPhase) -> PanSample {
        let phase = GesturePhase::from(phase);
        if phase == GesturePhase::Began {
            self.trackpad_pan = DVec2::ZERO;
        }
        self.trackpad_pan += delta;
        let sample = PanSample::new(self.trackpad_pan, phase);
        if phase.is_finished() {
            self.trackpad_pan = DVec2::ZERO;
        }
        sample
    }

    /// Touch event: one finger pans, two fingers pinch.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, location: DVec2) -> Option<PanSample> {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, location);
                self.remeasure_pinch();
                match self.touches.len() {
                    1 => {
                        self.pan = Some(ActivePan {
                            touch_id: Some(id),
                            start: location,
                            current: location,
                        });
                        Some(PanSample::new(DVec2::ZERO, GesturePhase::Began))
                    }
                    2 => {
                        // Second finger turns the pan into a pinch
                        let pan = self.pan.take_if(|p| p.touch_id.is_some())?;
                        Some(PanSample::new(pan.translation(), GesturePhase::Ended))
                    }
                    _ => None,
                }
            }
            TouchPhase::Moved => {
                if let Some(pos) = self.touches.get_mut(&id) {
                    *pos = location;
                }
                if self.touches.len() == 2 {
                    self.sample_pinch();
                    return None;
                }
                let pan = self.pan.as_mut().filter(|p| p.touch_id == Some(id))?;
                pan.current = location;
                Some(PanSample::new(pan.translation(), GesturePhase::Changed))
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&id);
                self.remeasure_pinch();
                if let Some(mut pan) = self.pan.take_if(|p| p.touch_id == Some(id)) {
                    pan.current = location;
                    return Some(PanSample::new(pan.translation(), phase.into()));
                }
                // Leftover finger after a pinch keeps panning from where it is
                if self.pan.is_none() && self.touches.len() == 1 {
                    if let Some((&rest_id, &rest_pos)) = self.touches.iter().next() {
                        self.pan = Some(ActivePan {
                            touch_id: Some(rest_id),
                            start: rest_pos,
                            current: rest_pos,
                        });
                    }
                }
                None
            }
        }
    }

    /// Abandon every tracked gesture (focus lost, view reset).
    pub fn cancel_all(&mut self) -> Option<PanSample> {
        self.touches.clear();
        self.pinch_distance = None;
        self.trackpad_pan = DVec2::ZERO;
        self.pinch = PinchRecognizer::default();
        let pan = self.pan.take()?;
        Some(PanSample::new(pan.translation(), GesturePhase::Cancelled))
    }

    fn finger_distance(&self) -> Option<f64> {
        let mut points = self.touches.values();
        let a = points.next()?;
        let b = points.next()?;
        Some(a.distance(*b))
    }

    /// The finger set changed: measure the new pair, or stop pinching.
    fn remeasure_pinch(&mut self) {
        self.pinch_distance = if self.touches.len() == 2 {
            self.finger_distance()
        } else {
            None
        };
    }

    fn sample_pinch(&mut self) {
        let Some(current) = self.finger_distance() else {
            return;
        };
        if let Some(previous) = self.pinch_distance {
            if previous >= MIN_PINCH_DISTANCE && current >= MIN_PINCH_DISTANCE {
                self.pinch.accumulate(current / previous);
            }
        }
        self.pinch_distance = Some(current);
    }
}

/// Result of processing keyboard input
#[derive(Default)]
pub struct InputResult {
    pub toggle_fullscreen: bool,
    pub toggle_hud: bool,
    pub reset_view: bool,
    /// Net key zoom steps this frame, positive zooms in
    pub zoom_steps: i32,
}

/// Process keyboard input and return actions to take
pub fn process_keyboard(input: &mut InputState) -> InputResult {
    let mut result = InputResult::default();

    if input.keys_pressed.remove(&KeyCode::F11) {
        result.toggle_fullscreen = true;
    }

    if input.keys_pressed.remove(&KeyCode::KeyH) {
        result.toggle_hud = true;
    }

    if input.keys_pressed.remove(&KeyCode::KeyR) {
        result.reset_view = true;
    }

    if input.keys_pressed.remove(&KeyCode::Equal) || input.keys_pressed.remove(&KeyCode::NumpadAdd) {
        result.zoom_steps += 1;
    }
    if input.keys_pressed.remove(&KeyCode::Minus)
        || input.keys_pressed.remove(&KeyCode::NumpadSubtract)
    {
        result.zoom_steps -= 1;
    }

    result
}
