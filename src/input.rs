//! Input model: raw host events and the gesture adapter.
//!
//! The host forwards pointer and wheel events as [`InputEvent`]s in CSS
//! pixels. [`InputAdapter`] turns them into [`Gesture`]s in physical pixels,
//! enforcing exclusive pointer capture and dropping everything once detached.
//! Mouse, pen, and touch all arrive as pointer events, so one path covers them.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::config::InputConfig;
use crate::consts::WHEEL_LINE_HEIGHT_PX;
use crate::geometry::SurfaceGeometry;

/// Pointer identifier as reported by the browser (`PointerEvent.pointerId`).
pub type PointerId = i32;

/// Unit of a wheel delta (`WheelEvent.deltaMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelMode {
    /// Map a DOM `deltaMode` value; unknown values are treated as pixels.
    #[must_use]
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// A raw input event from the host, coordinates in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { id: PointerId, x: f64 },
    PointerMove { id: PointerId, x: f64 },
    PointerUp { id: PointerId },
    PointerCancel { id: PointerId },
    Wheel { dx: f64, dy: f64, mode: WheelMode },
}

/// A normalized gesture step, coordinates in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A drag begins at this x.
    Start(f64),
    /// The drag moved to this x.
    Move(f64),
    /// The drag ended (release or cancel).
    End,
    /// One wheel step of this many pixels; positive scrolls right.
    Wheel(f64),
}

/// Stateful translator from [`InputEvent`] to [`Gesture`].
#[derive(Debug, Clone)]
pub struct InputAdapter {
    config: InputConfig,
    /// Pointer that owns the current drag, if any.
    active: Option<PointerId>,
    attached: bool,
}

impl InputAdapter {
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self { config, active: None, attached: true }
    }

    #[must_use]
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The pointer that owns the current drag.
    #[must_use]
    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Stop producing gestures for good. Idempotent.
    pub fn detach(&mut self) {
        self.attached = false;
        self.active = None;
    }

    /// Translate one event. Returns `None` when the event is ignored.
    pub fn translate(&mut self, event: InputEvent, geometry: &SurfaceGeometry) -> Option<Gesture> {
        if !self.attached || !self.config.enabled {
            return None;
        }
        match event {
            InputEvent::PointerDown { id, x } => {
                if self.config.capture_pointer && self.active.is_some_and(|owner| owner != id) {
                    log::debug!("pointer {id} ignored: drag captured by another pointer");
                    return None;
                }
                self.active = Some(id);
                Some(Gesture::Start(geometry.to_physical(x)))
            }
            InputEvent::PointerMove { id, x } => {
                self.owns(id)?;
                Some(Gesture::Move(geometry.to_physical(x)))
            }
            InputEvent::PointerUp { id } | InputEvent::PointerCancel { id } => {
                self.owns(id)?;
                self.active = None;
                Some(Gesture::End)
            }
            InputEvent::Wheel { dx, dy, mode } => {
                let delta = wheel_delta(dx, dy, mode, geometry);
                (delta != 0.0 && delta.is_finite()).then_some(Gesture::Wheel(delta))
            }
        }
    }

    /// `Some(())` when `id` may act on the current drag.
    fn owns(&self, id: PointerId) -> Option<()> {
        let owner = self.active?;
        (!self.config.capture_pointer || owner == id).then_some(())
    }
}

/// Horizontal wheel delta in physical pixels, falling back to the vertical
/// delta so a plain mouse wheel still pans.
#[must_use]
pub fn wheel_delta(dx: f64, dy: f64, mode: WheelMode, geometry: &SurfaceGeometry) -> f64 {
    let raw = if dx == 0.0 { dy } else { dx };
    match mode {
        WheelMode::Pixel => geometry.to_physical(raw),
        WheelMode::Line => geometry.to_physical(raw * WHEEL_LINE_HEIGHT_PX),
        WheelMode::Page => raw * geometry.physical_width,
    }
}

/// The pointer to capture once the engine has handled `event`: a pointer down
/// it accepted as the drag pointer, and only when capture is enabled.
#[must_use]
pub fn capture_target(event: InputEvent, accepted: bool, capture: bool) -> Option<PointerId> {
    match event {
        InputEvent::PointerDown { id, .. } if accepted && capture => Some(id),
        _ => None,
    }
}
