//! Frame scheduling.
//!
//! [`FrameClock`] is the host-independent part: it turns successive frame
//! timestamps into `dt` and a monotonically increasing tick counter, and knows
//! whether the loop is running. [`AnimationLoop`] drives a callback from
//! `requestAnimationFrame` in the browser.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

/// One scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Milliseconds since the previous frame (or since `start`).
    pub dt: f64,
    /// Frames advanced since the clock was created. Never resets.
    pub tick: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: f64,
    tick: u64,
    running: bool,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) with a fresh timestamp so the first `dt` does not
    /// span the time spent stopped.
    pub fn start(&mut self, now: f64) {
        self.last = now;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks advanced so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance to `now`. Returns `None` while stopped. A timestamp earlier than
    /// the previous one yields `dt = 0`.
    pub fn advance(&mut self, now: f64) -> Option<Frame> {
        if !self.running {
            return None;
        }
        let dt = if now.is_finite() { (now - self.last).max(0.0) } else { 0.0 };
        if now.is_finite() {
            self.last = self.last.max(now);
        }
        self.tick += 1;
        Some(Frame { dt, tick: self.tick })
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Self-rescheduling `requestAnimationFrame` loop.
///
/// The callback runs once per display refresh until [`AnimationLoop::stop`].
/// Stopping from inside the callback is allowed; the loop then does not
/// reschedule. Restarting from inside it replaces the running chain.
#[derive(Default)]
pub struct AnimationLoop {
    handle: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
    /// Bumped by every `start`; a frame from an older chain does not reschedule.
    generation: Rc<Cell<u64>>,
}

impl AnimationLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Begin calling `on_frame(timestamp_ms)` every animation frame.
    /// No-op if already running.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no window or the first frame cannot be requested.
    pub fn start(&self, mut on_frame: impl FnMut(f64) + 'static) -> Result<(), JsValue> {
        if self.is_running() {
            return Ok(());
        }

        let chain = self.generation.get().wrapping_add(1);
        self.generation.set(chain);
        let generation = Rc::clone(&self.generation);
        let handle = Rc::clone(&self.handle);
        let slot = Rc::downgrade(&self.callback);
        let closure: FrameCallback = Closure::wrap(Box::new(move |ts: f64| {
            on_frame(ts);
            if handle.get().is_none() || generation.get() != chain {
                return;
            }
            let Some(slot) = slot.upgrade() else {
                handle.set(None);
                return;
            };
            let next = match slot.borrow().as_ref() {
                Some(cb) => request_frame(cb),
                None => Err(JsValue::from_str("animation callback dropped")),
            };
            match next {
                Ok(id) => handle.set(Some(id)),
                Err(err) => {
                    log::error!("requestAnimationFrame failed: {err:?}");
                    handle.set(None);
                }
            }
        }) as Box<dyn FnMut(f64)>);

        let id = request_frame(&closure)?;
        self.handle.set(Some(id));
        *self.callback.borrow_mut() = Some(closure);
        Ok(())
    }

    /// Cancel the pending frame. Idempotent.
    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {err:?}");
                }
            }
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Current time in ms from `performance.now()`, falling back to `Date.now()`.
#[must_use]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}
