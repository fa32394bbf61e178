//! Scroll physics: offset, velocity, gesture phases, and momentum.
//!
//! All distances are physical pixels and all times are milliseconds on the
//! host's monotonic clock. The offset is `0` when every layer is centred;
//! positive offsets reveal content to the right. Dragging moves the scene with
//! the finger (`offset -= dx`), so a finger moving left scrolls right.
//!
//! ```text
//!           start                 end (fast)
//!   Idle ─────────▶ Dragging ───────────────▶ Coasting
//!    ▲  ◀───────────────┘ end (slow)             │
//!    │                                           │ friction / bound hit
//!    └───────────────────────────────────────────┘
//!   Idle ── wheel ──▶ Wheeling ── quiet for wheel_idle_ms ──▶ Coasting | Idle
//! ```

#[cfg(test)]
#[path = "physics_test.rs"]
mod physics_test;

use std::collections::VecDeque;

use crate::config::PhysicsConfig;

/// Which gesture (if any) currently drives the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// At rest; the offset only changes through programmatic scrolls.
    #[default]
    Idle,
    /// A pointer is down and moving the scene directly.
    Dragging,
    /// Wheel events are arriving; closes after a quiet period.
    Wheeling,
    /// Released with momentum; velocity decays under friction.
    Coasting,
}

impl Phase {
    /// Whether the scene may change on the next frame without new input.
    #[must_use]
    pub fn is_moving(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Allowed offset range, symmetric around the centred position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLimits {
    pub min: f64,
    pub max: f64,
}

/// One instantaneous velocity measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    /// px/ms, in the sign convention of `offset -= velocity * dt`.
    pub velocity: f64,
    /// Host timestamp in ms.
    pub time: f64,
}

/// Sliding window of the most recent velocity samples.
#[derive(Debug, Clone)]
pub struct VelocityHistory {
    samples: VecDeque<VelocitySample>,
    capacity: usize,
}

impl VelocityHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a sample, dropping the oldest once full.
    pub fn push(&mut self, velocity: f64, time: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(VelocitySample { velocity, time });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean velocity of samples taken less than `window_ms` before `now`.
    ///
    /// Samples from a pause before release are stale and ignored; no recent
    /// samples means no momentum.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn release_velocity(&self, now: f64, window_ms: f64) -> f64 {
        let (sum, count) = self
            .samples
            .iter()
            .filter(|s| now - s.time < window_ms)
            .fold((0.0, 0_usize), |(sum, n), s| (sum + s.velocity, n + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }
}

/// Owned scroll state plus the integrator that moves it.
#[derive(Debug, Clone)]
pub struct ScrollPhysics {
    config: PhysicsConfig,
    offset: f64,
    velocity: f64,
    max_scroll: f64,
    phase: Phase,
    last_x: f64,
    last_time: f64,
    history: VelocityHistory,
}

impl ScrollPhysics {
    #[must_use]
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            offset: 0.0,
            velocity: 0.0,
            max_scroll: 0.0,
            phase: Phase::Idle,
            last_x: 0.0,
            last_time: 0.0,
            history: VelocityHistory::new(config.velocity_sample_size),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current momentum in px/ms; zero unless coasting.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        self.max_scroll
    }

    #[must_use]
    pub fn limits(&self) -> ScrollLimits {
        ScrollLimits { min: -self.max_scroll, max: self.max_scroll }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn history(&self) -> &VelocityHistory {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // --- Bounds ---

    /// Replace the bound and re-clamp the current offset.
    pub fn set_max_scroll(&mut self, max_scroll: f64) {
        self.max_scroll = if max_scroll.is_finite() { max_scroll.max(0.0) } else { 0.0 };
        self.offset = self.clamp(self.offset);
    }

    fn clamp(&self, offset: f64) -> f64 {
        offset.clamp(-self.max_scroll, self.max_scroll)
    }

    // --- Programmatic scrolling ---

    /// Jump to `offset` (clamped). Momentum is cancelled so the jump lands;
    /// an active drag or wheel session keeps going from the new position.
    /// Returns whether the offset changed.
    #[allow(clippy::float_cmp)]
    pub fn jump_to(&mut self, offset: f64) -> bool {
        if !offset.is_finite() {
            return false;
        }
        if self.phase == Phase::Coasting {
            self.stop();
        }
        let prev = self.offset;
        self.offset = self.clamp(offset);
        self.offset != prev
    }

    /// Drop all motion and any open gesture.
    pub fn stop(&mut self) {
        self.velocity = 0.0;
        self.phase = Phase::Idle;
        self.history.clear();
    }

    // --- Drag ---

    /// Begin a drag at physical x. Any momentum stops immediately.
    pub fn begin_drag(&mut self, x: f64, now: f64) {
        self.phase = Phase::Dragging;
        self.velocity = 0.0;
        self.history.clear();
        self.last_x = x;
        self.last_time = now;
    }

    /// Move the active drag to physical x. Ignored unless dragging.
    /// Returns whether the offset changed.
    #[allow(clippy::float_cmp)]
    pub fn drag_to(&mut self, x: f64, now: f64) -> bool {
        if self.phase != Phase::Dragging {
            return false;
        }
        let dx = x - self.last_x;
        let dt = now - self.last_time;
        if dt > 0.0 {
            self.history.push(dx / dt, now);
        }
        self.last_x = x;
        self.last_time = now;

        let prev = self.offset;
        self.offset = self.clamp(self.offset - dx);
        self.offset != prev
    }

    /// Release the drag, coasting with the averaged recent velocity.
    pub fn end_drag(&mut self, now: f64) {
        if self.phase != Phase::Dragging {
            return;
        }
        self.release(now);
    }

    // --- Wheel ---

    /// Apply one wheel step of `delta` physical pixels (positive scrolls right).
    /// Opens a wheel session if none is active. Returns whether the offset changed.
    #[allow(clippy::float_cmp)]
    pub fn wheel(&mut self, delta: f64, now: f64) -> bool {
        if self.phase == Phase::Wheeling {
            let dt = now - self.last_time;
            if dt > 0.0 {
                self.history.push(-delta / dt, now);
            }
        } else {
            if self.phase == Phase::Dragging {
                return false;
            }
            self.phase = Phase::Wheeling;
            self.velocity = 0.0;
            self.history.clear();
        }
        self.last_time = now;

        let prev = self.offset;
        self.offset = self.clamp(self.offset + delta);
        self.offset != prev
    }

    /// Close the wheel session once no event has arrived for `wheel_idle_ms`.
    /// Returns whether the session closed.
    pub fn settle_wheel(&mut self, now: f64) -> bool {
        if self.phase != Phase::Wheeling || now - self.last_time < self.config.wheel_idle_ms {
            return false;
        }
        // Recency is judged against the last wheel event, not the timeout instant.
        let last = self.last_time;
        self.release(last);
        true
    }

    fn release(&mut self, now: f64) {
        let velocity = self.history.release_velocity(now, self.config.velocity_sample_time_ms);
        self.history.clear();
        if velocity.abs() > self.config.min_velocity {
            self.velocity = velocity;
            self.phase = Phase::Coasting;
        } else {
            self.velocity = 0.0;
            self.phase = Phase::Idle;
        }
    }

    // --- Integration ---

    /// Advance momentum by `dt` ms. Returns whether the offset changed.
    ///
    /// Explicit Euler: the position moves first, then linear friction removes
    /// `friction * dt` of speed. Hitting a bound stops motion on the same step.
    #[allow(clippy::float_cmp)]
    pub fn step(&mut self, dt: f64) -> bool {
        if self.phase != Phase::Coasting || !(dt.is_finite() && dt > 0.0) {
            return false;
        }

        let prev = self.offset;
        let target = self.offset - self.velocity * dt;
        self.offset = self.clamp(target);
        if self.offset != target {
            self.stop();
            return self.offset != prev;
        }

        let speed = (self.velocity.abs() - self.config.friction * dt).max(0.0);
        if speed < self.config.min_velocity || speed == 0.0 {
            self.stop();
        } else {
            self.velocity = speed.copysign(self.velocity);
        }
        self.offset != prev
    }
}
