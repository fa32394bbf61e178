//! Shared numeric defaults for the parallax crate.

// ── Physics ─────────────────────────────────────────────────────

/// Linear friction applied to coasting velocity, in px/ms².
pub const DEFAULT_FRICTION: f64 = 0.003;

/// Number of velocity samples kept during a gesture.
pub const DEFAULT_VELOCITY_SAMPLE_SIZE: usize = 5;

/// Samples older than this (relative to release) are ignored, in ms.
pub const DEFAULT_VELOCITY_SAMPLE_TIME_MS: f64 = 50.0;

/// Velocity magnitude below which motion stops, in px/ms.
pub const DEFAULT_MIN_VELOCITY: f64 = 0.001;

/// Quiet period after the last wheel event that closes a wheel session, in ms.
pub const DEFAULT_WHEEL_IDLE_MS: f64 = 120.0;

// ── Input ───────────────────────────────────────────────────────

/// Pixels per line for `WheelEvent.DOM_DELTA_LINE` deltas.
pub const WHEEL_LINE_HEIGHT_PX: f64 = 16.0;

// ── Decorations ─────────────────────────────────────────────────

/// Default spacing between ruler ticks, in raster pixels.
pub const RULER_INTERVAL_PX: f64 = 100.0;

/// Default ruler tick height, in raster pixels.
pub const RULER_TICK_HEIGHT_PX: f64 = 30.0;

/// Default ruler label font size, in raster pixels.
pub const RULER_FONT_SIZE_PX: f64 = 20.0;

/// Stroke width of ruler lines, in raster pixels.
pub const RULER_LINE_WIDTH_PX: f64 = 2.0;

/// Default side length of the centre dot, in raster pixels.
pub const CENTER_DOT_SIZE_PX: f64 = 1.0;
