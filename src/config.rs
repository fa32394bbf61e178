//! Engine configuration: surface size, physics tuning, and input options.
//!
//! The physics and input sections deserialize from JSON with every key
//! optional, so a host can pass a partial object and inherit the defaults.
//! [`EngineConfig::validate`] runs at construction and rejects anything the
//! engine could not run with.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FRICTION, DEFAULT_MIN_VELOCITY, DEFAULT_VELOCITY_SAMPLE_SIZE, DEFAULT_VELOCITY_SAMPLE_TIME_MS,
    DEFAULT_WHEEL_IDLE_MS,
};
use crate::error::ParallaxError;

/// How a layer raster is mapped onto the destination height.
///
/// One mode applies to a whole engine instance: the compositor and the
/// scroll-bound derivation both read it, so they cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Extract a surface-wide strip at the raster's native pixel scale.
    #[default]
    Native,
    /// Scale each raster so its height fills the surface height.
    FitHeight,
}

/// Momentum tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Linear deceleration in px/ms².
    pub friction: f64,
    /// Capacity of the velocity history window.
    pub velocity_sample_size: usize,
    /// Only samples this recent (ms) contribute to release velocity.
    pub velocity_sample_time_ms: f64,
    /// Below this speed (px/ms) motion stops.
    pub min_velocity: f64,
    /// A wheel session closes after this many ms without wheel events.
    pub wheel_idle_ms: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            velocity_sample_size: DEFAULT_VELOCITY_SAMPLE_SIZE,
            velocity_sample_time_ms: DEFAULT_VELOCITY_SAMPLE_TIME_MS,
            min_velocity: DEFAULT_MIN_VELOCITY,
            wheel_idle_ms: DEFAULT_WHEEL_IDLE_MS,
        }
    }
}

impl PhysicsConfig {
    /// Parse from a JSON object; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ParallaxError> {
        serde_json::from_str(json).map_err(|e| ParallaxError::Configuration(format!("physics: {e}")))
    }

    fn validate(&self) -> Result<(), ParallaxError> {
        let non_negative = [
            ("friction", self.friction),
            ("velocitySampleTimeMs", self.velocity_sample_time_ms),
            ("minVelocity", self.min_velocity),
            ("wheelIdleMs", self.wheel_idle_ms),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ParallaxError::Configuration(format!(
                    "physics.{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.velocity_sample_size == 0 {
            return Err(ParallaxError::Configuration("physics.velocitySampleSize must be at least 1".into()));
        }
        Ok(())
    }
}

/// Input wiring options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputConfig {
    /// Attach pointer and wheel listeners at all.
    pub enabled: bool,
    /// Capture the pointer for the duration of a drag; other pointers are ignored.
    pub capture_pointer: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { enabled: true, capture_pointer: true }
    }
}

impl InputConfig {
    /// Parse from a JSON object; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ParallaxError> {
        serde_json::from_str(json).map_err(|e| ParallaxError::Configuration(format!("input: {e}")))
    }
}

/// Everything the engine needs besides the surface and the layers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Logical (CSS) width of the surface. Required.
    pub width: f64,
    /// Logical (CSS) height of the surface. Required.
    pub height: f64,
    /// Fixed device pixel ratio; `None` lets the host sample it once at construction.
    pub device_pixel_ratio: Option<f64>,
    pub scale_mode: ScaleMode,
    pub physics: PhysicsConfig,
    pub input: InputConfig,
}

impl EngineConfig {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ..Self::default() }
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = Some(dpr);
        self
    }

    #[must_use]
    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    #[must_use]
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Parse a full configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] on malformed JSON or if the
    /// result fails [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ParallaxError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ParallaxError::Configuration(format!("engine: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] when the size is missing or not
    /// positive, or a physics option is out of range.
    pub fn validate(&self) -> Result<(), ParallaxError> {
        validate_size(self.width, self.height)?;
        if let Some(dpr) = self.device_pixel_ratio {
            if !dpr.is_finite() || dpr <= 0.0 {
                return Err(ParallaxError::Configuration(format!(
                    "devicePixelRatio must be a positive number, got {dpr}"
                )));
            }
        }
        self.physics.validate()
    }
}

/// Width and height must both be present (non-zero), finite, and positive.
pub(crate) fn validate_size(width: f64, height: f64) -> Result<(), ParallaxError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(ParallaxError::Configuration(format!(
            "width and height are required and must be positive, got {width}x{height}"
        )))
    }
}
