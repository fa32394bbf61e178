//! Engine error taxonomy.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use wasm_bindgen::{JsCast, JsValue};

/// Error returned by engine construction, initialization, and drawing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParallaxError {
    /// A required construction field is missing or invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A layer's raster source failed to resolve or is unusable.
    #[error("failed to load layer \"{layer}\": {cause}")]
    LayerLoad { layer: String, cause: String },
    /// A render hook or draw call failed for one layer; other layers still draw.
    #[error("failed to draw layer \"{layer}\": {cause}")]
    RuntimeDraw { layer: String, cause: String },
    /// The drawing surface itself could not be prepared.
    #[error("drawing surface error: {0}")]
    Surface(String),
    /// An operation that needs loaded layers ran before `init` completed.
    #[error("engine is not initialized")]
    NotInitialized,
    /// `init` ran on an engine that already has layers installed.
    #[error("engine is already initialized")]
    AlreadyInitialized,
    /// The engine was torn down with `destroy`.
    #[error("engine has been destroyed")]
    Destroyed,
}

impl ParallaxError {
    /// Whether this error leaves the engine unusable until it is rebuilt.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::LayerLoad { .. } | Self::Destroyed)
    }
}

/// Render a `JsValue` thrown by a browser API into a readable cause string.
#[must_use]
pub fn js_cause(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}
