//! Parallax scroll engine for a 2D canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! scroll state of a horizontally scrollable, multi-layer parallax scene:
//! translating raw pointer, touch, and wheel input into scroll offset and
//! velocity, integrating momentum under friction, clamping travel to the
//! foreground layer's bounds, and compositing every layer at its own speed
//! each animation frame. The host is responsible only for decoding images and
//! handing the engine a canvas element.
//!
//! Everything except [`render`] and [`engine::Engine`] is free of browser
//! types, so the physics, input, and compositing rules are tested natively
//! against [`surface::Surface`] test doubles.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level browser engine and testable [`engine::EngineCore`] |
//! | [`layer`] | Layer descriptors, async loading, and the layer registry |
//! | [`physics`] | Scroll offset, velocity history, and momentum integration |
//! | [`input`] | Input event vocabulary and the gesture adapter |
//! | [`compositor`] | Source-rectangle mapping and per-frame layer compositing |
//! | [`scheduler`] | Frame clock and the `requestAnimationFrame` loop |
//! | [`surface`] | Drawing surface and raster traits |
//! | [`geometry`] | Surface sizing and rectangles |
//! | [`config`] | Engine, physics, and input configuration |
//! | [`error`] | Engine error taxonomy |
//! | [`render`] | `Canvas2D` surface, image loading, and decoration hooks |
//! | [`logging`] | Browser console logging setup |
//! | [`consts`] | Shared numeric defaults |

pub mod compositor;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod logging;
pub mod physics;
pub mod render;
pub mod scheduler;
pub mod surface;

#[cfg(test)]
pub(crate) mod testkit;

pub use config::{EngineConfig, InputConfig, PhysicsConfig, ScaleMode};
pub use engine::{Callbacks, Engine, EngineCore};
pub use error::ParallaxError;
pub use layer::{LayerDescriptor, LayerProgress, LayerSource};
pub use logging::init_console_logging;
pub use render::{CanvasSurface, Decorations, WebRaster, decorated_image, load_image};
