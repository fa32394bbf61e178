//! Drawing surface and raster abstractions.
//!
//! The compositor never touches a browser API directly. It paints through a
//! [`Surface`], which the browser engine implements over a
//! `CanvasRenderingContext2d` (see [`crate::render::CanvasSurface`]) and tests
//! implement with a recording double.

use std::fmt;

use crate::geometry::{Rect, SurfaceGeometry};

/// A decoded image (or offscreen buffer) whose pixel size is known.
pub trait Raster {
    /// Width in raster pixels.
    fn width(&self) -> f64;
    /// Height in raster pixels.
    fn height(&self) -> f64;
}

/// Read-only view of a layer handed to its render hook each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerState {
    /// Position of the layer in draw order.
    pub index: usize,
    /// Parallax speed factor.
    pub speed: f64,
    /// Raster width in pixels.
    pub width: f64,
    /// Raster height in pixels.
    pub height: f64,
    /// Scroll offset already scaled by `speed`.
    pub offset: f64,
}

/// Per-frame custom drawing for one layer.
///
/// Called with the offscreen buffer's drawing context (already holding the
/// layer's raster), the layer state, and the frame tick counter. Marks drawn
/// here parallax exactly like the base raster.
pub type RenderHook<S> =
    Box<dyn FnMut(&<S as Surface>::Context, &LayerState, u64) -> Result<(), <S as Surface>::Error>>;

/// A 2D drawing target the compositor owns for the engine's lifetime.
pub trait Surface {
    /// Raster type that can be drawn from, including offscreen buffers.
    type Source: Raster + 'static;
    /// Drawing context handed to render hooks.
    type Context;
    /// Failure reported by any drawing call.
    type Error: fmt::Display;

    /// Size the backing store to the geometry's physical size.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the surface cannot be resized.
    fn resize(&mut self, geometry: &SurfaceGeometry) -> Result<(), Self::Error>;

    /// Clear the whole surface.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the clear call fails.
    fn clear(&mut self, geometry: &SurfaceGeometry) -> Result<(), Self::Error>;

    /// Copy `src` (raster pixels) of `source` into `dst` (surface pixels).
    ///
    /// # Errors
    ///
    /// Returns `Err` if the draw call fails.
    fn draw(&mut self, source: &Self::Source, src: Rect, dst: Rect) -> Result<(), Self::Error>;

    /// Allocate an offscreen buffer of the given raster size.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer cannot be created.
    fn create_buffer(&mut self, width: f64, height: f64) -> Result<Self::Source, Self::Error>;

    /// Repaint `buffer` with `base` at the origin, then run `hook` on it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if painting fails or the hook fails.
    fn paint_buffer(
        &mut self,
        buffer: &Self::Source,
        base: &Self::Source,
        hook: &mut RenderHook<Self>,
        state: &LayerState,
        tick: u64,
    ) -> Result<(), Self::Error>;
}
