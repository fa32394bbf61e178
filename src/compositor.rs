//! Compositing: maps the scroll offset to a source rectangle per layer and
//! draws every layer, background first, onto the full surface.
//!
//! Bound derivation lives here too, next to the extraction it must agree
//! with. Both read the same [`ScaleMode`].

#[cfg(test)]
#[path = "compositor_test.rs"]
mod compositor_test;

use crate::config::ScaleMode;
use crate::error::ParallaxError;
use crate::geometry::{Rect, SurfaceGeometry};
use crate::layer::{Layer, LayerRegistry, LayerSlot};
use crate::surface::{LayerState, Surface};

/// Raster-to-surface scale factor for a raster of height `raster_height`.
#[must_use]
pub fn scale_for(mode: ScaleMode, raster_height: f64, geometry: &SurfaceGeometry) -> f64 {
    match mode {
        ScaleMode::Native => 1.0,
        ScaleMode::FitHeight => {
            if raster_height > 0.0 {
                geometry.physical_height / raster_height
            } else {
                1.0
            }
        }
    }
}

/// Width of the raster strip that fills the surface, in raster pixels.
#[must_use]
pub fn visible_source_width(mode: ScaleMode, raster_height: f64, geometry: &SurfaceGeometry) -> f64 {
    geometry.physical_width / scale_for(mode, raster_height, geometry)
}

/// Largest offset magnitude before the bound layer runs out of raster.
///
/// `(W - V) / 2 / speed` where `V` is the visible source width; zero when the
/// raster is no wider than the visible strip or the layer does not move.
#[must_use]
pub fn max_scroll(width: f64, height: f64, speed: f64, mode: ScaleMode, geometry: &SurfaceGeometry) -> f64 {
    let visible = visible_source_width(mode, height, geometry);
    if width <= visible || speed <= 0.0 || !speed.is_finite() {
        return 0.0;
    }
    (width - visible) / 2.0 / speed
}

/// Bound for a whole registry, taken from its last (foreground) layer.
#[must_use]
pub fn registry_max_scroll<S: Surface>(layers: &LayerRegistry<S>, mode: ScaleMode, geometry: &SurfaceGeometry) -> f64 {
    match layers.last() {
        Some(bound) if bound.is_loaded() => max_scroll(bound.width(), bound.height(), bound.speed(), mode, geometry),
        _ => 0.0,
    }
}

/// The raster region drawn for a layer at `offset`.
///
/// Centred in the raster, shifted by `offset * speed`, and clamped to
/// `[0, width - visible]` so no pixel outside the raster is ever sampled, even
/// when the raster is narrower than the surface.
#[must_use]
pub fn source_rect(
    width: f64,
    height: f64,
    speed: f64,
    offset: f64,
    mode: ScaleMode,
    geometry: &SurfaceGeometry,
) -> Rect {
    let visible = visible_source_width(mode, height, geometry);
    let sample_width = visible.min(width);
    let slack = (width - visible).max(0.0);
    let x = ((width - visible) / 2.0 + offset * speed).clamp(0.0, slack);
    Rect::new(x, 0.0, sample_width, height)
}

/// Result of one composite pass.
#[derive(Debug, Default)]
pub struct Composite {
    /// Layers drawn successfully.
    pub drawn: usize,
    /// Per-layer failures; the other layers were still drawn.
    pub failures: Vec<ParallaxError>,
}

/// Draw every loaded layer in registration order.
///
/// A failing hook or draw call is recorded against its layer and skipped.
///
/// # Errors
///
/// Returns [`ParallaxError::Surface`] only when the surface cannot be cleared.
pub fn compose<S: Surface>(
    surface: &mut S,
    layers: &mut LayerRegistry<S>,
    offset: f64,
    mode: ScaleMode,
    geometry: &SurfaceGeometry,
    tick: u64,
) -> Result<Composite, ParallaxError> {
    surface.clear(geometry).map_err(|e| ParallaxError::Surface(e.to_string()))?;

    let dst = geometry.bounds();
    let mut out = Composite::default();
    for (index, layer) in layers.iter_mut().enumerate() {
        if !layer.is_loaded() {
            continue;
        }
        let (width, height, speed) = (layer.width(), layer.height(), layer.speed());
        let src = source_rect(width, height, speed, offset, mode, geometry);
        let state = LayerState { index, speed, width, height, offset: offset * speed };

        match draw_layer(surface, layer, src, dst, &state, tick) {
            Ok(()) => out.drawn += 1,
            Err(cause) => {
                log::warn!("layer {} failed to draw: {cause}", layer.name());
                out.failures.push(ParallaxError::RuntimeDraw { layer: layer.name().to_string(), cause });
            }
        }
    }
    Ok(out)
}

fn draw_layer<S: Surface>(
    surface: &mut S,
    layer: &mut Layer<S>,
    src: Rect,
    dst: Rect,
    state: &LayerState,
    tick: u64,
) -> Result<(), String> {
    let Layer { slot: LayerSlot::Loaded(source), hook, buffer, .. } = layer else {
        return Err("layer is not loaded".to_string());
    };
    let Some(hook) = hook.as_mut() else {
        return surface.draw(source, src, dst).map_err(|e| e.to_string());
    };

    if buffer.is_none() {
        *buffer = Some(surface.create_buffer(state.width, state.height).map_err(|e| e.to_string())?);
    }
    let buffer = buffer.as_ref().ok_or_else(|| "offscreen buffer unavailable".to_string())?;
    surface.paint_buffer(buffer, source, hook, state, tick).map_err(|e| e.to_string())?;
    surface.draw(buffer, src, dst).map_err(|e| e.to_string())
}
