//! Rendering: the `Canvas2D` drawing surface, image sources, and decoration
//! hooks.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! [`CanvasSurface`] implements [`Surface`] over one on-screen canvas and any
//! number of offscreen buffer canvases. Layer rasters are [`WebRaster`]s:
//! decoded images or canvases. Decorations draw either every frame through a
//! render hook or once at load through [`decorated_image`].
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`;
//! at the [`Surface`] boundary they become [`CanvasError`].

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::consts::{
    CENTER_DOT_SIZE_PX, RULER_FONT_SIZE_PX, RULER_INTERVAL_PX, RULER_LINE_WIDTH_PX, RULER_TICK_HEIGHT_PX,
};
use crate::error::{ParallaxError, js_cause};
use crate::geometry::{Rect, SurfaceGeometry};
use crate::layer::LayerSource;
use crate::surface::{LayerState, Raster, RenderHook, Surface};

/// A failed `Canvas2D` call, rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CanvasError(pub String);

impl From<JsValue> for CanvasError {
    fn from(value: JsValue) -> Self {
        Self(js_cause(&value))
    }
}

/// A drawable browser raster.
#[derive(Debug, Clone)]
pub enum WebRaster {
    Image(HtmlImageElement),
    Canvas(HtmlCanvasElement),
}

impl WebRaster {
    /// Accept an `HTMLImageElement` or `HTMLCanvasElement` from the host.
    ///
    /// # Errors
    ///
    /// Returns `Err` for any other value.
    pub fn from_js(value: JsValue) -> Result<Self, String> {
        let value = match value.dyn_into::<HtmlImageElement>() {
            Ok(img) => return Ok(Self::Image(img)),
            Err(value) => value,
        };
        value
            .dyn_into::<HtmlCanvasElement>()
            .map(Self::Canvas)
            .map_err(|_| "invalid image type".to_string())
    }
}

impl Raster for WebRaster {
    fn width(&self) -> f64 {
        match self {
            Self::Image(img) => f64::from(img.natural_width()),
            Self::Canvas(canvas) => f64::from(canvas.width()),
        }
    }

    fn height(&self) -> f64 {
        match self {
            Self::Image(img) => f64::from(img.natural_height()),
            Self::Canvas(canvas) => f64::from(canvas.height()),
        }
    }
}

// =============================================================
// Sources
// =============================================================

/// Fetch and decode an image by URL.
#[must_use]
pub fn load_image(url: &str) -> LayerSource<WebRaster> {
    let url = url.to_string();
    LayerSource::pending(async move { decode_image(&url).await.map(WebRaster::Image) })
}

/// Fetch an image and bake `decorations` into a canvas copy of it, once.
///
/// Unlike [`ruler_hook`] and [`center_dot_hook`], the result is a static
/// raster, so the engine can still skip idle frames.
#[must_use]
pub fn decorated_image(url: &str, decorations: Decorations) -> LayerSource<WebRaster> {
    if decorations.is_empty() {
        return load_image(url);
    }
    let url = url.to_string();
    LayerSource::pending(async move {
        let img = decode_image(&url).await?;
        bake(&img, &decorations).map_err(|e| format!("failed to decorate image: {url}: {}", js_cause(&e)))
    })
}

async fn decode_image(url: &str) -> Result<HtmlImageElement, String> {
    let img = HtmlImageElement::new().map_err(|e| format!("failed to load image: {url}: {}", js_cause(&e)))?;
    img.set_src(url);
    JsFuture::from(img.decode())
        .await
        .map_err(|_| format!("failed to load image: {url}"))?;
    Ok(img)
}

fn bake(img: &HtmlImageElement, decorations: &Decorations) -> Result<WebRaster, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("created element is not a canvas"))?;
    canvas.set_width(img.natural_width());
    canvas.set_height(img.natural_height());

    let ctx = context_2d(&canvas)?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0)?;
    let (width, height) = (f64::from(canvas.width()), f64::from(canvas.height()));
    if let Some(ruler) = &decorations.ruler {
        draw_ruler(&ctx, width, height, ruler)?;
    }
    if let Some(dot) = &decorations.center_dot {
        draw_center_dot(&ctx, width, height, dot);
    }
    Ok(WebRaster::Canvas(canvas))
}

/// Use an image element the host already created, waiting for it to finish
/// decoding if it has not yet.
#[must_use]
pub fn image_source(img: HtmlImageElement) -> LayerSource<WebRaster> {
    if img.complete() && img.natural_width() > 0 {
        return LayerSource::Ready(WebRaster::Image(img));
    }
    LayerSource::pending(async move {
        JsFuture::from(img.decode())
            .await
            .map_err(|_| format!("failed to load image: {}", img.src()))?;
        Ok::<_, String>(WebRaster::Image(img))
    })
}

/// Await a host promise resolving to an image or canvas element.
#[must_use]
pub fn promise_source(promise: js_sys::Promise) -> LayerSource<WebRaster> {
    LayerSource::pending(async move {
        let value = JsFuture::from(promise).await.map_err(|e| js_cause(&e))?;
        WebRaster::from_js(value)
    })
}

// =============================================================
// Surface
// =============================================================

/// The on-screen canvas and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, ParallaxError> {
        let ctx = context_2d(&canvas)
            .map_err(|e| ParallaxError::Configuration(format!("2d context unavailable: {}", js_cause(&e))))?;
        Ok(Self { canvas, ctx })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    type Source = WebRaster;
    type Context = CanvasRenderingContext2d;
    type Error = CanvasError;

    fn resize(&mut self, geometry: &SurfaceGeometry) -> Result<(), CanvasError> {
        let (width, height) = geometry.physical_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", geometry.css_width))?;
        style.set_property("height", &format!("{}px", geometry.css_height))?;
        style.set_property("touch-action", "none")?;
        Ok(())
    }

    fn clear(&mut self, geometry: &SurfaceGeometry) -> Result<(), CanvasError> {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        self.ctx
            .clear_rect(0.0, 0.0, geometry.physical_width, geometry.physical_height);
        Ok(())
    }

    fn draw(&mut self, source: &WebRaster, src: Rect, dst: Rect) -> Result<(), CanvasError> {
        draw_raster(&self.ctx, source, src, dst)?;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn create_buffer(&mut self, width: f64, height: f64) -> Result<WebRaster, CanvasError> {
        let document = self
            .canvas
            .owner_document()
            .ok_or_else(|| CanvasError("canvas is not attached to a document".into()))?;
        let buffer = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| CanvasError("created element is not a canvas".into()))?;
        buffer.set_width(width.round() as u32);
        buffer.set_height(height.round() as u32);
        Ok(WebRaster::Canvas(buffer))
    }

    fn paint_buffer(
        &mut self,
        buffer: &WebRaster,
        base: &WebRaster,
        hook: &mut RenderHook<Self>,
        state: &LayerState,
        tick: u64,
    ) -> Result<(), CanvasError> {
        let WebRaster::Canvas(canvas) = buffer else {
            return Err(CanvasError("offscreen buffer must be a canvas".into()));
        };
        let ctx = context_2d(canvas)?;
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, buffer.width(), buffer.height());
        let whole = Rect::new(0.0, 0.0, base.width(), base.height());
        draw_raster(&ctx, base, whole, whole)?;

        ctx.save();
        let painted = hook(&ctx, state, tick);
        ctx.restore();
        painted
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("context is not a CanvasRenderingContext2d"))
}

fn draw_raster(ctx: &CanvasRenderingContext2d, source: &WebRaster, src: Rect, dst: Rect) -> Result<(), JsValue> {
    match source {
        WebRaster::Image(img) => ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            img, src.x, src.y, src.width, src.height, dst.x, dst.y, dst.width, dst.height,
        ),
        WebRaster::Canvas(canvas) => ctx.draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            canvas, src.x, src.y, src.width, src.height, dst.x, dst.y, dst.width, dst.height,
        ),
    }
}

// =============================================================
// Decorations
// =============================================================

/// A horizontal pixel ruler centred on the raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulerConfig {
    /// Spacing between ticks, in raster pixels.
    pub interval: f64,
    pub tick_height: f64,
    pub font_size: f64,
    pub color: String,
    /// Vertical position of the ruler line; defaults to mid-height.
    pub y: Option<f64>,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            interval: RULER_INTERVAL_PX,
            tick_height: RULER_TICK_HEIGHT_PX,
            font_size: RULER_FONT_SIZE_PX,
            color: "#ffffff".into(),
            y: None,
        }
    }
}

/// A small filled square at the raster centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CenterDotConfig {
    pub color: String,
    pub size: f64,
}

impl Default for CenterDotConfig {
    fn default() -> Self {
        Self { color: "#ff0000".into(), size: CENTER_DOT_SIZE_PX }
    }
}

/// Decorations baked into a layer's raster by [`decorated_image`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Decorations {
    pub ruler: Option<RulerConfig>,
    pub center_dot: Option<CenterDotConfig>,
}

impl Decorations {
    /// Ruler and centre dot, both with default settings.
    #[must_use]
    pub fn debug() -> Self {
        Self { ruler: Some(RulerConfig::default()), center_dot: Some(CenterDotConfig::default()) }
    }

    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ParallaxError> {
        serde_json::from_str(json).map_err(|e| ParallaxError::Configuration(format!("decorations: {e}")))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ruler.is_none() && self.center_dot.is_none()
    }
}

/// One ruler tick: its x in raster pixels and its signed label value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerTick {
    pub x: f64,
    pub value: f64,
}

/// Tick positions for a raster `width` wide, counted outward from the centre.
/// Ticks falling outside `[0, width]` are dropped.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn ruler_ticks(width: f64, interval: f64) -> Vec<RulerTick> {
    if !(interval.is_finite() && interval > 0.0 && width.is_finite() && width > 0.0) {
        return Vec::new();
    }
    let center = width / 2.0;
    let steps = (width / interval).floor() as i64;
    (-steps..=steps)
        .map(|i| {
            let value = i as f64 * interval;
            RulerTick { x: center + value, value }
        })
        .filter(|tick| (0.0..=width).contains(&tick.x))
        .collect()
}

/// Top-left corner of the centre dot for a raster of the given size.
#[must_use]
pub fn center_dot_origin(width: f64, height: f64) -> (f64, f64) {
    ((width / 2.0).floor(), (height / 2.0).floor())
}

/// Render hook drawing a ruler over its layer.
#[must_use]
pub fn ruler_hook(config: RulerConfig) -> RenderHook<CanvasSurface> {
    Box::new(move |ctx: &CanvasRenderingContext2d, state: &LayerState, _tick: u64| {
        draw_ruler(ctx, state.width, state.height, &config)?;
        Ok(())
    })
}

/// Render hook drawing a dot at its layer's centre.
#[must_use]
pub fn center_dot_hook(config: CenterDotConfig) -> RenderHook<CanvasSurface> {
    Box::new(move |ctx: &CanvasRenderingContext2d, state: &LayerState, _tick: u64| {
        draw_center_dot(ctx, state.width, state.height, &config);
        Ok(())
    })
}

fn draw_center_dot(ctx: &CanvasRenderingContext2d, width: f64, height: f64, config: &CenterDotConfig) {
    let (x, y) = center_dot_origin(width, height);
    ctx.set_fill_style_str(&config.color);
    ctx.fill_rect(x, y, config.size, config.size);
}

fn draw_ruler(ctx: &CanvasRenderingContext2d, width: f64, height: f64, config: &RulerConfig) -> Result<(), JsValue> {
    let ruler_y = config.y.unwrap_or(height / 2.0);
    let half_tick = config.tick_height / 2.0;

    ctx.set_stroke_style_str(&config.color);
    ctx.set_fill_style_str(&config.color);
    ctx.set_line_width(RULER_LINE_WIDTH_PX);
    ctx.set_font(&format!("{:.0}px monospace", config.font_size));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    for tick in ruler_ticks(width, config.interval) {
        ctx.begin_path();
        ctx.move_to(tick.x, ruler_y - half_tick);
        ctx.line_to(tick.x, ruler_y + half_tick);
        ctx.stroke();
        ctx.fill_text(&tick.value.to_string(), tick.x, ruler_y + half_tick + config.font_size)?;
    }

    ctx.begin_path();
    ctx.move_to(0.0, ruler_y);
    ctx.line_to(width, ruler_y);
    ctx.stroke();
    Ok(())
}
