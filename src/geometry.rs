#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

/// An axis-aligned rectangle in physical (device) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Size of the destination surface in logical and physical pixels.
///
/// `css_width` / `css_height` are in CSS pixels. The physical size is the
/// backing-store size: CSS size times `device_pixel_ratio`, rounded. Geometry is
/// fixed at construction or an explicit resize; it is never re-read from the
/// live viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
    pub physical_width: f64,
    pub physical_height: f64,
}

impl SurfaceGeometry {
    /// Build geometry from a logical size. A non-positive or non-finite ratio
    /// falls back to 1.0.
    #[must_use]
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            css_width,
            css_height,
            device_pixel_ratio: dpr,
            physical_width: (css_width * dpr).round(),
            physical_height: (css_height * dpr).round(),
        }
    }

    /// Convert a CSS-pixel coordinate or distance to physical pixels.
    #[must_use]
    pub fn to_physical(&self, css: f64) -> f64 {
        css * self.device_pixel_ratio
    }

    /// The full destination rectangle in physical pixels.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.physical_width, self.physical_height)
    }

    /// Backing-store size as integers, for the canvas `width`/`height` attributes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn physical_size(&self) -> (u32, u32) {
        (self.physical_width.max(0.0) as u32, self.physical_height.max(0.0) as u32)
    }
}
