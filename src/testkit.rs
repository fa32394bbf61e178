//! Recording surface used by unit tests in place of a browser canvas.

use std::cell::RefCell;

use crate::geometry::{Rect, SurfaceGeometry};
use crate::layer::{LayerDescriptor, LayerSource};
use crate::surface::{LayerState, Raster, RenderHook, Surface};

/// A sized raster with an identity so draw calls can be traced back to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestRaster {
    pub id: u32,
    pub width: f64,
    pub height: f64,
}

impl TestRaster {
    pub fn new(id: u32, width: f64, height: f64) -> Self {
        Self { id, width, height }
    }
}

impl Raster for TestRaster {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

/// One recorded `draw` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub source: u32,
    pub src: Rect,
    pub dst: Rect,
}

/// Context handed to render hooks: a log of the marks they drew.
#[derive(Debug, Default)]
pub struct HookLog {
    pub marks: RefCell<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub size: Option<SurfaceGeometry>,
    pub clears: usize,
    pub draws: Vec<DrawCall>,
    pub buffers_created: u32,
    pub painted: Vec<(u32, u32)>,
    pub hooks: HookLog,
    /// Draws from this source id fail.
    pub fail_source: Option<u32>,
    pub fail_clear: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls issued since the last clear.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.draws
    }
}

impl Surface for RecordingSurface {
    type Source = TestRaster;
    type Context = HookLog;
    type Error = String;

    fn resize(&mut self, geometry: &SurfaceGeometry) -> Result<(), String> {
        self.size = Some(*geometry);
        Ok(())
    }

    fn clear(&mut self, _geometry: &SurfaceGeometry) -> Result<(), String> {
        if self.fail_clear {
            return Err("clear failed".into());
        }
        self.clears += 1;
        self.draws.clear();
        Ok(())
    }

    fn draw(&mut self, source: &TestRaster, src: Rect, dst: Rect) -> Result<(), String> {
        if self.fail_source == Some(source.id) {
            return Err(format!("cannot draw raster {}", source.id));
        }
        self.draws.push(DrawCall { source: source.id, src, dst });
        Ok(())
    }

    fn create_buffer(&mut self, width: f64, height: f64) -> Result<TestRaster, String> {
        self.buffers_created += 1;
        Ok(TestRaster::new(1000 + self.buffers_created, width, height))
    }

    fn paint_buffer(
        &mut self,
        buffer: &TestRaster,
        base: &TestRaster,
        hook: &mut RenderHook<Self>,
        state: &LayerState,
        tick: u64,
    ) -> Result<(), String> {
        self.painted.push((buffer.id, base.id));
        hook(&self.hooks, state, tick)
    }
}

pub fn ready(id: u32, width: f64, height: f64) -> LayerSource<TestRaster> {
    LayerSource::Ready(TestRaster::new(id, width, height))
}

pub fn layer(name: &str, id: u32, width: f64, height: f64, speed: f64) -> LayerDescriptor<RecordingSurface> {
    LayerDescriptor::new(name, ready(id, width, height), speed)
}

/// Hook that records `"<index>@<tick>"` for every call.
pub fn marking_hook() -> RenderHook<RecordingSurface> {
    Box::new(|log: &HookLog, state: &LayerState, tick: u64| {
        log.marks.borrow_mut().push(format!("{}@{tick}", state.index));
        Ok(())
    })
}

/// Hook that always fails.
pub fn failing_hook() -> RenderHook<RecordingSurface> {
    Box::new(|_: &HookLog, _: &LayerState, _: u64| Err("hook exploded".to_string()))
}
