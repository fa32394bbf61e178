use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Event, HtmlCanvasElement, PointerEvent, WheelEvent};

use crate::compositor;
use crate::config::{EngineConfig, validate_size};
use crate::error::{ParallaxError, js_cause};
use crate::geometry::SurfaceGeometry;
use crate::input::{Gesture, InputAdapter, InputEvent, WheelMode, capture_target};
use crate::layer::{LayerDescriptor, LayerProgress, LayerRegistry};
use crate::physics::{Phase, ScrollLimits, ScrollPhysics};
use crate::render::CanvasSurface;
use crate::scheduler::{AnimationLoop, FrameClock, now_ms};
use crate::surface::Surface;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

type ReadyFn = Box<dyn FnMut()>;
type ScrollFn = Box<dyn FnMut(f64)>;
type ProgressFn = Box<dyn FnMut(&LayerProgress)>;
type ErrorFn = Box<dyn FnMut(&ParallaxError)>;

/// An outward notification to the host.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notice {
    Ready,
    Scroll(f64),
    LayerLoaded(LayerProgress),
    Error(ParallaxError),
}

/// Lifecycle callbacks invoked outward to the host.
///
/// Every callback is optional. Without `on_error`, errors are logged with
/// `log::error!`.
#[derive(Default)]
pub struct Callbacks {
    ready: Option<ReadyFn>,
    scroll: Option<ScrollFn>,
    layer_load: Option<ProgressFn>,
    error: Option<ErrorFn>,
}

impl Callbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once all layers are loaded and the first frame is scheduled.
    #[must_use]
    pub fn on_ready(mut self, f: impl FnMut() + 'static) -> Self {
        self.ready = Some(Box::new(f));
        self
    }

    /// Called with the offset after every drawn frame.
    #[must_use]
    pub fn on_scroll(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.scroll = Some(Box::new(f));
        self
    }

    /// Called after each layer finishes loading.
    #[must_use]
    pub fn on_layer_load(mut self, f: impl FnMut(&LayerProgress) + 'static) -> Self {
        self.layer_load = Some(Box::new(f));
        self
    }

    /// Called for load failures and per-layer draw failures.
    #[must_use]
    pub fn on_error(mut self, f: impl FnMut(&ParallaxError) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub(crate) fn deliver(&mut self, notice: &Notice) {
        match notice {
            Notice::Ready => {
                if let Some(f) = self.ready.as_mut() {
                    f();
                }
            }
            Notice::Scroll(offset) => {
                if let Some(f) = self.scroll.as_mut() {
                    f(*offset);
                }
            }
            Notice::LayerLoaded(progress) => {
                if let Some(f) = self.layer_load.as_mut() {
                    f(progress);
                }
            }
            Notice::Error(err) => {
                if let Some(f) = self.error.as_mut() {
                    f(err);
                } else {
                    log::error!("{err}");
                }
            }
        }
    }
}

/// Holds notices raised while the engine is borrowed and delivers them to the
/// host's callbacks afterwards, so a callback may call back into the engine.
struct Outbox {
    queue: Rc<RefCell<VecDeque<Notice>>>,
    callbacks: RefCell<Callbacks>,
}

impl Outbox {
    fn new(callbacks: Callbacks) -> Self {
        Self { queue: Rc::default(), callbacks: RefCell::new(callbacks) }
    }

    /// Callbacks for the core that only enqueue.
    fn forwarding(&self) -> Callbacks {
        let (ready, scroll, load, error) =
            (Rc::clone(&self.queue), Rc::clone(&self.queue), Rc::clone(&self.queue), Rc::clone(&self.queue));
        Callbacks::new()
            .on_ready(move || ready.borrow_mut().push_back(Notice::Ready))
            .on_scroll(move |offset| scroll.borrow_mut().push_back(Notice::Scroll(offset)))
            .on_layer_load(move |p| load.borrow_mut().push_back(Notice::LayerLoaded(p.clone())))
            .on_error(move |err| error.borrow_mut().push_back(Notice::Error(err.clone())))
    }

    fn push(&self, notice: Notice) {
        self.queue.borrow_mut().push_back(notice);
    }

    /// Deliver queued notices in order. A flush from inside a callback
    /// returns at once; the outer flush picks up whatever it queued.
    fn flush(&self) {
        let Ok(mut callbacks) = self.callbacks.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(notice) = next else {
                break;
            };
            callbacks.deliver(&notice);
        }
    }
}

/// What one scheduler tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub dt: f64,
    pub tick: u64,
    /// Whether the frame was redrawn.
    pub drawn: bool,
}

/// Core engine state — all logic that doesn't depend on the browser.
///
/// Generic over the drawing [`Surface`] so it can be tested without WASM.
/// Offsets are physical pixels.
pub struct EngineCore<S: Surface> {
    surface: S,
    config: EngineConfig,
    geometry: SurfaceGeometry,
    layers: Option<LayerRegistry<S>>,
    physics: ScrollPhysics,
    input: InputAdapter,
    clock: FrameClock,
    needs_render: bool,
    callbacks: Callbacks,
    destroyed: bool,
}

impl<S: Surface> EngineCore<S> {
    /// Validate the configuration and build an uninitialized engine.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] if `config` is invalid.
    pub fn new(surface: S, config: EngineConfig, callbacks: Callbacks) -> Result<Self, ParallaxError> {
        config.validate()?;
        let geometry = SurfaceGeometry::new(config.width, config.height, config.device_pixel_ratio.unwrap_or(1.0));
        Ok(Self {
            surface,
            config,
            geometry,
            layers: None,
            physics: ScrollPhysics::new(config.physics),
            input: InputAdapter::new(config.input),
            clock: FrameClock::new(),
            needs_render: true,
            callbacks,
            destroyed: false,
        })
    }

    // --- Lifecycle ---

    /// Load every layer, size the surface, start the frame clock, and fire
    /// `on_ready`.
    ///
    /// # Errors
    ///
    /// Returns the load or surface error after reporting it through `on_error`;
    /// the engine stays uninitialized. A second call fails with
    /// [`ParallaxError::AlreadyInitialized`] before loading anything and keeps
    /// the installed layers.
    pub async fn init(&mut self, layers: Vec<LayerDescriptor<S>>, now: f64) -> Result<(), ParallaxError> {
        let result = if self.layers.is_some() {
            Err(ParallaxError::AlreadyInitialized)
        } else {
            let callbacks = &mut self.callbacks;
            let loaded = LayerRegistry::load(layers, |p| callbacks.deliver(&Notice::LayerLoaded(p))).await;
            loaded.and_then(|registry| self.install(registry, now))
        };
        if let Err(err) = &result {
            self.report(err);
        }
        result?;
        self.mark_ready();
        Ok(())
    }

    /// Adopt a fully loaded registry and start the frame clock.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Destroyed`] after `destroy`,
    /// [`ParallaxError::AlreadyInitialized`] if layers are already installed,
    /// [`ParallaxError::NotInitialized`] if any layer is still pending, or
    /// [`ParallaxError::Surface`] if the surface cannot be sized.
    pub fn install(&mut self, layers: LayerRegistry<S>, now: f64) -> Result<(), ParallaxError> {
        if self.destroyed {
            return Err(ParallaxError::Destroyed);
        }
        if self.layers.is_some() {
            return Err(ParallaxError::AlreadyInitialized);
        }
        if !layers.all_loaded() {
            return Err(ParallaxError::NotInitialized);
        }
        self.surface.resize(&self.geometry).map_err(|e| ParallaxError::Surface(e.to_string()))?;
        log::debug!(
            "installed {} layers on {}x{} surface",
            layers.len(),
            self.geometry.physical_width,
            self.geometry.physical_height
        );
        self.layers = Some(layers);
        self.refresh_bounds();
        self.needs_render = true;
        self.clock.start(now);
        Ok(())
    }

    /// Fire `on_ready`.
    pub fn mark_ready(&mut self) {
        self.callbacks.deliver(&Notice::Ready);
    }

    /// Stop the frame clock. Input still updates state; nothing is drawn.
    pub fn pause(&mut self) {
        self.clock.stop();
    }

    /// Restart the frame clock from `now`. No-op before init or after destroy.
    pub fn resume(&mut self, now: f64) {
        if self.destroyed || self.layers.is_none() || self.clock.is_running() {
            return;
        }
        self.clock.start(now);
        self.needs_render = true;
    }

    /// Detach input and stop the clock for good. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.clock.stop();
        self.input.detach();
        self.physics.stop();
        log::debug!("engine destroyed");
    }

    /// Change the logical surface size, keeping the device pixel ratio.
    /// The offset is preserved and re-clamped to the new bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] for a non-positive size,
    /// [`ParallaxError::Destroyed`] after `destroy`, or
    /// [`ParallaxError::Surface`] if the surface cannot be resized.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ParallaxError> {
        if self.destroyed {
            return Err(ParallaxError::Destroyed);
        }
        validate_size(width, height)?;
        self.config.width = width;
        self.config.height = height;
        self.geometry = SurfaceGeometry::new(width, height, self.geometry.device_pixel_ratio);
        if self.layers.is_some() {
            self.surface.resize(&self.geometry).map_err(|e| ParallaxError::Surface(e.to_string()))?;
        }
        self.refresh_bounds();
        self.needs_render = true;
        Ok(())
    }

    // --- Scrolling ---

    /// Jump to `offset` (physical px), clamped to the limits.
    ///
    /// `_animated` is accepted for API compatibility; scrolling is always an
    /// immediate jump.
    pub fn scroll_to(&mut self, offset: f64, _animated: bool) {
        if self.destroyed {
            return;
        }
        self.physics.jump_to(offset);
        self.needs_render = true;
    }

    /// Jump by `delta` physical px relative to the current offset.
    pub fn scroll_by(&mut self, delta: f64, animated: bool) {
        self.scroll_to(self.physics.offset() + delta, animated);
    }

    /// Ask for a redraw on the next tick.
    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    // --- Input ---

    /// Apply one host input event at time `now`. Returns whether scroll state
    /// changed; for a pointer down, whether the pointer became the drag
    /// pointer. Ignored before init and after destroy.
    pub fn handle_input(&mut self, event: InputEvent, now: f64) -> bool {
        if self.destroyed || self.layers.is_none() {
            return false;
        }
        let Some(gesture) = self.input.translate(event, &self.geometry) else {
            return false;
        };
        let changed = match gesture {
            Gesture::Start(x) => {
                self.physics.begin_drag(x, now);
                true
            }
            Gesture::Move(x) => self.physics.drag_to(x, now),
            Gesture::End => {
                self.physics.end_drag(now);
                true
            }
            Gesture::Wheel(delta) => self.physics.wheel(delta, now),
        };
        if changed {
            self.needs_render = true;
        }
        changed
    }

    // --- Frame ---

    /// Advance one frame: close a quiet wheel session, integrate momentum,
    /// and redraw if anything could have changed. Returns `None` while paused.
    pub fn tick(&mut self, now: f64) -> Option<TickOutcome> {
        if self.destroyed {
            return None;
        }
        let frame = self.clock.advance(now)?;

        if self.physics.settle_wheel(now) {
            self.needs_render = true;
        }
        if self.physics.step(frame.dt) {
            self.needs_render = true;
        }

        let drawn = self.should_draw() && self.draw(frame.tick);
        Some(TickOutcome { dt: frame.dt, tick: frame.tick, drawn })
    }

    fn should_draw(&self) -> bool {
        self.needs_render
            || self.physics.phase().is_moving()
            || self.layers.as_ref().is_some_and(LayerRegistry::has_render_hooks)
    }

    fn draw(&mut self, tick: u64) -> bool {
        let Some(layers) = self.layers.as_mut() else {
            return false;
        };
        let offset = self.physics.offset();
        match compositor::compose(&mut self.surface, layers, offset, self.config.scale_mode, &self.geometry, tick) {
            Ok(composite) => {
                for failure in &composite.failures {
                    self.callbacks.deliver(&Notice::Error(failure.clone()));
                }
            }
            Err(err) => {
                self.callbacks.deliver(&Notice::Error(err));
                return false;
            }
        }
        self.needs_render = false;
        self.callbacks.deliver(&Notice::Scroll(offset));
        true
    }

    fn refresh_bounds(&mut self) {
        let max = self
            .layers
            .as_ref()
            .map_or(0.0, |layers| compositor::registry_max_scroll(layers, self.config.scale_mode, &self.geometry));
        self.physics.set_max_scroll(max);
    }

    fn report(&mut self, err: &ParallaxError) {
        self.callbacks.deliver(&Notice::Error(err.clone()));
    }

    // --- Queries ---

    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.physics.offset()
    }

    #[must_use]
    pub fn scroll_limits(&self) -> ScrollLimits {
        self.physics.limits()
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.physics.velocity()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.physics.phase()
    }

    #[must_use]
    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn layers(&self) -> Option<&LayerRegistry<S>> {
        self.layers.as_ref()
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.layers.is_some() && !self.destroyed
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }
}

// =============================================================
// Browser engine
// =============================================================

/// A DOM listener that removes itself when dropped.
struct Listener {
    target: HtmlCanvasElement,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {} listener: {}", self.kind, js_cause(&err));
        }
    }
}

/// Maps a DOM event to an engine input event, or `None` to ignore it.
type EventMapper = fn(&HtmlCanvasElement, &Event, bool) -> Option<InputEvent>;

/// The browser engine. Wraps `EngineCore` and owns the canvas element, its
/// input listeners, and the animation-frame loop.
///
/// Cloning yields another handle to the same engine, so a clone can be moved
/// into `spawn_local` to run [`Engine::init`].
#[derive(Clone)]
pub struct Engine {
    canvas: HtmlCanvasElement,
    core: Rc<RefCell<EngineCore<CanvasSurface>>>,
    frames: Rc<AnimationLoop>,
    listeners: Rc<RefCell<Vec<Listener>>>,
    outbox: Rc<Outbox>,
    /// Set by `destroy` even when the core is busy; the next frame or call
    /// finishes the teardown.
    destroyed: Rc<Cell<bool>>,
}

impl Engine {
    /// Create an engine bound to `canvas`. When the configuration leaves the
    /// device pixel ratio unset, it is sampled from the window once, here.
    ///
    /// Callbacks run after the engine has finished the call or frame that
    /// raised them, so they may call any engine method.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] if the canvas is missing, has no
    /// 2D context, or the configuration is invalid.
    pub fn new(
        canvas: Option<HtmlCanvasElement>,
        mut config: EngineConfig,
        callbacks: Callbacks,
    ) -> Result<Self, ParallaxError> {
        let canvas = canvas.ok_or_else(|| ParallaxError::Configuration("canvas element required".into()))?;
        if config.device_pixel_ratio.is_none() {
            config.device_pixel_ratio = Some(web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()));
        }
        let surface = CanvasSurface::new(canvas.clone())?;
        let outbox = Outbox::new(callbacks);
        let core = EngineCore::new(surface, config, outbox.forwarding())?;
        Ok(Self {
            canvas,
            core: Rc::new(RefCell::new(core)),
            frames: Rc::new(AnimationLoop::new()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            outbox: Rc::new(outbox),
            destroyed: Rc::new(Cell::new(false)),
        })
    }

    /// Load the layers, size the canvas, attach input, and start the frame loop.
    ///
    /// No engine borrow is held while sources resolve, so the host may call
    /// other methods meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::AlreadyInitialized`] on a second call, or the
    /// first load, surface, or listener error; it is also reported through
    /// `on_error`.
    pub async fn init(&self, layers: Vec<LayerDescriptor<CanvasSurface>>) -> Result<(), ParallaxError> {
        let result = self.load_and_start(layers).await;
        if let Err(err) = &result {
            self.outbox.push(Notice::Error(err.clone()));
        } else {
            self.with_core(EngineCore::mark_ready);
        }
        self.outbox.flush();
        result
    }

    async fn load_and_start(&self, layers: Vec<LayerDescriptor<CanvasSurface>>) -> Result<(), ParallaxError> {
        if self.destroyed.get() {
            return Err(ParallaxError::Destroyed);
        }
        if self.is_initialized() {
            return Err(ParallaxError::AlreadyInitialized);
        }
        let outbox = Rc::clone(&self.outbox);
        let registry = LayerRegistry::load(layers, move |progress| {
            outbox.push(Notice::LayerLoaded(progress));
            outbox.flush();
        })
        .await?;
        if self.destroyed.get() {
            return Err(ParallaxError::Destroyed);
        }
        self.start(registry)
    }

    fn start(&self, registry: LayerRegistry<CanvasSurface>) -> Result<(), ParallaxError> {
        let input_enabled = {
            let mut core = self.core.borrow_mut();
            core.install(registry, now_ms())?;
            core.config().input.enabled
        };
        if input_enabled {
            self.attach_listeners()
                .map_err(|e| ParallaxError::Configuration(format!("cannot attach input: {}", js_cause(&e))))?;
        }
        self.start_loop()
    }

    fn start_loop(&self) -> Result<(), ParallaxError> {
        if self.destroyed.get() {
            return Ok(());
        }
        let core = Rc::clone(&self.core);
        let outbox = Rc::clone(&self.outbox);
        let destroyed = Rc::clone(&self.destroyed);
        self.frames
            .start(move |ts| {
                if let Ok(mut core) = core.try_borrow_mut() {
                    core.tick(ts);
                    if destroyed.get() {
                        core.destroy();
                    }
                } else {
                    log::warn!("frame skipped: engine busy");
                }
                outbox.flush();
            })
            .map_err(|e| ParallaxError::Surface(format!("cannot schedule frames: {}", js_cause(&e))))
    }

    fn attach_listeners(&self) -> Result<(), JsValue> {
        if !self.listeners.borrow().is_empty() {
            log::debug!("input listeners already attached");
            return Ok(());
        }
        let mapped: [(&'static str, EventMapper); 5] = [
            ("pointerdown", map_pointer_down),
            ("pointermove", map_pointer_move),
            ("pointerup", map_pointer_up),
            ("pointercancel", map_pointer_up),
            ("wheel", map_wheel),
        ];
        let capture = self.core.borrow().config().input.capture_pointer;
        for (kind, map) in mapped {
            self.listen(kind, map, capture)?;
        }
        Ok(())
    }

    fn listen(&self, kind: &'static str, map: EventMapper, capture: bool) -> Result<(), JsValue> {
        let core = Rc::clone(&self.core);
        let canvas = self.canvas.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            let Some(input) = map(&canvas, &event, capture) else {
                return;
            };
            let accepted = if let Ok(mut core) = core.try_borrow_mut() {
                core.handle_input(input, now_ms())
            } else {
                log::warn!("{kind} dropped: engine busy");
                false
            };
            if let Some(id) = capture_target(input, accepted, capture) {
                if let Err(err) = canvas.set_pointer_capture(id) {
                    log::debug!("pointer capture failed: {}", js_cause(&err));
                }
            }
        }) as Box<dyn FnMut(Event)>);

        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        self.canvas.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        self.listeners.borrow_mut().push(Listener { target: self.canvas.clone(), kind, callback });
        Ok(())
    }

    /// Run `f` on the core, then deliver any callbacks it raised. Returns
    /// `None` when the core is busy or destroyed.
    fn with_core<R>(&self, f: impl FnOnce(&mut EngineCore<CanvasSurface>) -> R) -> Option<R> {
        if self.destroyed.get() {
            return None;
        }
        let out = if let Ok(mut core) = self.core.try_borrow_mut() {
            Some(f(&mut core))
        } else {
            log::warn!("engine call ignored: engine busy");
            None
        };
        self.outbox.flush();
        out
    }

    // --- Public operations ---

    pub fn scroll_to(&self, offset: f64, animated: bool) {
        self.with_core(|core| core.scroll_to(offset, animated));
    }

    pub fn scroll_by(&self, delta: f64, animated: bool) {
        self.with_core(|core| core.scroll_by(delta, animated));
    }

    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.core.try_borrow().map_or(0.0, |core| core.scroll_offset())
    }

    #[must_use]
    pub fn scroll_limits(&self) -> ScrollLimits {
        self.core
            .try_borrow()
            .map_or(ScrollLimits { min: 0.0, max: 0.0 }, |core| core.scroll_limits())
    }

    /// Cancel the frame loop. Input still moves the offset; nothing is drawn.
    pub fn pause(&self) {
        self.frames.stop();
        self.with_core(EngineCore::pause);
    }

    /// Restart the frame loop with a fresh timestamp. No-op after `destroy`.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Surface`] if no animation frame can be requested.
    pub fn resume(&self) -> Result<(), ParallaxError> {
        let resumed = self.with_core(|core| {
            core.resume(now_ms());
            core.is_running()
        });
        if resumed == Some(true) && !self.frames.is_running() {
            self.start_loop()?;
        }
        Ok(())
    }

    /// Change the logical canvas size.
    ///
    /// # Errors
    ///
    /// See [`EngineCore::resize`]. Returns [`ParallaxError::Destroyed`] after
    /// `destroy`.
    pub fn resize(&self, width: f64, height: f64) -> Result<(), ParallaxError> {
        if self.destroyed.get() {
            return Err(ParallaxError::Destroyed);
        }
        self.with_core(|core| core.resize(width, height)).unwrap_or(Ok(()))
    }

    /// Stop the loop and remove every listener. Idempotent, and safe to call
    /// from any callback.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.frames.stop();
        self.listeners.borrow_mut().clear();
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.destroy();
        } else {
            log::debug!("engine busy; teardown finishes after the current frame");
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.destroyed.get() && self.core.try_borrow().is_ok_and(|core| core.is_initialized())
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

// =============================================================
// DOM event mapping
// =============================================================

fn map_pointer_down(_canvas: &HtmlCanvasElement, event: &Event, _capture: bool) -> Option<InputEvent> {
    let pe = event.dyn_ref::<PointerEvent>()?;
    event.prevent_default();
    Some(InputEvent::PointerDown { id: pe.pointer_id(), x: f64::from(pe.client_x()) })
}

fn map_pointer_move(_canvas: &HtmlCanvasElement, event: &Event, _capture: bool) -> Option<InputEvent> {
    let pe = event.dyn_ref::<PointerEvent>()?;
    Some(InputEvent::PointerMove { id: pe.pointer_id(), x: f64::from(pe.client_x()) })
}

fn map_pointer_up(canvas: &HtmlCanvasElement, event: &Event, capture: bool) -> Option<InputEvent> {
    let pe = event.dyn_ref::<PointerEvent>()?;
    let id = pe.pointer_id();
    if capture && canvas.has_pointer_capture(id) {
        if let Err(err) = canvas.release_pointer_capture(id) {
            log::debug!("pointer release failed: {}", js_cause(&err));
        }
    }
    if event.type_() == "pointercancel" {
        Some(InputEvent::PointerCancel { id })
    } else {
        Some(InputEvent::PointerUp { id })
    }
}

fn map_wheel(_canvas: &HtmlCanvasElement, event: &Event, _capture: bool) -> Option<InputEvent> {
    let we = event.dyn_ref::<WheelEvent>()?;
    event.prevent_default();
    Some(InputEvent::Wheel { dx: we.delta_x(), dy: we.delta_y(), mode: WheelMode::from_dom(we.delta_mode()) })
}
