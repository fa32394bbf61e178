#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;

use super::*;
use crate::layer::LayerSource;
use crate::testkit::{RecordingSurface, TestRaster, failing_hook, layer, marking_hook, ready};

type Log = Rc<RefCell<Vec<String>>>;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn recording_callbacks(log: &Log) -> Callbacks {
    let (ready, scroll, load, error) = (Rc::clone(log), Rc::clone(log), Rc::clone(log), Rc::clone(log));
    Callbacks::new()
        .on_ready(move || ready.borrow_mut().push("ready".into()))
        .on_scroll(move |offset| scroll.borrow_mut().push(format!("scroll:{offset}")))
        .on_layer_load(move |p| load.borrow_mut().push(format!("load:{} {}/{}", p.name, p.count, p.total)))
        .on_error(move |err| error.borrow_mut().push(format!("error:{err}")))
}

fn three_layers() -> Vec<LayerDescriptor<RecordingSurface>> {
    vec![
        layer("back", 1, 1400.0, 600.0, 0.05),
        layer("middle", 2, 2000.0, 600.0, 0.2),
        layer("front", 3, 3000.0, 600.0, 1.2),
    ]
}

fn core() -> (EngineCore<RecordingSurface>, Log) {
    let log = Log::default();
    let engine =
        EngineCore::new(RecordingSurface::new(), EngineConfig::new(1000.0, 600.0), recording_callbacks(&log)).unwrap();
    (engine, log)
}

fn ready_core(layers: Vec<LayerDescriptor<RecordingSurface>>) -> (EngineCore<RecordingSurface>, Log) {
    let (mut engine, log) = core();
    block_on(engine.init(layers, 0.0)).unwrap();
    log.borrow_mut().clear();
    (engine, log)
}

fn down(id: i32, x: f64) -> InputEvent {
    InputEvent::PointerDown { id, x }
}

fn mv(id: i32, x: f64) -> InputEvent {
    InputEvent::PointerMove { id, x }
}

fn up(id: i32) -> InputEvent {
    InputEvent::PointerUp { id }
}

// =============================================================
// Construction and init
// =============================================================

#[test]
fn new_rejects_missing_size() {
    let result = EngineCore::new(RecordingSurface::new(), EngineConfig::new(0.0, 600.0), Callbacks::new());
    assert!(matches!(result, Err(ParallaxError::Configuration(_))));
}

#[test]
fn new_engine_is_not_initialized() {
    let (mut engine, _) = core();
    assert!(!engine.is_initialized());
    assert!(!engine.handle_input(down(1, 10.0), 0.0));
    assert_eq!(engine.tick(16.0), None);
    assert_eq!(engine.scroll_limits(), ScrollLimits { min: 0.0, max: 0.0 });
}

#[test]
fn init_reports_progress_then_ready() {
    let (mut engine, log) = core();
    block_on(engine.init(three_layers(), 0.0)).unwrap();
    assert!(engine.is_initialized());
    assert!(engine.is_running());
    assert_eq!(*log.borrow(), ["load:back 1/3", "load:middle 2/3", "load:front 3/3", "ready"]);
    assert_eq!(engine.surface().size.map(|g| g.physical_size()), Some((1000, 600)));
}

#[test]
fn init_failure_is_reported_and_engine_stays_uninitialized() {
    let (mut engine, log) = core();
    let broken = LayerDescriptor::new("front", LayerSource::pending(async { Err::<TestRaster, _>("404") }), 1.0);
    let err = block_on(engine.init(vec![layer("back", 1, 1400.0, 600.0, 0.05), broken], 0.0)).unwrap_err();
    assert_eq!(err, ParallaxError::LayerLoad { layer: "front".into(), cause: "404".into() });
    assert!(!engine.is_initialized());
    assert_eq!(*log.borrow(), ["load:back 1/2", "error:failed to load layer \"front\": 404"]);
}

#[test]
fn pending_sources_are_awaited() {
    let (mut engine, _) = core();
    let later = LayerDescriptor::new(
        "front",
        LayerSource::pending(async { Ok::<_, String>(TestRaster::new(3, 3000.0, 600.0)) }),
        1.2,
    );
    block_on(engine.init(vec![later], 0.0)).unwrap();
    assert!(engine.layers().is_some_and(LayerRegistry::all_loaded));
    assert!(approx_eq(engine.scroll_limits().max, 2000.0 / 2.0 / 1.2));
}

#[test]
fn second_init_is_rejected_and_keeps_the_first_layers() {
    let (mut engine, log) = ready_core(three_layers());
    let max = engine.scroll_limits().max;
    let err = block_on(engine.init(vec![layer("other", 9, 9000.0, 600.0, 1.0)], 10.0)).unwrap_err();
    assert_eq!(err, ParallaxError::AlreadyInitialized);
    assert_eq!(engine.layers().map(LayerRegistry::len), Some(3));
    assert_eq!(engine.scroll_limits().max, max);
    assert_eq!(log.borrow().last().map(String::as_str), Some("error:engine is already initialized"));
}

#[test]
fn install_rejects_a_registry_with_pending_layers() {
    let (mut engine, _) = core();
    let registered = LayerRegistry::register(three_layers()).unwrap();
    assert_eq!(engine.install(registered, 0.0), Err(ParallaxError::NotInitialized));
    assert!(!engine.is_initialized());
    assert!(engine.surface().size.is_none());
}

// =============================================================
// Programmatic scrolling
// =============================================================

#[test]
fn limits_are_symmetric_around_zero() {
    let (engine, _) = ready_core(three_layers());
    let limits = engine.scroll_limits();
    assert_eq!(limits.min, -limits.max);
    assert!((limits.max - 833.33).abs() < 0.01);
}

#[test]
fn limits_collapse_when_foreground_fits() {
    let (mut engine, _) = ready_core(vec![layer("front", 1, 640.0, 480.0, 1.0)]);
    assert_eq!(engine.scroll_limits(), ScrollLimits { min: 0.0, max: 0.0 });
    engine.scroll_to(300.0, false);
    assert_eq!(engine.scroll_offset(), 0.0);
}

#[test]
fn scroll_by_round_trips() {
    let (mut engine, _) = ready_core(three_layers());
    engine.scroll_to(100.0, true);
    engine.scroll_by(250.0, false);
    engine.scroll_by(-250.0, false);
    assert!(approx_eq(engine.scroll_offset(), 100.0));
}

#[test]
fn scroll_to_clamps_to_limits() {
    let (mut engine, _) = ready_core(three_layers());
    engine.scroll_to(10_000.0, false);
    assert_eq!(engine.scroll_offset(), engine.scroll_limits().max);
    engine.scroll_to(-10_000.0, false);
    assert_eq!(engine.scroll_offset(), engine.scroll_limits().min);
}

// =============================================================
// Input
// =============================================================

#[test]
fn drag_left_scrolls_right_and_shifts_layers_by_speed() {
    let (mut engine, _) = ready_core(three_layers());
    assert!(engine.handle_input(down(1, 500.0), 100.0));
    assert!(engine.handle_input(mv(1, 0.0), 116.0));
    assert_eq!(engine.scroll_offset(), 500.0);
    assert_eq!(engine.phase(), Phase::Dragging);

    let out = engine.tick(116.0).unwrap();
    assert!(out.drawn);
    let xs: Vec<f64> = engine.surface().last_frame().iter().map(|c| c.src.x).collect();
    assert!(approx_eq(xs[0] - 200.0, 25.0));
    assert!(approx_eq(xs[1] - 500.0, 100.0));
    assert!(approx_eq(xs[2] - 1000.0, 600.0));
}

#[test]
fn drag_past_the_edge_is_clamped() {
    let (mut engine, _) = ready_core(three_layers());
    engine.handle_input(down(1, 5000.0), 0.0);
    engine.handle_input(mv(1, 0.0), 16.0);
    assert_eq!(engine.scroll_offset(), engine.scroll_limits().max);
}

#[test]
fn fling_coasts_until_the_bound_stops_it() {
    let (mut engine, _) = ready_core(three_layers());
    engine.handle_input(down(1, 500.0), 100.0);
    engine.handle_input(mv(1, 0.0), 116.0);
    engine.handle_input(up(1), 116.0);
    assert_eq!(engine.phase(), Phase::Coasting);

    engine.tick(132.0);
    assert_eq!(engine.scroll_offset(), engine.scroll_limits().max);
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.velocity(), 0.0);
}

#[test]
fn second_pointer_is_ignored_while_captured() {
    let (mut engine, _) = ready_core(three_layers());
    engine.handle_input(down(1, 500.0), 0.0);
    assert!(!engine.handle_input(down(2, 100.0), 8.0));
    assert!(!engine.handle_input(mv(2, 0.0), 16.0));
    assert_eq!(engine.scroll_offset(), 0.0);
}

#[test]
fn quiet_wheel_session_releases_into_coasting() {
    let (mut engine, _) = ready_core(three_layers());
    for t in [10.0, 20.0, 30.0] {
        engine.handle_input(InputEvent::Wheel { dx: 10.0, dy: 0.0, mode: WheelMode::Pixel }, t);
    }
    assert_eq!(engine.scroll_offset(), 30.0);

    engine.tick(100.0);
    assert_eq!(engine.phase(), Phase::Wheeling);

    // Idle for 130 ms: the session closes at 1 px/ms and coasts for 60 ms.
    engine.tick(160.0);
    assert_eq!(engine.phase(), Phase::Coasting);
    assert!(approx_eq(engine.scroll_offset(), 90.0));
}

// =============================================================
// Frames
// =============================================================

#[test]
fn idle_frames_are_not_redrawn() {
    let (mut engine, log) = ready_core(three_layers());
    assert!(engine.tick(16.0).unwrap().drawn);
    assert!(!engine.tick(32.0).unwrap().drawn);
    assert!(!engine.tick(48.0).unwrap().drawn);
    assert_eq!(engine.surface().clears, 1);
    assert_eq!(*log.borrow(), ["scroll:0"]);
}

#[test]
fn scroll_request_triggers_one_redraw() {
    let (mut engine, log) = ready_core(three_layers());
    engine.tick(16.0);
    engine.scroll_to(50.0, false);
    assert!(engine.tick(32.0).unwrap().drawn);
    assert!(!engine.tick(48.0).unwrap().drawn);
    assert_eq!(*log.borrow(), ["scroll:0", "scroll:50"]);
}

#[test]
fn render_hooks_force_a_redraw_every_frame() {
    let hooked = LayerDescriptor::new("front", ready(3, 3000.0, 600.0), 1.2).with_render(marking_hook());
    let (mut engine, _) = ready_core(vec![layer("back", 1, 1400.0, 600.0, 0.05), hooked]);
    for t in [16.0, 32.0, 48.0] {
        assert!(engine.tick(t).unwrap().drawn);
    }
    assert_eq!(*engine.surface().hooks.marks.borrow(), ["1@1", "1@2", "1@3"]);
}

#[test]
fn draw_failure_is_reported_and_frame_still_lands() {
    let broken = LayerDescriptor::new("middle", ready(2, 2000.0, 600.0), 0.2).with_render(failing_hook());
    let (mut engine, log) =
        ready_core(vec![layer("back", 1, 1400.0, 600.0, 0.05), broken, layer("front", 3, 3000.0, 600.0, 1.2)]);
    assert!(engine.tick(16.0).unwrap().drawn);
    assert_eq!(*log.borrow(), ["error:failed to draw layer \"middle\": hook exploded", "scroll:0"]);
    assert_eq!(engine.surface().last_frame().len(), 2);
}

#[test]
fn pause_stops_frames_but_not_input() {
    let (mut engine, _) = ready_core(three_layers());
    engine.pause();
    assert_eq!(engine.tick(16.0), None);
    engine.handle_input(down(1, 100.0), 20.0);
    engine.handle_input(mv(1, 0.0), 36.0);
    assert_eq!(engine.scroll_offset(), 100.0);

    engine.resume(5000.0);
    let out = engine.tick(5016.0).unwrap();
    assert_eq!(out.dt, 16.0);
    assert!(out.drawn);
}

// =============================================================
// Resize and destroy
// =============================================================

#[test]
fn resize_recomputes_bounds_and_reclamps() {
    let (mut engine, _) = ready_core(three_layers());
    engine.scroll_to(800.0, false);
    engine.resize(2000.0, 600.0).unwrap();
    // Foreground 3000 wide on a 2000 surface: (3000 - 2000) / 2 / 1.2.
    let max = 1000.0 / 2.0 / 1.2;
    assert!(approx_eq(engine.scroll_limits().max, max));
    assert!(approx_eq(engine.scroll_offset(), max));
    assert_eq!(engine.surface().size.map(|g| g.physical_size()), Some((2000, 600)));
    assert!(engine.tick(16.0).unwrap().drawn);
}

#[test]
fn resize_keeps_device_pixel_ratio() {
    let log = Log::default();
    let config = EngineConfig::new(500.0, 300.0).with_device_pixel_ratio(2.0);
    let mut engine = EngineCore::new(RecordingSurface::new(), config, recording_callbacks(&log)).unwrap();
    block_on(engine.init(three_layers(), 0.0)).unwrap();
    engine.resize(400.0, 300.0).unwrap();
    assert_eq!(engine.geometry().physical_size(), (800, 600));
}

#[test]
fn resize_rejects_non_positive_size() {
    let (mut engine, _) = ready_core(three_layers());
    assert!(matches!(engine.resize(0.0, 600.0), Err(ParallaxError::Configuration(_))));
    assert!(matches!(engine.resize(1000.0, -1.0), Err(ParallaxError::Configuration(_))));
}

#[test]
fn destroy_is_idempotent_and_silences_everything() {
    let (mut engine, log) = ready_core(three_layers());
    engine.destroy();
    engine.destroy();
    assert!(engine.is_destroyed());
    assert!(!engine.is_initialized());
    assert!(!engine.handle_input(down(1, 500.0), 10.0));
    engine.scroll_to(100.0, false);
    assert_eq!(engine.scroll_offset(), 0.0);
    assert_eq!(engine.tick(16.0), None);
    engine.resume(20.0);
    assert_eq!(engine.tick(36.0), None);
    assert_eq!(engine.resize(800.0, 600.0), Err(ParallaxError::Destroyed));
    assert!(log.borrow().is_empty());
}

#[test]
fn destroy_during_load_prevents_install() {
    let (mut engine, log) = core();
    engine.destroy();
    let err = block_on(engine.init(three_layers(), 0.0)).unwrap_err();
    assert_eq!(err, ParallaxError::Destroyed);
    assert!(!log.borrow().contains(&"ready".to_string()));
}

// =============================================================
// Queued callbacks
// =============================================================

type Shared = Rc<RefCell<EngineCore<RecordingSurface>>>;

fn queued_core(outbox: &Outbox) -> Shared {
    let config = EngineConfig::new(1000.0, 600.0);
    let engine = EngineCore::new(RecordingSurface::new(), config, outbox.forwarding()).unwrap();
    Rc::new(RefCell::new(engine))
}

#[test]
fn queued_callbacks_may_call_back_into_the_engine() {
    let outbox = Outbox::new(Callbacks::new());
    let engine = queued_core(&outbox);
    let log = Log::default();
    let (on_ready, on_scroll) = (Rc::clone(&engine), Rc::clone(&engine));
    let (ready_log, scroll_log) = (Rc::clone(&log), Rc::clone(&log));
    *outbox.callbacks.borrow_mut() = Callbacks::new()
        .on_ready(move || {
            let max = on_ready.borrow().scroll_limits().max;
            ready_log.borrow_mut().push(format!("ready:{}", max > 0.0));
        })
        .on_scroll(move |_| {
            on_scroll.borrow_mut().destroy();
            scroll_log.borrow_mut().push("destroyed".into());
        });

    block_on(engine.borrow_mut().init(three_layers(), 0.0)).unwrap();
    assert!(log.borrow().is_empty());
    outbox.flush();
    assert_eq!(*log.borrow(), ["ready:true"]);

    let outcome = engine.borrow_mut().tick(16.0);
    assert!(outcome.is_some_and(|o| o.drawn));
    outbox.flush();

    assert!(engine.borrow().is_destroyed());
    assert!(!engine.borrow().is_running());
    assert_eq!(engine.borrow_mut().tick(32.0), None);
    assert_eq!(*log.borrow(), ["ready:true", "destroyed"]);
}

#[test]
fn queued_notices_arrive_in_order() {
    let log = Log::default();
    let outbox = Outbox::new(recording_callbacks(&log));
    let engine = queued_core(&outbox);
    block_on(engine.borrow_mut().init(vec![layer("front", 3, 3000.0, 600.0, 1.2)], 0.0)).unwrap();
    engine.borrow_mut().tick(16.0);
    outbox.flush();
    assert_eq!(*log.borrow(), ["load:front 1/1", "ready", "scroll:0"]);
    outbox.flush();
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn nested_flush_leaves_the_queue_to_the_outer_one() {
    let outbox = Rc::new(Outbox::new(Callbacks::new()));
    let log = Log::default();
    let (inner, seen) = (Rc::clone(&outbox), Rc::clone(&log));
    *outbox.callbacks.borrow_mut() = Callbacks::new().on_scroll(move |offset| {
        if offset == 1.0 {
            inner.push(Notice::Scroll(2.0));
            inner.flush();
        }
        seen.borrow_mut().push(format!("scroll:{offset}"));
    });
    outbox.push(Notice::Scroll(1.0));
    outbox.flush();
    assert_eq!(*log.borrow(), ["scroll:1", "scroll:2"]);
}
