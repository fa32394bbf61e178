#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn new_clock_is_stopped() {
    let mut c = FrameClock::new();
    assert!(!c.is_running());
    assert_eq!(c.advance(16.0), None);
    assert_eq!(c.tick(), 0);
}

#[test]
fn advance_reports_dt_since_last_frame() {
    let mut c = FrameClock::new();
    c.start(1000.0);
    assert_eq!(c.advance(1016.0), Some(Frame { dt: 16.0, tick: 1 }));
    assert_eq!(c.advance(1050.0), Some(Frame { dt: 34.0, tick: 2 }));
}

#[test]
fn tick_counter_is_monotonic_across_restarts() {
    let mut c = FrameClock::new();
    c.start(0.0);
    c.advance(16.0);
    c.advance(32.0);
    c.stop();
    c.start(5000.0);
    let f = c.advance(5016.0).unwrap();
    assert_eq!(f.tick, 3);
}

#[test]
fn restart_does_not_span_the_paused_interval() {
    let mut c = FrameClock::new();
    c.start(0.0);
    c.advance(16.0);
    c.stop();
    assert_eq!(c.advance(10_000.0), None);
    c.start(60_000.0);
    assert_eq!(c.advance(60_016.0).unwrap().dt, 16.0);
}

#[test]
fn backwards_timestamp_yields_zero_dt() {
    let mut c = FrameClock::new();
    c.start(100.0);
    assert_eq!(c.advance(90.0).unwrap().dt, 0.0);
    // The clock keeps its high-water mark.
    assert_eq!(c.advance(116.0).unwrap().dt, 16.0);
}

#[test]
fn non_finite_timestamp_yields_zero_dt() {
    let mut c = FrameClock::new();
    c.start(100.0);
    assert_eq!(c.advance(f64::NAN).unwrap().dt, 0.0);
    assert_eq!(c.advance(116.0).unwrap().dt, 16.0);
}
