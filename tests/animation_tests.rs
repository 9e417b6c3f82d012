//! Animation engine tests: interpolation runs, idle lightshow, brightness

mod common;

use common::*;
use padlight::color;
use padlight::{Color, LedAddress, SurfaceError, Transition};

const INDICATOR: LedAddress = LedAddress(40);

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn fade_to_purple_schedules_five_evenly_spaced_writes() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine
        .interpolate(INDICATOR, Color::new(127, 0, 127), Transition::new(1000, 4))
        .unwrap();

    assert_eq!(
        engine.pending_writes(INDICATOR),
        vec![
            (0, Color::OFF),
            (250, Color::new(32, 0, 32)),
            (500, Color::new(64, 0, 64)),
            (750, Color::new(95, 0, 95)),
            (1000, Color::new(127, 0, 127)),
        ]
    );
}

#[test]
fn writes_land_when_their_time_comes() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine
        .interpolate(INDICATOR, Color::new(127, 0, 127), Transition::new(1000, 4))
        .unwrap();
    assert_eq!(engine.active_runs(), 1);

    assert_eq!(engine.service(), Some(TestDuration(250)));
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::OFF));

    clock.advance(250);
    engine.service();
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::new(32, 0, 32)));

    clock.advance(249);
    engine.service();
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::new(32, 0, 32)));

    clock.advance(501);
    assert_eq!(engine.service(), None);
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::new(127, 0, 127)));
    assert_eq!(engine.active_runs(), 0);

    // Two messages per write, five writes.
    assert_eq!(engine.leds().output().messages_for(40).len(), 10);
}

#[test]
fn last_write_is_exactly_the_target() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);
    let address = LedAddress(37);
    let target = Color::new(126, 3, 64);

    engine.set_color(address, Color::new(5, 100, 17)).unwrap();
    engine.interpolate(address, target, Transition::new(70, 7)).unwrap();

    clock.advance(70);
    engine.service();
    assert_eq!(engine.leds().color(address), Some(target));
}

#[test]
fn fade_starts_from_the_current_color() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);
    let address = LedAddress(38);

    engine.set_color(address, Color::RED).unwrap();
    engine.interpolate(address, Color::BLUE, Transition::new(100, 2)).unwrap();

    let writes = engine.pending_writes(address);
    assert_eq!(writes[0], (0, Color::RED));
    assert_eq!(writes[1], (50, Color::new(64, 0, 64)));
    assert_eq!(writes[2], (100, Color::BLUE));
}

#[test]
fn cancelled_run_never_writes() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    let run = engine
        .interpolate(INDICATOR, Color::GREEN, Transition::DEFAULT)
        .unwrap();
    assert_eq!(engine.cancel(run), 21);
    assert_eq!(engine.cancel(run), 0);
    assert_eq!(engine.active_runs(), 0);

    clock.advance(2000);
    assert_eq!(engine.service(), None);
    assert!(engine.leds().output().messages().is_empty());
}

#[test]
fn overlapping_runs_both_deliver() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.interpolate(INDICATOR, Color::RED, Transition::new(100, 1)).unwrap();
    engine.interpolate(INDICATOR, Color::BLUE, Transition::new(200, 1)).unwrap();

    clock.advance(200);
    engine.service();
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::BLUE));
}

#[test]
fn rejected_requests_schedule_nothing() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    assert_eq!(
        engine.interpolate(LedAddress(80), Color::RED, Transition::DEFAULT),
        Err(SurfaceError::AddressOutOfRange(LedAddress(80)))
    );
    assert_eq!(
        engine.interpolate(INDICATOR, Color::RED, Transition::new(500, 0)),
        Err(SurfaceError::ZeroSteps)
    );
    assert!(matches!(
        engine.interpolate(INDICATOR, Color::RED, Transition::new(500, 65)),
        Err(SurfaceError::TooManySteps { requested: 65, .. })
    ));

    assert!(engine.scheduler().is_empty());
    assert!(engine.leds().is_empty());
}

#[test]
fn transport_failure_keeps_the_intended_color() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);
    engine.leds_mut().output_mut().offline = true;

    assert_eq!(
        engine.set_color(INDICATOR, Color::CYAN),
        Err(SurfaceError::OutputUnavailable)
    );
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::CYAN));

    engine.interpolate(INDICATOR, Color::RED, Transition::new(10, 1)).unwrap();
    clock.advance(10);
    engine.service();
    assert_eq!(engine.leds().color(INDICATOR), Some(Color::RED));
}

// ============================================================================
// Brightness
// ============================================================================

#[test]
fn brightness_scales_every_touched_led() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::new(100, 50, 127)).unwrap();
    engine.set_color(LedAddress(37), Color::WHITE).unwrap();

    engine.apply_brightness(64).unwrap();
    assert_eq!(engine.leds().color(LedAddress(36)), Some(Color::new(50, 25, 64)));
    assert_eq!(engine.leds().color(LedAddress(37)), Some(Color::new(64, 64, 64)));
    // Untouched LEDs stay untracked.
    assert_eq!(engine.leds().color(LedAddress(38)), None);
}

#[test]
fn brightness_compounds_on_the_stored_color() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::WHITE).unwrap();
    engine.apply_brightness(64).unwrap();
    engine.apply_brightness(127).unwrap();
    assert_eq!(engine.leds().color(LedAddress(36)), Some(Color::new(64, 64, 64)));

    engine.apply_brightness(0).unwrap();
    assert_eq!(engine.leds().color(LedAddress(36)), Some(Color::OFF));
}

#[test]
fn brightness_rejects_levels_above_seven_bits() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::WHITE).unwrap();
    assert_eq!(engine.apply_brightness(128), Err(SurfaceError::LevelOutOfRange(128)));
    assert_eq!(engine.leds().color(LedAddress(36)), Some(Color::WHITE));
}

// ============================================================================
// Idle lightshow
// ============================================================================

#[test]
fn idle_frame_fades_every_tracked_led_to_its_rainbow_phase() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::RED).unwrap();
    engine.set_color(LedAddress(41), Color::GREEN).unwrap();
    engine.start_idle();

    assert!(engine.idle().is_active());
    assert_eq!(engine.idle().step(), 1);

    let writes = engine.pending_writes(LedAddress(36));
    assert_eq!(writes.len(), usize::from(Transition::IDLE.steps) + 1);
    assert_eq!(writes[0], (0, Color::RED));
    assert_eq!(writes.last(), Some(&(500, color::rainbow(36))));
    assert_eq!(
        engine.pending_writes(LedAddress(41)).last(),
        Some(&(500, color::rainbow(41)))
    );
    assert!(engine.pending_writes(LedAddress(37)).is_empty());
}

#[test]
fn idle_reschedules_itself_every_period() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::RED).unwrap();
    engine.start_idle();
    engine.service();
    assert_eq!(engine.idle().step(), 1);

    clock.advance(50);
    engine.service();
    assert_eq!(engine.idle().step(), 2);

    clock.advance(50);
    engine.service();
    assert_eq!(engine.idle().step(), 3);

    // Newest frame aims at the next phase.
    assert_eq!(
        engine.pending_writes(LedAddress(36)).last(),
        Some(&(500, color::rainbow(36 + 2)))
    );
}

#[test]
fn stop_idle_cancels_the_whole_session() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::RED).unwrap();
    engine.start_idle();
    clock.advance(120);
    engine.service();

    let token = engine.idle().token().unwrap();
    assert!(engine.scheduler().pending_in(token) > 0);
    let frozen = engine.leds().color(LedAddress(36));

    assert!(engine.stop_idle());
    assert!(!engine.idle().is_active());
    assert_eq!(engine.idle().token(), None);
    assert_eq!(engine.scheduler().pending_in(token), 0);
    assert!(engine.scheduler().is_empty());

    // Stopping does not touch the LED.
    assert_eq!(engine.leds().color(LedAddress(36)), frozen);

    let sent = engine.leds().output().messages().len();
    clock.advance(5000);
    assert_eq!(engine.service(), None);
    assert_eq!(engine.leds().output().messages().len(), sent);
}

#[test]
fn stop_idle_is_idempotent() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    assert!(!engine.stop_idle());
    engine.start_idle();
    assert!(engine.stop_idle());
    assert!(!engine.stop_idle());
    assert!(engine.scheduler().is_empty());
}

#[test]
fn restarting_idle_replaces_the_running_session() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::RED).unwrap();
    engine.start_idle();
    let first = engine.idle().token().unwrap();

    engine.start_idle();
    let second = engine.idle().token().unwrap();

    assert_ne!(first, second);
    assert_eq!(engine.scheduler().pending_in(first), 0);
    assert_eq!(engine.idle().step(), 1);
}

#[test]
fn armed_idle_starts_after_its_delay() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.arm_idle(1000);
    clock.advance(999);
    engine.service();
    assert!(!engine.idle().is_active());

    clock.advance(1);
    engine.service();
    assert!(engine.idle().is_active());
}

#[test]
fn cancel_animations_keeps_the_idle_arming() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.arm_idle(1000);
    engine.interpolate(INDICATOR, Color::PURPLE, Transition::DEFAULT).unwrap();
    engine.cancel_animations();

    assert_eq!(engine.scheduler().len(), 1);
    assert_eq!(engine.active_runs(), 0);

    clock.advance(1000);
    engine.service();
    assert!(engine.idle().is_active());
}

#[test]
fn reset_forgets_leds_and_drops_all_work() {
    let clock = MockTimeSource::new();
    let mut engine = engine(&clock);

    engine.set_color(LedAddress(36), Color::RED).unwrap();
    engine.arm_idle(10);
    engine.start_idle();
    engine.reset();

    assert!(engine.scheduler().is_empty());
    assert!(engine.leds().is_empty());
    assert!(!engine.idle().is_active());
    assert_eq!(engine.active_runs(), 0);
}
