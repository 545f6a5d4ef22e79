//! Waveform driver and tone gate tests

mod common;

use common::{make_generator, run_periods, MockPort};
use ctcss_encoder::tone::{GateState, GateTransition, WaveformDriver, QUIESCENT_LEVEL, SINE_LUT};

#[test]
fn test_driver_initial_state() {
    let driver = WaveformDriver::new(MockPort::default());
    assert_eq!(driver.phase(), 0);
    assert_eq!(driver.port().value, QUIESCENT_LEVEL);
}

#[test]
fn test_driver_writes_then_advances() {
    let mut driver = WaveformDriver::new(MockPort::default());

    driver.on_period();
    assert_eq!(driver.port().value, SINE_LUT[0]);
    assert_eq!(driver.phase(), 1);

    driver.on_period();
    assert_eq!(driver.port().value, SINE_LUT[1]);
    assert_eq!(driver.phase(), 2);
}

#[test]
fn test_driver_full_cycle_wraps() {
    let mut driver = WaveformDriver::new(MockPort::default());

    for _ in 0..256 {
        driver.on_period();
    }

    // Back to the start after exactly one cycle
    assert_eq!(driver.phase(), 0);

    // One write per period, in table order (after the initial zero)
    let history = &driver.port().history;
    assert_eq!(history.len(), 257);
    assert_eq!(&history[1..], &SINE_LUT[..]);
}

#[test]
fn test_driver_second_cycle_repeats() {
    let mut driver = WaveformDriver::new(MockPort::default());

    for _ in 0..512 {
        driver.on_period();
    }

    let history = &driver.port().history[1..];
    assert_eq!(&history[..256], &history[256..]);
}

#[test]
fn test_driver_reset() {
    let mut driver = WaveformDriver::new(MockPort::default());
    for _ in 0..77 {
        driver.on_period();
    }
    assert_ne!(driver.port().value, QUIESCENT_LEVEL);

    driver.reset();
    assert_eq!(driver.phase(), 0);
    assert_eq!(driver.port().value, QUIESCENT_LEVEL);
}

#[test]
fn test_gate_initial_state() {
    let generator = make_generator();
    assert_eq!(generator.gate().state(), GateState::Disabled);
    assert!(!generator.gate().is_enabled());
    assert!(!generator.gate().timer().running);
    assert_eq!(generator.driver().port().value, 0);
}

#[test]
fn test_gate_enable_starts_timer() {
    let mut generator = make_generator();

    assert_eq!(generator.on_enable(true), GateTransition::Started);
    assert_eq!(generator.gate().state(), GateState::Enabled);
    assert!(generator.gate().timer().running);
}

#[test]
fn test_no_output_while_disabled() {
    let mut generator = make_generator();

    run_periods(&mut generator, 1000);

    assert_eq!(generator.driver().phase(), 0);
    assert_eq!(generator.driver().port().value, 0);
}

#[test]
fn test_gate_disable_resets_phase_and_output() {
    let mut generator = make_generator();
    generator.on_enable(true);
    run_periods(&mut generator, 100);
    assert_eq!(generator.driver().phase(), 100);

    assert_eq!(generator.on_enable(false), GateTransition::Stopped);
    assert_eq!(generator.gate().state(), GateState::Disabled);
    assert!(!generator.gate().timer().running);
    assert_eq!(generator.driver().phase(), 0);
    assert_eq!(generator.driver().port().value, 0);
}

#[test]
fn test_gate_disable_from_every_phase() {
    for steps in 0..256 {
        let mut generator = make_generator();
        generator.on_enable(true);
        run_periods(&mut generator, steps);

        generator.on_enable(false);
        assert_eq!(generator.driver().phase(), 0, "after {} steps", steps);
        assert_eq!(generator.driver().port().value, 0, "after {} steps", steps);
    }
}

#[test]
fn test_gate_double_disable_idempotent() {
    let mut generator = make_generator();
    generator.on_enable(true);
    run_periods(&mut generator, 42);

    assert_eq!(generator.on_enable(false), GateTransition::Stopped);
    assert_eq!(generator.driver().phase(), 0);
    assert_eq!(generator.driver().port().value, 0);

    assert_eq!(generator.on_enable(false), GateTransition::Unchanged);
    assert_eq!(generator.driver().phase(), 0);
    assert_eq!(generator.driver().port().value, 0);
    assert!(!generator.gate().timer().running);
}

#[test]
fn test_gate_double_enable_idempotent() {
    let mut generator = make_generator();

    assert_eq!(generator.on_enable(true), GateTransition::Started);
    run_periods(&mut generator, 10);

    // Redundant start, phase keeps running
    assert_eq!(generator.on_enable(true), GateTransition::Unchanged);
    assert!(generator.gate().timer().running);
    assert_eq!(generator.gate().timer().starts, 2);
    assert_eq!(generator.driver().phase(), 10);
}

#[test]
fn test_reenable_starts_from_phase_zero() {
    let mut generator = make_generator();

    generator.on_enable(true);
    run_periods(&mut generator, 200);
    generator.on_enable(false);

    // Output and phase at rest before the next activation
    assert_eq!(generator.driver().phase(), 0);
    assert_eq!(generator.driver().port().value, 0);

    generator.on_enable(true);
    run_periods(&mut generator, 1);
    assert_eq!(generator.driver().port().value, SINE_LUT[0]);
    assert_eq!(generator.driver().phase(), 1);
}

#[test]
fn test_every_activation_has_same_onset() {
    let mut generator = make_generator();
    let mut onsets = Vec::new();

    for burst in [3usize, 97, 256, 301] {
        generator.on_enable(true);
        let before = generator.driver().port().history.len();
        run_periods(&mut generator, 8);
        onsets.push(generator.driver().port().history[before..].to_vec());
        run_periods(&mut generator, burst);
        generator.on_enable(false);
    }

    for onset in &onsets[1..] {
        assert_eq!(onset, &onsets[0]);
    }
    assert_eq!(&onsets[0][..], &SINE_LUT[..8]);
}
