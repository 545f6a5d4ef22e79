//! Sine wave lookup table for tone synthesis
//!
//! 256-entry table covering one full cycle.
//! Values are u8 for direct output on the 8-bit DAC port.

/// Number of entries in the sine LUT
pub const LUT_SIZE: usize = 256;

/// DC offset of the table (mid-scale of the 8-bit port)
pub const LUT_OFFSET: f64 = 128.0;

/// Peak deviation from `LUT_OFFSET`
pub const LUT_AMPLITUDE: f64 = 127.0;

/// Pre-computed sine wave lookup table
///
/// `round(128 + 127 * sin(2π * i / 256))`, so every entry is in 1..=255.
/// Index 0 = 0° (mid-scale), 64 = 90° (peak), 192 = 270° (trough)
pub static SINE_LUT: [u8; LUT_SIZE] = {
    let mut table = [0u8; LUT_SIZE];
    let mut i = 0;
    while i < LUT_SIZE {
        let angle = (i as f64) * core::f64::consts::PI * 2.0 / (LUT_SIZE as f64);
        let value = LUT_OFFSET + LUT_AMPLITUDE * const_sin(angle);
        // Values are positive, so truncating after +0.5 rounds to nearest
        table[i] = (value + 0.5) as u8;
        i += 1;
    }
    table
};

/// Const-compatible sine approximation using Taylor series
///
/// The argument is folded into [-π/2, π/2] first, where the 9th order
/// series is accurate to a few parts per million.
const fn const_sin(x: f64) -> f64 {
    use core::f64::consts::{FRAC_PI_2, PI};

    // Normalize to [-π, π]
    let mut x = x;
    while x > PI {
        x -= 2.0 * PI;
    }
    while x < -PI {
        x += 2.0 * PI;
    }

    // sin(π - x) = sin(x)
    if x > FRAC_PI_2 {
        x = PI - x;
    } else if x < -FRAC_PI_2 {
        x = -PI - x;
    }

    // Taylor series: sin(x) = x - x³/3! + x⁵/5! - x⁷/7! + x⁹/9!
    let x2 = x * x;
    let x3 = x2 * x;
    let x5 = x3 * x2;
    let x7 = x5 * x2;
    let x9 = x7 * x2;

    x - x3 / 6.0 + x5 / 120.0 - x7 / 5040.0 + x9 / 362880.0
}

/// Sample for `phase`. Total: every `u8` is a valid index.
#[inline(always)]
pub fn sample(phase: u8) -> u8 {
    SINE_LUT[phase as usize]
}
