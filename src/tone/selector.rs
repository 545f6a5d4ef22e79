//! Frequency selector
//!
//! Maps the parallel selector code to a CTCSS tone and programs the timer
//! period for it. Polled from the main loop; every pass re-reads the input
//! and rewrites the period, so a selector change takes effect on the next
//! pass with no debounce.

use core::fmt;

use crate::config::{
    FALLBACK_DECIHERTZ, SAMPLES_PER_CYCLE, SCALING, SELECTOR_RESERVED_BIT, TIMER_CLOCK_HZ,
};
use crate::hal::{HalError, PeriodRegister, SelectorInput};

/// One selector table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneEntry {
    /// Selector code after masking
    pub code: u8,
    /// Tone frequency in tenths of Hz
    pub decihertz: u16,
}

const fn entry(code: u8, decihertz: u16) -> ToneEntry {
    ToneEntry { code, decihertz }
}

/// Selector code → CTCSS tone.
///
/// The codes follow the host radio's tone switch wiring and are neither
/// ordered nor Gray coded. They must not be renumbered.
pub const CTCSS_TONES: [ToneEntry; 37] = [
    entry(0x3f, 670),
    entry(0x2f, 719),
    entry(0x37, 744),
    entry(0x0f, 770),
    entry(0x3b, 797),
    entry(0x27, 825),
    entry(0x33, 854),
    entry(0x07, 885),
    entry(0x3d, 915),
    entry(0x2b, 948),
    entry(0x0b, 1000),
    entry(0x23, 1035),
    entry(0x03, 1072),
    entry(0x2d, 1109),
    entry(0x0d, 1148),
    entry(0x25, 1188),
    entry(0x05, 1230),
    entry(0x29, 1273),
    entry(0x09, 1318),
    entry(0x21, 1365),
    entry(0x01, 1413),
    entry(0x2e, 1462),
    entry(0x0e, 1514),
    entry(0x26, 1567),
    entry(0x06, 1622),
    entry(0x2a, 1679),
    entry(0x0a, 1738),
    entry(0x22, 1799),
    entry(0x02, 1862),
    entry(0x2c, 1928),
    entry(0x0c, 2035),
    entry(0x24, 2107),
    entry(0x04, 2181),
    entry(0x28, 2257),
    entry(0x08, 2336),
    entry(0x20, 2418),
    entry(0x00, 2503),
];

/// Number of distinct 6-bit codes
const CODE_SPACE: usize = 64;

/// Direct-indexed view of `CTCSS_TONES`, 0 = no tone for that code.
static CODE_TO_DECIHERTZ: [u16; CODE_SPACE] = {
    let mut table = [0u16; CODE_SPACE];
    let mut i = 0;
    while i < CTCSS_TONES.len() {
        let e = CTCSS_TONES[i];
        table[e.code as usize] = e.decihertz;
        i += 1;
    }
    table
};

/// Resolved tone for a selector code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Standard CTCSS tone (tenths of Hz)
    Ctcss(u16),
    /// Code matched no table entry
    Fallback,
}

impl Tone {
    /// Frequency in tenths of Hz
    #[inline]
    pub const fn decihertz(self) -> u16 {
        match self {
            Tone::Ctcss(dhz) => dhz,
            Tone::Fallback => FALLBACK_DECIHERTZ,
        }
    }

    /// Timer top value producing this tone
    #[inline]
    pub fn period(self) -> u16 {
        period_for_decihertz(self.decihertz())
    }

    /// Check if this is the fallback tone
    #[inline]
    pub fn is_fallback(self) -> bool {
        self == Tone::Fallback
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dhz = self.decihertz();
        write!(f, "{}.{} Hz", dhz / 10, dhz % 10)?;
        if self.is_fallback() {
            f.write_str(" (fallback)")?;
        }
        Ok(())
    }
}

/// Clear the reserved selector bit.
#[inline]
pub const fn mask_code(raw: u8) -> u8 {
    raw & !(1 << SELECTOR_RESERVED_BIT)
}

/// Look up a masked selector code. Exact match only.
#[inline]
pub fn tone_for_code(code: u8) -> Tone {
    match CODE_TO_DECIHERTZ.get(code as usize) {
        Some(&dhz) if dhz != 0 => Tone::Ctcss(dhz),
        _ => Tone::Fallback,
    }
}

/// Timer top value for a frequency in tenths of Hz.
///
/// `SCALING / decihertz`, kept within `1..=u16::MAX`.
#[inline]
pub fn period_for_decihertz(decihertz: u16) -> u16 {
    let period = SCALING / (decihertz.max(1) as u32);
    period.clamp(1, u16::MAX as u32) as u16
}

/// Timer top value for a raw selector port read.
#[inline]
pub fn period_for_code(raw: u8) -> u16 {
    tone_for_code(mask_code(raw)).period()
}

/// Output frequency in mHz produced by a timer top value.
///
/// `TIMER_CLOCK_HZ / (256 * (period + 1))`
pub fn output_millihertz(period: u16) -> u32 {
    let ticks_per_cycle = SAMPLES_PER_CYCLE as u64 * (period as u64 + 1);
    (TIMER_CLOCK_HZ as u64 * 1000 / ticks_per_cycle) as u32
}

/// Selector code change seen by `FrequencySelector::poll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorChange {
    /// Previous masked code (`None` on the first pass)
    pub previous: Option<u8>,
    /// New masked code
    pub code: u8,
    /// Resolved tone
    pub tone: Tone,
    /// Period written to the timer
    pub period: u16,
}

/// Main loop selector task
pub struct FrequencySelector<S, R> {
    input: S,
    register: R,
    last_code: Option<u8>,
    write_failures: u32,
    write_failing: bool,
    write_error: Option<HalError>,
}

impl<S: SelectorInput, R: PeriodRegister> FrequencySelector<S, R> {
    /// Create selector over an input port and the timer's top register
    pub fn new(input: S, register: R) -> Self {
        Self {
            input,
            register,
            last_code: None,
            write_failures: 0,
            write_failing: false,
            write_error: None,
        }
    }

    /// One loop pass: read, mask, look up, program the period.
    ///
    /// The period is written on every pass. Returns the change when the
    /// code differs from the previous pass (for logging).
    ///
    /// A failed write leaves the previous period running; it is counted and
    /// the first error of each failing streak is kept for `take_write_error`.
    pub fn poll(&mut self) -> Option<SelectorChange> {
        let code = mask_code(self.input.read());
        let tone = tone_for_code(code);
        let period = tone.period();

        match self.register.set_top(period) {
            Ok(()) => self.write_failing = false,
            Err(e) => {
                self.write_failures = self.write_failures.wrapping_add(1);
                if !self.write_failing {
                    self.write_failing = true;
                    self.write_error = Some(e);
                }
            }
        }

        if self.last_code == Some(code) {
            return None;
        }

        let change = SelectorChange {
            previous: self.last_code,
            code,
            tone,
            period,
        };
        self.last_code = Some(code);
        Some(change)
    }

    /// Masked code seen on the last pass
    #[inline]
    pub fn last_code(&self) -> Option<u8> {
        self.last_code
    }

    /// Period writes that failed since creation.
    #[inline]
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    /// First error of the current failing streak, once.
    pub fn take_write_error(&mut self) -> Option<HalError> {
        self.write_error.take()
    }

    /// Poll forever, calling `idle` after each pass.
    pub fn run<F>(&mut self, mut idle: F) -> !
    where
        F: FnMut(Option<SelectorChange>, &mut Self),
    {
        loop {
            let change = self.poll();
            idle(change, self);
        }
    }

    /// Borrow the input port.
    pub fn input_mut(&mut self) -> &mut S {
        &mut self.input
    }

    /// Borrow the period register.
    pub fn register(&self) -> &R {
        &self.register
    }

    /// Mutably borrow the period register.
    pub fn register_mut(&mut self) -> &mut R {
        &mut self.register
    }
}
