//! Tone subsystem: CTCSS synthesis, PTT gating, frequency selection
//!
//! Architecture:
//! - Waveform driver: 256-entry sine LUT + 8-bit phase, one step per
//!   timer period
//! - Tone gate: PTT level starts/stops the timer, resets phase and output
//! - Frequency selector: main loop maps selector code → timer period
//!
//! ```text
//! selector port ──▶ FrequencySelector ──▶ timer top ──┐
//!                                                      ▼
//! PTT edge ISR ──▶ ToneGate ──▶ timer run/stop ──▶ period ISR
//!                     │                                │
//!                     └──────▶ WaveformDriver ◀────────┘
//!                                   │
//!                                   ▼
//!                              output port
//! ```
//!
//! The driver and the gate share the phase and the port, so both live in
//! one `ToneContext` behind a critical section. The selector only touches
//! the timer top register and runs outside the lock.

pub mod driver;
pub mod gate;
pub mod lut;
pub mod selector;

pub use driver::{WaveformDriver, QUIESCENT_LEVEL};
pub use gate::{GateState, GateTransition, ToneGate};
pub use lut::{LUT_SIZE, SINE_LUT};
pub use selector::{FrequencySelector, SelectorChange, Tone, CTCSS_TONES};

use core::cell::RefCell;

use critical_section::Mutex;

use crate::hal::{OutputPort, TimerControl};
use crate::logging::LogStream;

/// Waveform driver and tone gate, updated together.
pub struct ToneGenerator<P, T> {
    driver: WaveformDriver<P>,
    gate: ToneGate<T>,
}

impl<P: OutputPort, T: TimerControl> ToneGenerator<P, T> {
    /// Create generator with the port quiescent and the timer stopped.
    pub fn new(port: P, timer: T) -> Self {
        Self {
            driver: WaveformDriver::new(port),
            gate: ToneGate::new(timer),
        }
    }

    /// Timer period event.
    ///
    /// Ignored while the gate is disabled: an alarm latched before the
    /// timer was stopped can still be delivered after the PTT handler ran.
    #[inline]
    pub fn on_period(&mut self) {
        if self.gate.is_enabled() {
            self.driver.on_period();
        }
    }

    /// PTT level sampled at interrupt time
    #[inline]
    pub fn on_enable(&mut self, active: bool) -> GateTransition {
        self.gate.update(active, &mut self.driver)
    }

    /// Borrow the waveform driver.
    pub fn driver(&self) -> &WaveformDriver<P> {
        &self.driver
    }

    /// Borrow the gate.
    pub fn gate(&self) -> &ToneGate<T> {
        &self.gate
    }
}

/// Interrupt-shared tone state.
///
/// Every access runs inside `critical_section::with`, which masks
/// interrupts on a single core, so the timer and PTT handlers never see a
/// half-applied update of phase, port and timer run state.
///
/// # Usage
///
/// ```ignore
/// static TONE: ToneContext<Port, Timer> = ToneContext::new();
///
/// // Bootstrap, before interrupts are attached:
/// TONE.install(ToneGenerator::new(port, timer));
///
/// // Timer ISR:
/// TONE.on_timer_period();
///
/// // PTT ISR:
/// TONE.on_enable_edge(ptt.is_active(), now_us, &LOG_STREAM);
/// ```
pub struct ToneContext<P, T> {
    inner: Mutex<RefCell<Option<ToneGenerator<P, T>>>>,
}

impl<P, T> ToneContext<P, T> {
    /// Create an empty context (handlers are no-ops until `install`).
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }
}

impl<P: OutputPort, T: TimerControl> ToneContext<P, T> {
    /// Move the generator into the context.
    ///
    /// Returns the previously installed generator, if any.
    pub fn install(&self, generator: ToneGenerator<P, T>) -> Option<ToneGenerator<P, T>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(generator))
    }

    /// Check if a generator has been installed
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Timer period ISR body.
    #[inline]
    pub fn on_timer_period(&self) {
        critical_section::with(|cs| {
            if let Some(generator) = self.inner.borrow_ref_mut(cs).as_mut() {
                generator.on_period();
            }
        });
    }

    /// PTT edge ISR body.
    ///
    /// `active` must be the pin level sampled now, not the edge direction.
    pub fn on_enable_edge<const N: usize>(
        &self,
        active: bool,
        now_us: i64,
        log: &LogStream<N>,
    ) -> GateTransition {
        let transition = critical_section::with(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .as_mut()
                .map_or(GateTransition::Unchanged, |generator| generator.on_enable(active))
        });

        match transition {
            GateTransition::Started => crate::rt_info!(log, now_us, "PTT on: tone started"),
            GateTransition::Stopped => crate::rt_info!(log, now_us, "PTT off: tone stopped"),
            GateTransition::Unchanged => {}
        }

        transition
    }

    /// Run `f` on the installed generator under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut ToneGenerator<P, T>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<P, T> Default for ToneContext<P, T> {
    fn default() -> Self {
        Self::new()
    }
}
