//! Waveform driver
//!
//! Runs once per timer period: writes the LUT sample at the current phase
//! to the output port and advances the phase by one step.

use super::lut;
use crate::hal::OutputPort;

/// Value driven on the port while the tone is gated off.
pub const QUIESCENT_LEVEL: u8 = 0;

/// Phase counter plus the output port it drives.
///
/// The phase is a `u8`, so wraparound at 256 and index validity hold by
/// construction.
pub struct WaveformDriver<P> {
    port: P,
    phase: u8,
}

impl<P: OutputPort> WaveformDriver<P> {
    /// Create driver at phase 0 with the port at the quiescent level.
    pub fn new(mut port: P) -> Self {
        port.write(QUIESCENT_LEVEL);
        Self { port, phase: 0 }
    }

    /// Timer period handler body.
    #[inline]
    pub fn on_period(&mut self) {
        self.port.write(lut::sample(self.phase));
        self.phase = self.phase.wrapping_add(1);
    }

    /// Return to phase 0 and force the port to the quiescent level.
    #[inline]
    pub fn reset(&mut self) {
        self.phase = 0;
        self.port.write(QUIESCENT_LEVEL);
    }

    /// Current phase (next LUT index to be written)
    #[inline]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Borrow the output port.
    pub fn port(&self) -> &P {
        &self.port
    }
}
