//! Tone gate state machine
//!
//! Follows the transmit-enable (PTT) line. Evaluated on every edge
//! interrupt from the instantaneous pin level, not the edge direction, so
//! a burst of edges always settles on the true line state.
//!
//! ```text
//!            active
//! Disabled ─────────▶ Enabled
//!    ▲                   │
//!    └───────────────────┘
//!          inactive
//!   (stop timer, phase := 0, port := 0)
//! ```

use super::driver::WaveformDriver;
use crate::hal::{OutputPort, TimerControl};

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Timer stopped, output at quiescent level
    Disabled,
    /// Timer counting, waveform driver running
    Enabled,
}

/// Outcome of one gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// Disabled → Enabled
    Started,
    /// Enabled → Disabled
    Stopped,
    /// Same level as before (actions were re-applied)
    Unchanged,
}

/// Tone gate
///
/// Owns the timer's counting control. The waveform driver is passed in so
/// both are updated under the same lock.
pub struct ToneGate<T> {
    timer: T,
    state: GateState,
}

impl<T: TimerControl> ToneGate<T> {
    /// Create gate in `Disabled` state with the timer stopped.
    pub fn new(mut timer: T) -> Self {
        timer.stop();
        Self {
            timer,
            state: GateState::Disabled,
        }
    }

    /// Get current gate state
    #[inline]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Check if tone output is enabled
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.state == GateState::Enabled
    }

    /// Apply the enable line level.
    ///
    /// The hardware action runs on every call, even if the level did not
    /// change; repeating it leaves the same end state.
    pub fn update<P: OutputPort>(
        &mut self,
        active: bool,
        driver: &mut WaveformDriver<P>,
    ) -> GateTransition {
        let previous = self.state;

        if active {
            self.timer.start();
            self.state = GateState::Enabled;
        } else {
            self.timer.stop();
            driver.reset();
            self.state = GateState::Disabled;
        }

        match (previous, self.state) {
            (GateState::Disabled, GateState::Enabled) => GateTransition::Started,
            (GateState::Enabled, GateState::Disabled) => GateTransition::Stopped,
            _ => GateTransition::Unchanged,
        }
    }

    /// Borrow the timer control.
    pub fn timer(&self) -> &T {
        &self.timer
    }
}
