//! # CtcssEncoder
//!
//! CTCSS sub-audible tone encoder firmware.
//!
//! ## Architecture
//!
//! A 256-sample sine table is stepped out on an 8-bit port by a periodic
//! timer interrupt. The PTT line gates the timer; the main loop maps the
//! tone selector code to the timer period.
//!
//! - [`tone`]: waveform driver, tone gate, frequency selector
//! - [`hal`]: peripheral traits (and the ESP32-S3 binding on target)
//! - [`logging`]: ISR-safe event log, drained by [`uart_logger`]
//!
//! No heap, no blocking in interrupt context.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod hal;
pub mod logging;
pub mod log_globals;
pub mod tone;
pub mod uart_logger;

pub use config::CONFIG;
pub use log_globals::LOG_STREAM;
pub use tone::{
    FrequencySelector, GateState, GateTransition, Tone, ToneContext, ToneGenerator,
    WaveformDriver,
};
