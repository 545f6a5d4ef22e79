//! Module: config
//!
//! Purpose: Static firmware configuration for CtcssEncoder.
//!
//! Everything is compiled into the image: timer clock, selector masking,
//! fallback tone and the ESP32-S3 pin map. There is no runtime
//! configuration and nothing is persisted.

/// Timer counting clock in Hz.
///
/// One waveform sample is emitted every `period + 1` ticks of this clock.
pub const TIMER_CLOCK_HZ: u32 = 16_000_000;

/// Number of samples in one waveform cycle.
pub const SAMPLES_PER_CYCLE: u32 = 256;

/// Period scaling constant: `period = SCALING / decihertz`.
pub const SCALING: u32 = 10 * TIMER_CLOCK_HZ / SAMPLES_PER_CYCLE;

/// Selector port bit reserved for an unrelated radio signal.
pub const SELECTOR_RESERVED_BIT: u8 = 6;

/// Tone used when the selector code matches no table entry (60.0 Hz).
/// Below the lowest standard tone (67.0 Hz).
pub const FALLBACK_DECIHERTZ: u16 = 600;

/// Number of output port lines (DAC resistor ladder bits, LSB first).
pub const OUTPUT_PORT_WIDTH: usize = 8;

/// Number of significant selector lines (bit 0 first).
pub const SELECTOR_WIDTH: usize = 6;

/// Hardware pin assignment and log output settings.
#[derive(Debug, Clone, Copy)]
pub struct FirmwareConfig {
    /// GPIOs driving the output port, bit 0 first.
    pub output_pins: [i32; OUTPUT_PORT_WIDTH],
    /// GPIOs sampled as the selector code, bit 0 first.
    pub selector_pins: [i32; SELECTOR_WIDTH],
    /// GPIO carrying the transmit-enable (PTT) signal.
    pub enable_pin: i32,
    /// True if PTT is asserted when the enable pin is high.
    pub enable_active_high: bool,
    /// UART TX pin for the event log.
    pub log_tx_pin: i32,
    /// Event log baud rate.
    pub log_baud_rate: u32,
    /// Maximum log entries written per main loop pass.
    pub log_drain_per_pass: usize,
}

/// ESP32-S3 pin map.
///
/// GPIO6 carries the log UART (Quad flash boards only, conflicts with
/// Octal PSRAM).
pub const CONFIG: FirmwareConfig = FirmwareConfig {
    output_pins: [8, 9, 10, 11, 12, 13, 14, 15],
    selector_pins: [1, 2, 3, 4, 5, 7],
    enable_pin: 16,
    enable_active_high: true,
    log_tx_pin: 6,
    log_baud_rate: 115_200,
    log_drain_per_pass: 1,
};
