//! UART log output on GPIO6.
//!
//! Drains the event log from the main loop via UART TX on GPIO6.
//! Requires external USB-UART adapter (CH340, CP2102, etc).
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```
//!
//! **WARNING**: GPIO6 conflicts with Octal PSRAM. Only use on Quad flash boards!
//!
//! The main loop must not stall the frequency selector, so each pass
//! writes at most a few entries.

use crate::logging::{LogEntry, LogStream};

#[cfg(test)]
use crate::logging::LogLevel;

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;

/// Interval between dropped-message reports.
pub const DROPPED_REPORT_INTERVAL_US: i64 = 10_000_000;

/// Formatted line buffer size.
const LINE_BUF_LEN: usize = 128;

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: i32,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: crate::config::CONFIG.log_baud_rate,
            tx_pin: crate::config::CONFIG.log_tx_pin,
        }
    }
}

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\n`
fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    crate::logging::format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\n",
            entry.timestamp_us,
            entry.level.as_str(),
            core::str::from_utf8(entry.text()).unwrap_or("<invalid utf8>")
        ),
    )
}

/// Drain up to `max_entries` log entries into `write`.
///
/// Returns the number of entries written.
pub fn drain_pending<const N: usize, W>(
    stream: &LogStream<N>,
    max_entries: usize,
    mut write: W,
) -> usize
where
    W: FnMut(&[u8]),
{
    let mut line = [0u8; LINE_BUF_LEN];
    let mut written = 0;

    while written < max_entries {
        let Some(entry) = stream.pop() else {
            break;
        };
        let len = format_log_entry(&entry, &mut line);
        write(&line[..len]);
        written += 1;
    }

    written
}

/// Periodic report of messages dropped because the ring was full.
pub struct DroppedReporter {
    last_report_us: i64,
}

impl DroppedReporter {
    pub const fn new() -> Self {
        Self { last_report_us: 0 }
    }

    /// Emit `[WARN] Dropped: N` at most once per interval, taking the
    /// stream's counter.
    ///
    /// Returns `true` if a report was written.
    pub fn poll<const N: usize, W>(
        &mut self,
        stream: &LogStream<N>,
        now_us: i64,
        mut write: W,
    ) -> bool
    where
        W: FnMut(&[u8]),
    {
        if now_us - self.last_report_us < DROPPED_REPORT_INTERVAL_US {
            return false;
        }
        self.last_report_us = now_us;

        let dropped = stream.take_dropped();
        if dropped == 0 {
            return false;
        }

        let mut msg = [0u8; 48];
        let len = crate::logging::format_to_buffer(
            &mut msg,
            format_args!("[WARN] Dropped: {}\n", dropped),
        );
        write(&msg[..len]);
        true
    }
}

impl Default for DroppedReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize UART1 TX-only for logging output.
///
/// Returns a UartTxDriver configured for TX-only operation.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None,  // CTS
        Option::<gpio::AnyIOPin>::None,  // RTS
        &uart_config,
    )
}
