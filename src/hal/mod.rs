//! Hardware Abstraction Layer for CtcssEncoder.
//!
//! Thin traits over the four peripherals the tone logic needs.
//! Business logic stays in `tone`, HAL is just I/O.

#[cfg(target_os = "espidf")]
pub mod esp;

/// 8-bit parallel output feeding the tone DAC.
pub trait OutputPort {
    /// Drive all port lines to `value`.
    fn write(&mut self, value: u8);
}

/// Counting enable of the periodic sample timer.
pub trait TimerControl {
    /// Start counting; the period interrupt begins firing.
    fn start(&mut self);

    /// Stop counting; no further period interrupts.
    fn stop(&mut self);
}

/// Top-value register of the periodic sample timer.
///
/// Read only by hardware, so it may be written from the main loop while
/// the timer is counting.
pub trait PeriodRegister {
    /// Program the timer to fire every `top + 1` ticks.
    ///
    /// On error the timer keeps its previous period.
    fn set_top(&mut self, top: u16) -> Result<(), HalError>;
}

/// Parallel tone selector input.
pub trait SelectorInput {
    /// Raw port value, bit 0 = selector line 0.
    fn read(&mut self) -> u8;
}

/// Transmit-enable (PTT) input line.
pub trait EnableInput {
    /// Instantaneous level, already corrected for polarity.
    fn is_active(&self) -> bool;
}

/// Peripheral errors.
#[derive(Debug)]
pub enum HalError {
    /// ESP-IDF driver call failed
    #[cfg(target_os = "espidf")]
    Esp(esp_idf_svc::sys::EspError),
    /// Pin list length does not match the port width
    InvalidPinCount { expected: usize, actual: usize },
    /// Peripheral refused the request
    Rejected,
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for HalError {
    fn from(e: esp_idf_svc::sys::EspError) -> Self {
        HalError::Esp(e)
    }
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(target_os = "espidf")]
            HalError::Esp(e) => write!(f, "ESP-IDF error: {}", e),
            HalError::InvalidPinCount { expected, actual } => {
                write!(f, "expected {} pins, got {}", expected, actual)
            }
            HalError::Rejected => f.write_str("request rejected"),
        }
    }
}

/// Check a pin list against the expected port width.
pub fn check_pin_count(pins: &[i32], expected: usize) -> Result<(), HalError> {
    if pins.len() == expected {
        Ok(())
    } else {
        Err(HalError::InvalidPinCount { expected, actual: pins.len() })
    }
}

/// Pack a pin list into an ESP-IDF style GPIO bit mask.
pub fn pin_mask(pins: &[i32]) -> u64 {
    pins.iter()
        .filter(|&&pin| (0..64).contains(&pin))
        .fold(0u64, |mask, &pin| mask | (1u64 << pin))
}
