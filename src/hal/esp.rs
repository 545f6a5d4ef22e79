//! ESP32-S3 implementation of the tone HAL.
//!
//! Raw ESP-IDF drivers through `esp_idf_svc::sys`:
//! - output port and selector: dedicated GPIO bundles (one CPU
//!   instruction per parallel access, callable from ISRs)
//! - sample timer: gptimer with auto-reload alarm
//! - PTT line: GPIO any-edge interrupt on the shared ISR service
//!
//! # Hardware Setup
//!
//! ```text
//! GPIO8..15  ──▶ R-2R ladder ──▶ radio modulator input
//! GPIO1..5,7 ◀── tone selector lines (bit 0..5)
//! GPIO16     ◀── PTT (active high)
//! ```

use core::ptr;
use core::sync::atomic::{AtomicU32, Ordering};

use esp_idf_svc::sys::{self, esp, EspError};

use super::{
    check_pin_count, pin_mask, EnableInput, HalError, OutputPort, PeriodRegister,
    SelectorInput, TimerControl,
};
use crate::config::{OUTPUT_PORT_WIDTH, SELECTOR_WIDTH, TIMER_CLOCK_HZ};

/// Timer alarm callback signature (runs in ISR context).
pub type AlarmCallback = unsafe extern "C" fn(
    timer: sys::gptimer_handle_t,
    edata: *const sys::gptimer_alarm_event_data_t,
    user_ctx: *mut core::ffi::c_void,
) -> bool;

/// GPIO edge callback signature (runs in ISR context).
pub type EdgeCallback = unsafe extern "C" fn(arg: *mut core::ffi::c_void);

fn configure_pins(
    pins: &[i32],
    mode: sys::gpio_mode_t,
    intr_type: sys::gpio_int_type_t,
) -> Result<(), EspError> {
    let conf = sys::gpio_config_t {
        pin_bit_mask: pin_mask(pins),
        mode,
        pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type,
        ..Default::default()
    };
    esp!(unsafe { sys::gpio_config(&conf) })
}

/// 8-bit output port on a dedicated GPIO bundle.
pub struct EspOutputPort {
    bundle: sys::dedic_gpio_bundle_handle_t,
}

// SAFETY: The bundle handle is only used from the core that created it;
// all access goes through the tone context's critical section.
unsafe impl Send for EspOutputPort {}

impl EspOutputPort {
    /// Configure `pins` as outputs (bit 0 first) and drive them low.
    pub fn new(pins: &[i32]) -> Result<Self, HalError> {
        check_pin_count(pins, OUTPUT_PORT_WIDTH)?;
        configure_pins(
            pins,
            sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            sys::gpio_int_type_t_GPIO_INTR_DISABLE,
        )?;

        let mut flags = sys::dedic_gpio_bundle_config_t__bindgen_ty_1::default();
        flags.set_out_en(1);
        let conf = sys::dedic_gpio_bundle_config_t {
            gpio_array: pins.as_ptr(),
            array_size: pins.len(),
            flags,
        };

        let mut bundle = ptr::null_mut();
        esp!(unsafe { sys::dedic_gpio_new_bundle(&conf, &mut bundle) })?;

        let mut port = Self { bundle };
        port.write(0);
        Ok(port)
    }
}

impl OutputPort for EspOutputPort {
    #[inline]
    fn write(&mut self, value: u8) {
        // SAFETY: bundle was created in `new` and is never freed
        unsafe { sys::dedic_gpio_bundle_write(self.bundle, 0xff, value as u32) };
    }
}

/// Selector lines on a dedicated GPIO input bundle.
pub struct EspSelectorInput {
    bundle: sys::dedic_gpio_bundle_handle_t,
}

impl EspSelectorInput {
    /// Configure `pins` as floating inputs (bit 0 first).
    pub fn new(pins: &[i32]) -> Result<Self, HalError> {
        check_pin_count(pins, SELECTOR_WIDTH)?;
        configure_pins(
            pins,
            sys::gpio_mode_t_GPIO_MODE_INPUT,
            sys::gpio_int_type_t_GPIO_INTR_DISABLE,
        )?;

        let mut flags = sys::dedic_gpio_bundle_config_t__bindgen_ty_1::default();
        flags.set_in_en(1);
        let conf = sys::dedic_gpio_bundle_config_t {
            gpio_array: pins.as_ptr(),
            array_size: pins.len(),
            flags,
        };

        let mut bundle = ptr::null_mut();
        esp!(unsafe { sys::dedic_gpio_new_bundle(&conf, &mut bundle) })?;
        Ok(Self { bundle })
    }
}

impl SelectorInput for EspSelectorInput {
    #[inline]
    fn read(&mut self) -> u8 {
        // SAFETY: bundle was created in `new` and is never freed
        unsafe { sys::dedic_gpio_bundle_read_in(self.bundle) as u8 }
    }
}

/// Failed start/stop calls, made from ISR context where nothing can be
/// returned. Read by the main loop.
static TIMER_CONTROL_FAULTS: AtomicU32 = AtomicU32::new(0);

/// Count `err` unless it is `ESP_ERR_INVALID_STATE`, which the gate's
/// repeated start/stop produces on a timer already in that state.
fn note_control_result(err: sys::esp_err_t) {
    if err != sys::ESP_OK as sys::esp_err_t
        && err != sys::ESP_ERR_INVALID_STATE as sys::esp_err_t
    {
        TIMER_CONTROL_FAULTS.fetch_add(1, Ordering::Relaxed);
    }
}

/// Periodic sample timer (gptimer, count up, auto-reload to 0).
///
/// The handle is `Copy`: the tone context keeps one for start/stop, the
/// frequency selector keeps another for the alarm value.
#[derive(Clone, Copy)]
pub struct EspSampleTimer {
    handle: sys::gptimer_handle_t,
}

// SAFETY: gptimer control functions take the driver's internal spinlock
// and are documented as ISR-safe.
unsafe impl Send for EspSampleTimer {}

impl EspSampleTimer {
    /// Create the timer at `TIMER_CLOCK_HZ` resolution, stopped, with the
    /// alarm at the slowest period.
    pub fn new() -> Result<Self, HalError> {
        let conf = sys::gptimer_config_t {
            clk_src: sys::soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
            direction: sys::gptimer_count_direction_t_GPTIMER_COUNT_UP,
            resolution_hz: TIMER_CLOCK_HZ,
            ..Default::default()
        };

        let mut handle = ptr::null_mut();
        esp!(unsafe { sys::gptimer_new_timer(&conf, &mut handle) })?;

        let timer = Self { handle };
        timer.program_alarm(u16::MAX)?;
        Ok(timer)
    }

    /// Register the alarm ISR and enable the timer's interrupt.
    ///
    /// Counting stays stopped until `TimerControl::start`.
    pub fn attach(&self, on_alarm: AlarmCallback) -> Result<(), HalError> {
        let callbacks = sys::gptimer_event_callbacks_t {
            on_alarm: Some(on_alarm),
        };
        esp!(unsafe {
            sys::gptimer_register_event_callbacks(self.handle, &callbacks, ptr::null_mut())
        })?;
        esp!(unsafe { sys::gptimer_enable(self.handle) })?;
        Ok(())
    }

    fn program_alarm(&self, top: u16) -> Result<(), EspError> {
        let mut flags = sys::gptimer_alarm_config_t__bindgen_ty_1::default();
        flags.set_auto_reload_on_alarm(1);
        let conf = sys::gptimer_alarm_config_t {
            // CTC semantics: `top + 1` ticks per period
            alarm_count: top as u64 + 1,
            reload_count: 0,
            flags,
        };
        esp!(unsafe { sys::gptimer_set_alarm_action(self.handle, &conf) })
    }

    /// Start/stop calls that failed since boot.
    pub fn control_faults() -> u32 {
        TIMER_CONTROL_FAULTS.load(Ordering::Relaxed)
    }
}

impl TimerControl for EspSampleTimer {
    #[inline]
    fn start(&mut self) {
        note_control_result(unsafe { sys::gptimer_start(self.handle) });
    }

    #[inline]
    fn stop(&mut self) {
        note_control_result(unsafe { sys::gptimer_stop(self.handle) });
        note_control_result(unsafe { sys::gptimer_set_raw_count(self.handle, 0) });
    }
}

impl PeriodRegister for EspSampleTimer {
    #[inline]
    fn set_top(&mut self, top: u16) -> Result<(), HalError> {
        self.program_alarm(top)?;
        Ok(())
    }
}

/// PTT input with any-edge interrupt.
pub struct EspEnableInput {
    pin: i32,
    active_high: bool,
}

impl EspEnableInput {
    /// Describe the PTT line. Call `configure` before use.
    pub const fn new(pin: i32, active_high: bool) -> Self {
        Self { pin, active_high }
    }

    /// Configure the pin as an input interrupting on both edges.
    pub fn configure(&self) -> Result<(), HalError> {
        configure_pins(
            &[self.pin],
            sys::gpio_mode_t_GPIO_MODE_INPUT,
            sys::gpio_int_type_t_GPIO_INTR_ANYEDGE,
        )?;
        Ok(())
    }

    /// Hook `on_edge` to the pin through the shared GPIO ISR service.
    pub fn attach(&self, on_edge: EdgeCallback) -> Result<(), HalError> {
        // Already installed by another driver is fine
        let err = unsafe { sys::gpio_install_isr_service(0) };
        if err != sys::ESP_ERR_INVALID_STATE as sys::esp_err_t {
            esp!(err)?;
        }
        esp!(unsafe { sys::gpio_isr_handler_add(self.pin, Some(on_edge), ptr::null_mut()) })?;
        Ok(())
    }
}

impl EnableInput for EspEnableInput {
    #[inline]
    fn is_active(&self) -> bool {
        let high = unsafe { sys::gpio_get_level(self.pin) } != 0;
        high == self.active_high
    }
}
