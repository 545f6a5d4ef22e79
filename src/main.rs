//! CtcssEncoder - Main entry point
//!
//! 1. Configure output port, selector input, sample timer and PTT pin
//! 2. Install the tone context
//! 3. Attach the timer and PTT interrupts (only now can they fire)
//! 4. Apply the PTT level already present at boot
//! 5. Poll the selector forever, draining the event log between passes

#[cfg(target_os = "espidf")]
mod firmware {
    use core::ffi::c_void;

    use esp_idf_svc::hal::gpio::AnyOutputPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::UartTxDriver;
    use esp_idf_svc::sys;

    use ctcss_encoder::hal::esp::{EspEnableInput, EspOutputPort, EspSampleTimer, EspSelectorInput};
    use ctcss_encoder::hal::{EnableInput, HalError};
    use ctcss_encoder::tone::{FrequencySelector, ToneContext, ToneGenerator};
    use ctcss_encoder::uart_logger::{self, DroppedReporter, UartLoggerConfig};
    use ctcss_encoder::{rt_info, rt_warn, CONFIG, LOG_STREAM};

    type Selector = FrequencySelector<EspSelectorInput, EspSampleTimer>;

    static TONE: ToneContext<EspOutputPort, EspSampleTimer> = ToneContext::new();
    static PTT: EspEnableInput = EspEnableInput::new(CONFIG.enable_pin, CONFIG.enable_active_high);

    fn timestamp_us() -> i64 {
        unsafe { sys::esp_timer_get_time() }
    }

    /// Sample timer alarm: one waveform step.
    unsafe extern "C" fn on_timer_alarm(
        _timer: sys::gptimer_handle_t,
        _edata: *const sys::gptimer_alarm_event_data_t,
        _user_ctx: *mut c_void,
    ) -> bool {
        TONE.on_timer_period();
        false // no task woken
    }

    /// PTT edge: evaluate the level as it is now.
    unsafe extern "C" fn on_ptt_edge(_arg: *mut c_void) {
        TONE.on_enable_edge(PTT.is_active(), timestamp_us(), &LOG_STREAM);
    }

    fn bring_up(peripherals: Peripherals) -> Result<(Selector, UartTxDriver<'static>), HalError> {
        // Log UART first so later steps can report
        let log_config = UartLoggerConfig::default();
        // SAFETY: the log TX pin is not claimed by any other driver
        let log_pin = unsafe { AnyOutputPin::new(log_config.tx_pin) };
        let uart = uart_logger::init_uart_logger(peripherals.uart1, log_pin, &log_config)?;

        rt_info!(LOG_STREAM, timestamp_us(), "{}", env!("VERSION_STRING"));

        // Peripherals to their idle state, no interrupts yet
        let port = EspOutputPort::new(&CONFIG.output_pins)?;
        let selector_input = EspSelectorInput::new(&CONFIG.selector_pins)?;
        let timer = EspSampleTimer::new()?;
        PTT.configure()?;

        TONE.install(ToneGenerator::new(port, timer));

        // Interrupts last
        timer.attach(on_timer_alarm)?;
        PTT.attach(on_ptt_edge)?;

        // PTT may already be held at power-up
        TONE.on_enable_edge(PTT.is_active(), timestamp_us(), &LOG_STREAM);

        rt_info!(LOG_STREAM, timestamp_us(), "Tone encoder ready");
        Ok((FrequencySelector::new(selector_input, timer), uart))
    }

    pub fn run() -> ! {
        sys::link_patches();

        let result = Peripherals::take()
            .map_err(HalError::from)
            .and_then(bring_up);

        let (mut selector, mut uart) = match result {
            Ok(parts) => parts,
            Err(e) => {
                // Output port and timer stay idle
                println!("CtcssEncoder bring-up failed: {}", e);
                loop {
                    unsafe { sys::vTaskDelay(1000) };
                }
            }
        };

        let mut reporter = DroppedReporter::new();
        let mut timer_faults_seen = 0;

        selector.run(|change, selector| {
            let now = timestamp_us();

            if let Some(change) = change {
                rt_info!(
                    LOG_STREAM,
                    now,
                    "Selector 0x{:02x}: {} period {}",
                    change.code,
                    change.tone,
                    change.period
                );
            }

            if let Some(e) = selector.take_write_error() {
                rt_warn!(
                    LOG_STREAM,
                    now,
                    "Period write failed ({} total): {}",
                    selector.write_failures(),
                    e
                );
            }

            let timer_faults = EspSampleTimer::control_faults();
            if timer_faults != timer_faults_seen {
                timer_faults_seen = timer_faults;
                rt_warn!(LOG_STREAM, now, "Timer start/stop failed ({} total)", timer_faults);
            }

            uart_logger::drain_pending(&LOG_STREAM, CONFIG.log_drain_per_pass, |line| {
                let _ = uart.write(line);
            });
            reporter.poll(&LOG_STREAM, now, |line| {
                let _ = uart.write(line);
            });
        })
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("ctcss-encoder is ESP32-S3 firmware; build with --target xtensa-esp32s3-espidf");
    std::process::exit(1);
}
