//! Mock peripherals for host tests.

#![allow(dead_code)]

use ctcss_encoder::hal::{
    EnableInput, HalError, OutputPort, PeriodRegister, SelectorInput, TimerControl,
};
use ctcss_encoder::tone::ToneGenerator;

/// Output port that records every write
#[derive(Debug, Default)]
pub struct MockPort {
    pub value: u8,
    pub history: Vec<u8>,
}

impl OutputPort for MockPort {
    fn write(&mut self, value: u8) {
        self.value = value;
        self.history.push(value);
    }
}

/// Timer run control with call counters
#[derive(Debug, Default)]
pub struct MockTimer {
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
}

impl TimerControl for MockTimer {
    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}

/// Timer top register; `reject` makes writes fail and keep the old top
#[derive(Debug, Default)]
pub struct MockRegister {
    pub top: Option<u16>,
    pub writes: u32,
    pub reject: bool,
}

impl PeriodRegister for MockRegister {
    fn set_top(&mut self, top: u16) -> Result<(), HalError> {
        self.writes += 1;
        if self.reject {
            return Err(HalError::Rejected);
        }
        self.top = Some(top);
        Ok(())
    }
}

/// Selector port returning a fixed raw value
#[derive(Debug, Default)]
pub struct MockSelector {
    pub raw: u8,
    pub reads: u32,
}

impl MockSelector {
    pub fn new(raw: u8) -> Self {
        Self { raw, reads: 0 }
    }
}

impl SelectorInput for MockSelector {
    fn read(&mut self) -> u8 {
        self.reads += 1;
        self.raw
    }
}

/// PTT line
#[derive(Debug, Default)]
pub struct MockPtt {
    pub level: bool,
}

impl EnableInput for MockPtt {
    fn is_active(&self) -> bool {
        self.level
    }
}

pub type MockGenerator = ToneGenerator<MockPort, MockTimer>;

pub fn make_generator() -> MockGenerator {
    ToneGenerator::new(MockPort::default(), MockTimer::default())
}

/// Let `n` timer periods elapse. Like the hardware, the period event only
/// fires while the timer is counting.
pub fn run_periods(generator: &mut MockGenerator, n: usize) {
    for _ in 0..n {
        if generator.gate().timer().running {
            generator.on_period();
        }
    }
}
