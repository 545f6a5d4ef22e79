//! Global log stream instance.
//!
//! One stream shared by both interrupt handlers and the main loop.
//! Drained to UART by the main loop only.

use crate::logging::LogStream;

/// Event log for PTT transitions, selector changes and bring-up.
pub static LOG_STREAM: LogStream = LogStream::new();
