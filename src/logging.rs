//! Event log shared by the PTT interrupt and the selector loop.
//!
//! ```text
//! PTT edge ISR ──┐
//!                ├──▶ LogStream ring ──▶ main loop ──▶ UART
//! selector loop ─┘     (fixed slots)     N per pass
//! ```
//!
//! Producers run on one core: the selector loop pushes and is preempted
//! by the PTT handler, which may push in the middle of the loop's own
//! push or pop. The sample timer handler never logs.
//!
//! Nothing here allocates or blocks. A full ring drops the new message
//! and counts it; entries already queued are never overwritten.

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Message bytes kept per entry.
pub const MAX_MSG_LEN: usize = 64;

/// Default ring size (entries, power of two).
pub const LOG_BUFFER_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
        }
    }
}

/// One queued message.
#[derive(Clone, Copy)]
pub struct LogEntry {
    pub timestamp_us: i64,
    pub level: LogLevel,
    len: u8,
    msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Build an entry, keeping at most `MAX_MSG_LEN` bytes of `text`.
    pub fn new(timestamp_us: i64, level: LogLevel, text: &[u8]) -> Self {
        let len = text.len().min(MAX_MSG_LEN);
        let mut msg = [0; MAX_MSG_LEN];
        msg[..len].copy_from_slice(&text[..len]);
        Self {
            timestamp_us,
            level,
            len: len as u8,
            msg,
        }
    }

    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.msg[..self.len as usize]
    }
}

/// Fixed-slot ring, many producers, one consumer (the main loop).
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a producer only writes the slot it claimed through the CAS on
// `write_idx`; only the main loop reads, and only slots below `write_idx`.
unsafe impl<const N: usize> Sync for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: u32 = N as u32 - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "log ring size must be a power of two");

        Self {
            slots: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a message. Never blocks.
    ///
    /// Returns `false` (and counts a drop) when the ring is full.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, text: &[u8]) -> bool {
        let mut write = self.write_idx.load(Ordering::Acquire);

        // A dropped message must not claim a slot
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }

            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        // SAFETY: slot `write` belongs to this producer until the consumer
        // passes it, which it cannot do before this push returns on a
        // single core.
        unsafe {
            (*self.slots.get())[(write & Self::MASK) as usize] =
                LogEntry::new(timestamp_us, level, text);
        }
        true
    }

    /// Take the oldest entry (main loop only).
    pub fn pop(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        if read == self.write_idx.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: single consumer; `read` is below `write_idx`
        let entry = unsafe { (*self.slots.get())[(read & Self::MASK) as usize] };
        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Entries waiting for `pop`.
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        self.write_idx.load(Ordering::Acquire).wrapping_sub(read)
    }

    /// Messages dropped since the last `take_dropped`.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and clear the drop counter in one step, so a drop from an
    /// interrupt between read and clear is not lost.
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// `fmt::Write` over a byte slice that stops at the end, on a char boundary.
struct Truncating<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut n = s.len().min(self.buf.len() - self.len);
        while !s.is_char_boundary(n) {
            n -= 1;
        }
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

/// Format into `buf`, silently truncating. Returns the bytes written.
pub fn format_to_buffer(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut out = Truncating { buf, len: 0 };
    let _ = fmt::write(&mut out, args);
    out.len
}

/// Format on the stack and push to a `LogStream`.
///
/// ```ignore
/// rt_log!(LogLevel::Info, LOG_STREAM, now_us, "code 0x{:02x}", code);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pushes as the PTT handler would when it fires while the main loop
    /// is formatting its own message.
    struct PttFiresDuringFormat<'a, const N: usize>(&'a LogStream<N>);

    impl<const N: usize> fmt::Display for PttFiresDuringFormat<'_, N> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.push(2, LogLevel::Info, b"PTT on: tone started");
            f.write_str("0x3f: 67.0 Hz")
        }
    }

    fn texts<const N: usize>(stream: &LogStream<N>) -> Vec<Vec<u8>> {
        core::iter::from_fn(|| stream.pop())
            .map(|e| e.text().to_vec())
            .collect()
    }

    #[test]
    fn test_push_pop() {
        let stream = LogStream::<4>::new();
        assert!(stream.push(1000, LogLevel::Info, b"PTT on: tone started"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.pop().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.text(), b"PTT on: tone started");
        assert!(stream.pop().is_none());
    }

    #[test]
    fn test_interrupt_during_loop_format_is_queued_first() {
        let stream = LogStream::<4>::new();
        crate::rt_info!(stream, 3, "Selector {}", PttFiresDuringFormat(&stream));

        assert_eq!(
            texts(&stream),
            vec![b"PTT on: tone started".to_vec(), b"Selector 0x3f: 67.0 Hz".to_vec()]
        );
    }

    #[test]
    fn test_ptt_burst_while_loop_stalled_keeps_oldest() {
        let stream = LogStream::<4>::new();
        for i in 0..10 {
            let text: &[u8] = if i % 2 == 0 { b"PTT on" } else { b"PTT off" };
            stream.push(i, LogLevel::Info, text);
        }

        assert_eq!(stream.pending(), 4);
        assert_eq!(stream.take_dropped(), 6);
        assert_eq!(stream.dropped(), 0);

        let stamps: Vec<i64> = core::iter::from_fn(|| stream.pop())
            .map(|e| e.timestamp_us)
            .collect();
        assert_eq!(stamps, vec![0, 1, 2, 3]);

        // Room again after the drain
        assert!(stream.push(10, LogLevel::Info, b"PTT on"));
    }

    #[test]
    fn test_interleaved_push_pop_across_many_wraps() {
        let stream = LogStream::<4>::new();
        let mut expected = 0i64;

        for pass in 0..50i64 {
            // Loop pushes one, the interrupt adds up to two, loop drains one
            stream.push(pass * 3, LogLevel::Info, b"loop");
            stream.push(pass * 3 + 1, LogLevel::Info, b"isr");
            if pass % 2 == 0 {
                stream.push(pass * 3 + 2, LogLevel::Info, b"isr");
            }
            while let Some(entry) = stream.pop() {
                assert!(entry.timestamp_us >= expected);
                expected = entry.timestamp_us + 1;
            }
        }

        assert_eq!(stream.dropped(), 0);
        assert_eq!(stream.pending(), 0);
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<2>::new();
        assert!(stream.push(0, LogLevel::Warn, &[b'x'; MAX_MSG_LEN + 10]));
        assert_eq!(stream.pop().unwrap().text().len(), MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer_truncates_on_char_boundary() {
        let mut buf = [0u8; 8];
        let len = format_to_buffer(&mut buf, format_args!("period {}", 932));
        assert_eq!(&buf[..len], b"period 9");

        // 'µ' is two bytes and must not be split
        let mut buf = [0u8; 4];
        let len = format_to_buffer(&mut buf, format_args!("12{}", "µs"));
        assert_eq!(&buf[..len], "12µ".as_bytes());

        let mut buf = [0u8; 3];
        let len = format_to_buffer(&mut buf, format_args!("12{}", "µs"));
        assert_eq!(&buf[..len], b"12");
    }

    #[test]
    fn test_level_macros() {
        let stream = LogStream::<4>::new();
        crate::rt_info!(stream, 1, "code 0x{:02x}", 0x3f);
        crate::rt_warn!(stream, 2, "period write failed");
        crate::rt_error!(stream, 3, "bring-up failed");

        let levels: Vec<LogLevel> = core::iter::from_fn(|| stream.pop())
            .map(|e| e.level)
            .collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error]);
    }
}
