//! Host delay adapter.
//!
//! Implements [`DelayNs`] with `std::thread::sleep`.  When given an abort
//! flag the sleep is sliced and returns early once the flag is raised, so
//! a Ctrl-C during a long wait reaches the error boundary promptly and the
//! GPIO session can clean up.  The caller checks the flag after waiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Longest uninterrupted sleep while an abort flag is armed.
const ABORT_POLL: Duration = Duration::from_millis(50);

#[derive(Clone, Default)]
pub struct HostDelay {
    abort: Option<Arc<AtomicBool>>,
}

impl HostDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abort(abort: Arc<AtomicBool>) -> Self {
        Self { abort: Some(abort) }
    }

    fn sleep(&self, total: Duration) {
        let Some(abort) = &self.abort else {
            std::thread::sleep(total);
            return;
        };
        let deadline = Instant::now() + total;
        while !abort.load(Ordering::SeqCst) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(ABORT_POLL));
        }
    }
}

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleep(Duration::from_millis(u64::from(ms)));
    }
}
