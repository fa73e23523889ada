//! Time source abstraction for supporting both real and test-controlled time.
//!
//! Sequencer threads suspend at several points (initial delay, alarm chaining
//! wait). Routing every sleep through a process-wide [`TimeSource`] lets the
//! test suite replace real sleeping with an instant, recording implementation
//! so choreography tests run in milliseconds.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::constants::CANCEL_POLL_MS;

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Sleep for the specified duration (or skip it in tests)
    fn sleep(&self, duration: Duration);
}

/// Real-time implementation backed by the OS clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Install a specific time source. First call wins; later calls are ignored,
/// matching the set-once semantics of process-wide configuration.
pub fn init(source: Arc<dyn TimeSource>) {
    let _ = TIME_SOURCE.set(source);
}

fn get() -> &'static Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource))
}

/// Sleep through the active time source.
pub fn sleep(duration: Duration) {
    get().sleep(duration);
}

/// Sleep that can be interrupted by the shared running flag.
///
/// Sleeps in short slices, checking the flag between slices so a cancelled
/// run wakes up within [`CANCEL_POLL_MS`] instead of finishing a phase-long
/// sleep. Returns `true` if the full duration elapsed, `false` if the run
/// was cancelled underneath us.
pub fn sleep_cancellable(duration: Duration, running: &AtomicBool) -> bool {
    let slice = Duration::from_millis(CANCEL_POLL_MS);
    let mut remaining = duration;
    while !remaining.is_zero() {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(slice);
        sleep(step);
        remaining -= step;
    }
    running.load(Ordering::SeqCst)
}

/// Recording time source that never actually sleeps.
///
/// Used by the test suites to run whole choreographies instantly while still
/// observing how much time each thread would have slept.
#[cfg(feature = "testing-support")]
pub struct InstantTimeSource {
    slept: std::sync::Mutex<Duration>,
}

#[cfg(feature = "testing-support")]
impl InstantTimeSource {
    pub fn new() -> Self {
        Self {
            slept: std::sync::Mutex::new(Duration::ZERO),
        }
    }

    /// Total simulated sleep across all threads so far.
    pub fn total_slept(&self) -> Duration {
        *self.slept.lock().unwrap()
    }
}

#[cfg(feature = "testing-support")]
impl Default for InstantTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "testing-support")]
impl TimeSource for InstantTimeSource {
    fn sleep(&self, duration: Duration) {
        *self.slept.lock().unwrap() += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_flag_stops_sleep_immediately() {
        let running = AtomicBool::new(false);
        let start = std::time::Instant::now();
        let completed = sleep_cancellable(Duration::from_secs(60), &running);
        assert!(!completed);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn zero_duration_completes_while_running() {
        let running = AtomicBool::new(true);
        assert!(sleep_cancellable(Duration::ZERO, &running));
    }
}
