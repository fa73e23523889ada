//! Signal handling.
//!
//! A run spends almost all of its time asleep inside sequencer threads, so
//! shutdown is cooperative: SIGINT and SIGTERM flip a shared running flag
//! that every suspension point polls. Sequencers then return between phases,
//! leaving the lamps at their last commanded state rather than mid-transition.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Install the signal handler and return the shared running flag.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handler")?;

    let flag = running.clone();
    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log_pipe!();
            log_decorated!("Received signal {signal}, finishing up...");
            flag.store(false, Ordering::SeqCst);
        }
    });

    Ok(running)
}
