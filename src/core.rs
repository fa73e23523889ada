//! The orchestrator: fans out one sequencer per lamp and runs the stages.
//!
//! A run has at most two stages. The primary stage starts every lamp's
//! sequencer at once (true fan-out, not a queue) and the enclosing thread
//! scope is the join barrier: nothing proceeds until every sequencer has
//! returned, success or failure. The alarm stage, if a pulse count is
//! configured, then fans out alarm sequencers over the same lamps. The
//! barrier is what guarantees no alarm command ever reaches a lamp whose
//! primary sequence is still in flight.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::backend::LampFinder;
use crate::config::Settings;
use crate::schedule::total_duration;
use crate::sequencer::{LampSequencer, run_alarm};

/// Runs a full choreography over a validated, immutable [`Settings`].
///
/// `Sunriser::new(..)` for a normal run, `.without_sunrise()` to skip
/// straight to the alarm stage.
pub struct Sunriser<'a> {
    settings: &'a Settings,
    running: Arc<AtomicBool>,
    sunrise_enabled: bool,
}

impl<'a> Sunriser<'a> {
    pub fn new(settings: &'a Settings, running: Arc<AtomicBool>) -> Self {
        Self {
            settings,
            running,
            sunrise_enabled: true,
        }
    }

    /// Skip the primary choreography and run only the alarm stage.
    pub fn without_sunrise(mut self) -> Self {
        self.sunrise_enabled = false;
        self
    }

    /// Total planned runtime of the primary choreography.
    ///
    /// The dry-run report prints exactly this number; the live run's alarm
    /// chaining is built from the same sum, so the two can never disagree.
    pub fn planned_duration(&self) -> Duration {
        total_duration(
            self.settings.red_duration,
            self.settings.power_on,
            &self.settings.phases,
        )
    }

    /// Execute the configured stages.
    ///
    /// Per-lamp failures are reported and contained; the overall result only
    /// reflects whether the run itself could be carried out.
    pub fn run(&self, finder: &dyn LampFinder) -> Result<()> {
        if self.sunrise_enabled {
            log_block_start!(
                "Commencing sunrise across {} lamp(s)",
                self.settings.schedule.len()
            );
            std::thread::scope(|scope| {
                for entry in self.settings.schedule.entries() {
                    let running = &self.running;
                    scope.spawn(move || {
                        let sequencer = LampSequencer::new(entry, self.settings);
                        if let Err(error) = sequencer.run(finder, running) {
                            log_warning!("{}: {error:#}", entry.name);
                        }
                    });
                }
            });
            // Scope exit is the join barrier: every primary sequencer has
            // returned before anything below runs.
        }

        if self.settings.alarm.repeat > 0 && self.running.load(Ordering::SeqCst) {
            log_block_start!(
                "Triggering alarm on {} lamp(s)",
                self.settings.schedule.len()
            );
            std::thread::scope(|scope| {
                for name in self.settings.schedule.names() {
                    let running = &self.running;
                    scope.spawn(move || {
                        if let Err(error) = run_alarm(name, self.settings, finder, running) {
                            log_warning!("{name}: {error:#}");
                        }
                    });
                }
            });
        }

        Ok(())
    }
}
