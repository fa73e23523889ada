//! Per-lamp sequencing.
//!
//! One [`LampSequencer`] drives one lamp through the primary choreography:
//! wait out the configured delay, power the lamp on, then hand the lamp its
//! full ordered flow (shortened red phase first, then the phase table). The
//! sequencer owns nothing but its own execution state; everything it reads
//! is immutable, which is what lets the orchestrator run one sequencer per
//! lamp with no locking.
//!
//! Failures stay local by design: a lamp that is missing from the network or
//! rejects a command loses its own remaining phases and nothing else.

use anyhow::Result;
use std::sync::atomic::AtomicBool;

use crate::backend::LampFinder;
use crate::config::Settings;
use crate::constants::{FULL_SATURATION, RED_HUE};
use crate::flow::{Flow, FlowFinish, Transition};
use crate::schedule::ScheduleEntry;
use crate::time_source::sleep_cancellable;

/// Drives a single lamp through the primary choreography.
pub struct LampSequencer<'a> {
    entry: &'a ScheduleEntry,
    settings: &'a Settings,
}

impl<'a> LampSequencer<'a> {
    pub fn new(entry: &'a ScheduleEntry, settings: &'a Settings) -> Self {
        Self { entry, settings }
    }

    /// The complete ordered flow for this lamp.
    ///
    /// The first transition is the red phase, shortened by this lamp's delay
    /// so the red phase ends at the same moment on every lamp; validation
    /// guarantees the difference stays positive. The remaining transitions
    /// are the shared phase table, in order.
    pub fn primary_flow(&self) -> Flow {
        let brightness = self
            .entry
            .brightness_override
            .unwrap_or(self.settings.red_brightness);
        let red = Transition::hsv(
            RED_HUE,
            FULL_SATURATION,
            brightness,
            self.settings.red_duration.saturating_sub(self.entry.delay),
        );
        let mut transitions = Vec::with_capacity(1 + self.settings.phases.len());
        transitions.push(red);
        transitions.extend(self.settings.phases.iter().cloned());
        Flow {
            count: 1,
            finish: FlowFinish::Stay,
            transitions,
        }
    }

    /// Run this lamp's sequence to completion.
    ///
    /// Every suspension point observes `running`; on cancellation the lamp is
    /// left at its last commanded state. A lamp missing from the network is a
    /// warning, not an error. Command failures propagate so the caller can
    /// report them; either way siblings are unaffected.
    pub fn run(&self, finder: &dyn LampFinder, running: &AtomicBool) -> Result<()> {
        let name = self.entry.name.as_str();
        if !running.load(std::sync::atomic::Ordering::SeqCst) {
            return Ok(());
        }

        let Some(mut lamp) = finder.resolve(name)? else {
            log_warning!("{name}: lamp not found on the network");
            return Ok(());
        };

        if !self.entry.delay.is_zero() {
            log_debug!(
                "{name}: waiting {:.0}s before start",
                self.entry.delay.as_secs_f64()
            );
            if !sleep_cancellable(self.entry.delay, running) {
                return Ok(());
            }
        }

        log_info!("{name}: activating");
        lamp.set_power(true, self.settings.power_on)?;

        let flow = self.primary_flow();
        log_debug!(
            "{name}: red transition runs {:.0}s, {} transition(s) follow",
            flow.transitions[0].duration.as_secs_f64(),
            flow.transitions.len() - 1
        );
        lamp.apply_flow(&flow)?;

        // With an alarm chained behind us, hold this thread until the lamp
        // has animated the whole flow; the orchestrator's join barrier then
        // becomes the alarm start line.
        if self.settings.alarm.repeat > 0 {
            sleep_cancellable(flow.duration(), running);
        }
        Ok(())
    }
}

/// Run the alarm pulse sequence on one lamp.
///
/// All alarm sequencers start together once the primary barrier clears;
/// there are no per-lamp offsets here. The lamp repeats the pulse pass
/// `repeat` times and then restores whatever state it had before the alarm,
/// a policy the device applies itself ([`FlowFinish::Recover`]).
pub fn run_alarm(
    name: &str,
    settings: &Settings,
    finder: &dyn LampFinder,
    running: &AtomicBool,
) -> Result<()> {
    if !running.load(std::sync::atomic::Ordering::SeqCst) {
        return Ok(());
    }
    let Some(mut lamp) = finder.resolve(name)? else {
        log_warning!("{name}: lamp not found on the network");
        return Ok(());
    };
    log_info!("{name}: pulsing alarm {} time(s)", settings.alarm.repeat);
    lamp.apply_flow(&Flow {
        count: settings.alarm.repeat,
        finish: FlowFinish::Recover,
        transitions: settings.alarm.pulses.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockLampBackend, MockLampFinder};
    use crate::config::AlarmSettings;
    use crate::constants::test_constants::*;
    use crate::flow::TransitionTarget;
    use crate::schedule::LampSchedule;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn entry(name: &str, delay_ms: u64, brightness_override: Option<u8>) -> ScheduleEntry {
        ScheduleEntry {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            brightness_override,
        }
    }

    fn settings(entries: Vec<ScheduleEntry>) -> Settings {
        Settings {
            minute: Duration::from_millis(1),
            red_duration: TEST_RED_DURATION,
            red_brightness: TEST_RED_BRIGHTNESS,
            power_on: TEST_POWER_ON,
            schedule: LampSchedule::new(entries),
            phases: vec![Transition::hsv(1, 100, 1, Duration::from_millis(5000))],
            alarm: AlarmSettings::default(),
            groups: BTreeMap::new(),
        }
    }

    #[test]
    fn first_phase_duration_is_red_minus_delay() {
        let settings = settings(vec![]);
        let bed = entry("bed", 0, None);
        let nightstand = entry("nightstand", 6000, None);

        let bed_flow = LampSequencer::new(&bed, &settings).primary_flow();
        assert_eq!(bed_flow.transitions[0].duration, Duration::from_millis(10_000));

        let nightstand_flow = LampSequencer::new(&nightstand, &settings).primary_flow();
        assert_eq!(
            nightstand_flow.transitions[0].duration,
            Duration::from_millis(4_000)
        );
    }

    #[test]
    fn brightness_override_replaces_default_red_brightness() {
        let settings = settings(vec![]);

        let plain = entry("nightstand", 0, None);
        let flow = LampSequencer::new(&plain, &settings).primary_flow();
        assert!(matches!(
            flow.transitions[0].target,
            TransitionTarget::Hsv { brightness, .. } if brightness == TEST_RED_BRIGHTNESS
        ));

        let anchor = entry("bed", 0, Some(100));
        let flow = LampSequencer::new(&anchor, &settings).primary_flow();
        assert!(matches!(
            flow.transitions[0].target,
            TransitionTarget::Hsv { brightness, .. } if brightness == 100
        ));
    }

    #[test]
    fn phase_table_follows_red_in_order() {
        let settings = settings(vec![]);
        let bed = entry("bed", 0, None);
        let flow = LampSequencer::new(&bed, &settings).primary_flow();
        assert_eq!(flow.count, 1);
        assert_eq!(flow.finish, FlowFinish::Stay);
        assert_eq!(flow.transitions.len(), 2);
        assert_eq!(flow.transitions[1], settings.phases[0]);
    }

    #[test]
    fn missing_lamp_is_contained() {
        let settings = settings(vec![]);
        let e = entry("ghost", 0, None);
        let running = AtomicBool::new(true);

        let mut finder = MockLampFinder::new();
        finder.expect_resolve().times(1).returning(|_| Ok(None));

        let result = LampSequencer::new(&e, &settings).run(&finder, &running);
        assert!(result.is_ok());
    }

    #[test]
    fn powers_on_then_applies_flow() {
        let settings = settings(vec![]);
        let e = entry("bed", 0, Some(100));
        let running = AtomicBool::new(true);

        let mut backend = MockLampBackend::new();
        backend
            .expect_set_power()
            .times(1)
            .withf(|on, duration| *on && *duration == TEST_POWER_ON)
            .returning(|_, _| Ok(()));
        backend
            .expect_apply_flow()
            .times(1)
            .withf(|flow| {
                flow.count == 1
                    && flow.transitions[0].duration == TEST_RED_DURATION
                    && flow.transitions[0].brightness() == Some(100)
            })
            .returning(|_| Ok(()));

        let mut finder = MockLampFinder::new();
        finder
            .expect_resolve()
            .times(1)
            .return_once(move |_| Ok(Some(Box::new(backend))));

        LampSequencer::new(&e, &settings).run(&finder, &running).unwrap();
    }

    #[test]
    fn command_failure_stops_remaining_phases() {
        let settings = settings(vec![]);
        let e = entry("bed", 0, None);
        let running = AtomicBool::new(true);

        let mut backend = MockLampBackend::new();
        backend
            .expect_set_power()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));
        backend.expect_apply_flow().times(0);

        let mut finder = MockLampFinder::new();
        finder
            .expect_resolve()
            .times(1)
            .return_once(move |_| Ok(Some(Box::new(backend))));

        let result = LampSequencer::new(&e, &settings).run(&finder, &running);
        assert!(result.is_err());
    }

    #[test]
    fn cancelled_run_never_resolves() {
        let settings = settings(vec![]);
        let e = entry("bed", 0, None);
        let running = AtomicBool::new(false);

        let mut finder = MockLampFinder::new();
        finder.expect_resolve().times(0);

        LampSequencer::new(&e, &settings).run(&finder, &running).unwrap();
    }

    #[test]
    fn cancellation_during_delay_skips_activation() {
        let settings = settings(vec![]);
        let e = entry("nightstand", 6000, None);
        let running = std::sync::Arc::new(AtomicBool::new(true));

        let mut backend = MockLampBackend::new();
        backend.expect_set_power().times(0);
        backend.expect_apply_flow().times(0);

        let mut finder = MockLampFinder::new();
        finder
            .expect_resolve()
            .times(1)
            .return_once(move |_| Ok(Some(Box::new(backend))));

        // Cancel while the sequencer sits in its delay; the cancellable
        // sleep notices at the next poll slice and the lamp is never touched
        let flipper = {
            let running = running.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                running.store(false, Ordering::SeqCst);
            })
        };
        LampSequencer::new(&e, &settings).run(&finder, &running).unwrap();
        flipper.join().unwrap();
    }

    #[test]
    fn alarm_flow_repeats_and_recovers() {
        let mut s = settings(vec![]);
        s.alarm = AlarmSettings {
            repeat: 3,
            pulses: vec![
                Transition::temperature(6000, 1, Duration::from_millis(60)),
                Transition::temperature(6000, 100, Duration::from_millis(140)),
            ],
        };
        let running = AtomicBool::new(true);

        let mut backend = MockLampBackend::new();
        backend
            .expect_apply_flow()
            .times(1)
            .withf(|flow| {
                flow.count == 3
                    && flow.finish == FlowFinish::Recover
                    && flow.transitions.len() == 2
            })
            .returning(|_| Ok(()));

        let mut finder = MockLampFinder::new();
        finder
            .expect_resolve()
            .times(1)
            .return_once(move |_| Ok(Some(Box::new(backend))));

        run_alarm("bed", &s, &finder, &running).unwrap();
    }
}
