//! The lamp schedule and the planned-duration calculator.
//!
//! The schedule maps each lamp to the delay it waits before its own sequence
//! begins. It is constructed once from configuration, validated, and then
//! shared read-only across all sequencer threads for the lifetime of a run.

use std::time::Duration;

use crate::flow::Transition;

/// One lamp's row in the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Lamp name as configured on the device itself.
    pub name: String,
    /// Time this lamp waits after the run starts before beginning its sequence.
    pub delay: Duration,
    /// Red-phase brightness for this lamp, replacing the configured default.
    ///
    /// This is how the anchor lamp (e.g. the bed) gets full power while the
    /// rest stay dim; the sequencer itself never branches on lamp names.
    pub brightness_override: Option<u8>,
}

/// Ordered collection of schedule entries, one per lamp.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LampSchedule {
    entries: Vec<ScheduleEntry>,
}

impl LampSchedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Lamp names in schedule order; the alarm stage fans out over these.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

/// Total planned runtime of the primary choreography.
///
/// Pure sum of the red phase, the power-on allowance, and every phase in the
/// table. The dry-run report and the live alarm chaining both call this, so
/// the planned and actual totals can never drift apart.
pub fn total_duration(red: Duration, power_on: Duration, phases: &[Transition]) -> Duration {
    red + power_on + phases.iter().map(|t| t.duration).sum::<Duration>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Transition;

    fn phase(ms: u64) -> Transition {
        Transition::hsv(1, 100, 1, Duration::from_millis(ms))
    }

    #[test]
    fn total_duration_sums_all_components() {
        let phases = [phase(3000), phase(4000), phase(7000), phase(6000)];
        let total = total_duration(
            Duration::from_millis(10_000),
            Duration::from_millis(5_000),
            &phases,
        );
        assert_eq!(total, Duration::from_millis(35_000));
    }

    #[test]
    fn total_duration_with_empty_phase_list() {
        let total = total_duration(
            Duration::from_millis(10_000),
            Duration::from_millis(5_000),
            &[],
        );
        assert_eq!(total, Duration::from_millis(15_000));
    }

    #[test]
    fn schedule_names_preserve_order() {
        let schedule = LampSchedule::new(vec![
            ScheduleEntry {
                name: "bed".into(),
                delay: Duration::ZERO,
                brightness_override: Some(100),
            },
            ScheduleEntry {
                name: "nightstand".into(),
                delay: Duration::from_secs(6),
                brightness_override: None,
            },
        ]);
        let names: Vec<_> = schedule.names().collect();
        assert_eq!(names, ["bed", "nightstand"]);
        assert_eq!(schedule.len(), 2);
        assert!(!schedule.is_empty());
    }
}
