use proptest::prelude::*;
use std::collections::BTreeMap;
use std::time::Duration;

use sunriser::config::{AlarmSettings, Settings};
use sunriser::config::validation::validate_settings;
use sunriser::flow::Transition;
use sunriser::schedule::{LampSchedule, ScheduleEntry, total_duration};

fn settings_with(delays: &[u64], red_ms: u64) -> Settings {
    Settings {
        minute: Duration::from_secs(60),
        red_duration: Duration::from_millis(red_ms),
        red_brightness: 40,
        power_on: Duration::from_millis(8000),
        schedule: LampSchedule::new(
            delays
                .iter()
                .enumerate()
                .map(|(idx, delay_ms)| ScheduleEntry {
                    name: format!("lamp {idx}"),
                    delay: Duration::from_millis(*delay_ms),
                    brightness_override: None,
                })
                .collect(),
        ),
        phases: Vec::new(),
        alarm: AlarmSettings::default(),
        groups: BTreeMap::new(),
    }
}

proptest! {
    /// The schedule gate passes exactly when every delay is strictly below
    /// the red duration.
    #[test]
    fn validation_succeeds_iff_all_delays_below_red(
        delays in prop::collection::vec(0u64..120_000, 1..8),
        red_ms in 1u64..100_000,
    ) {
        let settings = settings_with(&delays, red_ms);
        let all_below = delays.iter().all(|d| *d < red_ms);
        prop_assert_eq!(validate_settings(&settings).is_ok(), all_below);
    }

    /// A failing validation names every offending lamp and no compliant one.
    #[test]
    fn validation_error_names_exactly_the_offenders(
        delays in prop::collection::vec(0u64..120_000, 1..8),
        red_ms in 1u64..100_000,
    ) {
        let settings = settings_with(&delays, red_ms);
        if let Err(error) = validate_settings(&settings) {
            let message = error.to_string();
            for (idx, delay_ms) in delays.iter().enumerate() {
                let name = format!("lamp {idx} ");
                prop_assert_eq!(
                    message.contains(&name),
                    *delay_ms >= red_ms,
                    "message: {}", message
                );
            }
        }
    }

    /// The planned total is the exact sum of its components, for any phase
    /// list including the empty one.
    #[test]
    fn total_duration_is_additive(
        red_ms in 0u64..1_000_000,
        power_on_ms in 0u64..100_000,
        phase_ms in prop::collection::vec(0u64..1_000_000, 0..10),
    ) {
        let phases: Vec<Transition> = phase_ms
            .iter()
            .map(|ms| Transition::hsv(1, 100, 1, Duration::from_millis(*ms)))
            .collect();
        let expected = red_ms + power_on_ms + phase_ms.iter().sum::<u64>();
        prop_assert_eq!(
            total_duration(
                Duration::from_millis(red_ms),
                Duration::from_millis(power_on_ms),
                &phases,
            ),
            Duration::from_millis(expected)
        );
    }
}
