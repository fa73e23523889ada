//! Centralized defaults and limits for the sunriser application.

/// Default length of one configured "minute" in seconds. Lowering this via
/// `--minute-duration` compresses the whole schedule for debugging.
pub const DEFAULT_MINUTE_DURATION_SECS: f64 = 60.0;

/// Default duration of the red phase in configured minutes.
pub const DEFAULT_RED_DURATION_MINUTES: f64 = 10.0;

/// Default brightness of the red phase (percent).
pub const DEFAULT_RED_BRIGHTNESS: u8 = 40;

/// Default smooth power-on allowance in milliseconds.
pub const DEFAULT_POWER_ON_MS: u64 = 8000;

/// Hue of the red phase (degrees on the HSV wheel).
pub const RED_HUE: u16 = 1;

/// Saturation used for every HSV transition (percent).
pub const FULL_SATURATION: u8 = 100;

/// Brightness percentage limits. Lamps never target 0% through a transition;
/// a full power-off is a distinct command.
pub const MINIMUM_BRIGHTNESS: u8 = 1;
pub const MAXIMUM_BRIGHTNESS: u8 = 100;

/// Color temperature limits accepted by the lamps (Kelvin).
pub const MINIMUM_TEMP: u16 = 1700;
pub const MAXIMUM_TEMP: u16 = 6500;

/// Shortest transition step the lamp firmware accepts (milliseconds).
pub const MINIMUM_FLOW_STEP_MS: u64 = 50;

/// How long the cancellable sleep waits between checks of the running flag.
pub const CANCEL_POLL_MS: u64 = 100;

/// Multicast group and port used for lamp discovery.
pub const DISCOVERY_MULTICAST_ADDR: &str = "239.255.255.250:1982";

/// How long discovery listens for replies (milliseconds).
pub const DISCOVERY_TIMEOUT_MS: u64 = 2000;

/// TCP port of the lamp control protocol.
pub const LAMP_CONTROL_PORT: u16 = 55443;

/// Default transition duration for the `set` command in seconds.
pub const DEFAULT_SET_DURATION_SECS: u64 = 1;

/// Shared values for unit tests across modules.
#[cfg(any(test, feature = "testing-support"))]
pub mod test_constants {
    use std::time::Duration;

    pub const TEST_RED_DURATION: Duration = Duration::from_millis(10_000);
    pub const TEST_POWER_ON: Duration = Duration::from_millis(5_000);
    pub const TEST_RED_BRIGHTNESS: u8 = 40;
}
