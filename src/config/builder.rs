//! Default configuration generation.
//!
//! When no `sunriser.toml` exists, this module writes a complete, commented
//! default so a first run works out of the box and the user has a template
//! to edit instead of a reference manual to read.

use anyhow::{Context, Result};
use std::path::Path;

/// The default configuration written on first run.
///
/// The schedule and phase table describe a ten-minute bedroom sunrise: the
/// bed lamp leads at full red, the others follow dimmer at staggered
/// offsets, then everything fades to warm white over five minutes. The
/// alarm section is a short cool-white double blink with a rest.
const DEFAULT_CONFIG: &str = r#"#[Timing]
minute_duration = 60.0     # seconds per configured "minute" (lower to compress for testing)
red_duration = 10.0        # red phase length in minutes
red_brightness = 40        # default red-phase brightness (1-100)
power_on_duration = 8000   # smooth power-on allowance in milliseconds

#[Schedule] - one [[lamp]] per lamp, delays in minutes
[[lamp]]
name = "bed"
delay = 0.0
brightness = 100           # the anchor lamp shines at full power

[[lamp]]
name = "ikea lamp"
delay = 4.0

[[lamp]]
name = "nightstand"
delay = 6.0

[[lamp]]
name = "bedroom 1"
delay = 8.0

[[lamp]]
name = "bedroom 2"
delay = 9.0

#[Phases] - after the red phase, in order, durations in minutes
[[phase]]
hue = 1
saturation = 100
brightness = 1
duration = 5.0

#[Alarm] - pulse pass run after the sunrise, durations in milliseconds
[alarm]
repeat = 0                 # pulse count (0 disables, --alarm N overrides)

[[alarm.pulse]]
temperature = 6000
brightness = 1
duration = 60

[[alarm.pulse]]
temperature = 6000
brightness = 100
duration = 140

[[alarm.pulse]]
temperature = 6000
brightness = 1
duration = 60

[[alarm.pulse]]
temperature = 6000
brightness = 100
duration = 140

[[alarm.pulse]]
sleep = true
duration = 600

#[Groups] - lamp groups addressable by `sunriser set`
[groups]
bedroom = ["bed", "ikea lamp", "nightstand", "bedroom 1", "bedroom 2"]
"#;

/// Write the default configuration to `path`, creating parent directories.
///
/// Refuses to overwrite an existing file.
pub fn create_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "Refusing to overwrite existing configuration at {}",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create configuration directory {}",
                parent.display()
            )
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write default configuration to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn default_config_parses_and_resolves() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let settings = config.resolve(&Default::default()).unwrap();
        assert_eq!(settings.schedule.len(), 5);
        assert_eq!(settings.alarm.pulses.len(), 5);
        assert_eq!(settings.alarm.repeat, 0);
        assert!(settings.groups.contains_key("bedroom"));
        crate::config::validation::validate_settings(&settings).unwrap();
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sunriser.toml");
        create_default_config(&path).unwrap();
        assert!(create_default_config(&path).is_err());
    }
}
