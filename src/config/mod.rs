//! Configuration system for sunriser with validation and time-base resolution.
//!
//! Configuration is TOML-based and loaded from
//! `$XDG_CONFIG_HOME/sunriser/sunriser.toml` (or an explicit directory passed
//! via `--config`). A missing file is created from the built-in default on
//! first run.
//!
//! ## Configuration Structure
//!
//! ```toml
//! minute_duration = 60.0     # seconds per configured "minute"
//! red_duration = 10.0        # red phase length in minutes
//! red_brightness = 40        # default red-phase brightness (1-100)
//! power_on_duration = 8000   # smooth power-on allowance in ms
//!
//! [[lamp]]                   # one entry per lamp, in schedule order
//! name = "bed"
//! delay = 0.0                # minutes before this lamp starts
//! brightness = 100           # optional red-phase override
//!
//! [[phase]]                  # phases after the red phase, in order
//! hue = 1
//! saturation = 100
//! brightness = 1
//! duration = 5.0             # minutes
//!
//! [alarm]
//! repeat = 0                 # pulse count, overridden by --alarm
//!
//! [[alarm.pulse]]            # one pulse pass, durations in ms
//! temperature = 6000
//! brightness = 1
//! duration = 60
//!
//! [groups]                   # lamp groups for the `set` command
//! bedroom = ["bed", "nightstand"]
//! ```
//!
//! ## Two-stage model
//!
//! The raw [`Config`] mirrors the file; [`Config::resolve`] folds in CLI
//! overrides and the `minute_duration` time base exactly once, producing an
//! immutable [`Settings`] value with concrete `Duration`s. Everything past
//! this point — validator, duration calculator, sequencers — reads `Settings`
//! and never rescales time again.

pub mod builder;
pub mod validation;


use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::flow::Transition;
use crate::schedule::{LampSchedule, ScheduleEntry};

/// Raw configuration as written in `sunriser.toml`.
///
/// Most fields are optional and fall back to the defaults in
/// [`crate::constants`]. Durations here are still in config units (minutes
/// or milliseconds); [`Config::resolve`] converts them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Seconds per configured "minute". Lowered for compressed test runs.
    pub minute_duration: Option<f64>,
    /// Red phase length in configured minutes.
    pub red_duration: Option<f64>,
    /// Default red-phase brightness percentage.
    pub red_brightness: Option<u8>,
    /// Smooth power-on allowance in milliseconds.
    pub power_on_duration: Option<u64>,
    /// The lamp schedule, in order.
    #[serde(default, rename = "lamp")]
    pub lamps: Vec<LampEntry>,
    /// Phases after the red phase, in order.
    #[serde(default, rename = "phase")]
    pub phases: Vec<PhaseEntry>,
    /// Alarm pulse configuration.
    pub alarm: Option<AlarmConfig>,
    /// Named lamp groups addressable by the `set` command.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

/// One `[[lamp]]` row.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LampEntry {
    pub name: String,
    /// Minutes this lamp waits before starting. Defaults to 0.
    pub delay: Option<f64>,
    /// Red-phase brightness override for this lamp.
    pub brightness: Option<u8>,
}

/// One `[[phase]]` row. Exactly one of `hue` or `temperature` must be set.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PhaseEntry {
    pub hue: Option<u16>,
    pub saturation: Option<u8>,
    pub temperature: Option<u16>,
    pub brightness: Option<u8>,
    /// Phase length in configured minutes.
    pub duration: f64,
}

/// The `[alarm]` table.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AlarmConfig {
    /// Default pulse count; `--alarm N` overrides it.
    pub repeat: Option<u32>,
    #[serde(default, rename = "pulse")]
    pub pulses: Vec<PulseEntry>,
}

/// One `[[alarm.pulse]]` row. Either a color target or `sleep = true`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PulseEntry {
    pub hue: Option<u16>,
    pub saturation: Option<u8>,
    pub temperature: Option<u16>,
    pub brightness: Option<u8>,
    pub sleep: Option<bool>,
    /// Pulse step length in milliseconds.
    pub duration: u64,
}

/// Command-line overrides folded in during resolution.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replacement for `minute_duration` (seconds).
    pub minute_duration: Option<f64>,
    /// Replacement for the alarm repeat count.
    pub alarm_repeat: Option<u32>,
}

/// Fully resolved, immutable run settings.
///
/// Constructed once at startup, validated once, then shared by reference
/// across every sequencer thread. No mutation API exists past this point.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Length of one configured minute.
    pub minute: Duration,
    pub red_duration: Duration,
    pub red_brightness: u8,
    pub power_on: Duration,
    pub schedule: LampSchedule,
    pub phases: Vec<Transition>,
    pub alarm: AlarmSettings,
    pub groups: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlarmSettings {
    pub repeat: u32,
    pub pulses: Vec<Transition>,
}

impl Config {
    /// Load the configuration, creating the default file on first run.
    ///
    /// `config_dir` comes from `--config`; when absent the XDG config
    /// directory is used.
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        let path = Self::config_path(config_dir)?;
        if !path.exists() {
            builder::create_default_config(&path)?;
            log_block_start!("Created default configuration at {}", path.display());
        }
        Self::load_from_path(&path)
    }

    /// Load and parse a specific configuration file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse configuration from {}", path.display()))
    }

    /// Resolve the path of `sunriser.toml`.
    pub fn config_path(config_dir: Option<&Path>) -> Result<PathBuf> {
        let dir = match config_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .context("Could not determine the user configuration directory")?
                .join("sunriser"),
        };
        Ok(dir.join("sunriser.toml"))
    }

    /// Fold in CLI overrides and the time base, producing concrete settings.
    ///
    /// This is the single place where config units (minutes, milliseconds)
    /// become `Duration`s. Fails on malformed entries (a phase with both or
    /// neither color model); range checks live in
    /// [`validation::validate_settings`].
    pub fn resolve(&self, overrides: &Overrides) -> Result<Settings> {
        let minute_secs = overrides
            .minute_duration
            .or(self.minute_duration)
            .unwrap_or(DEFAULT_MINUTE_DURATION_SECS);
        if !minute_secs.is_finite() || minute_secs <= 0.0 {
            bail!("minute_duration ({minute_secs}) must be a positive number of seconds");
        }
        let minute = Duration::from_secs_f64(minute_secs);

        let red_minutes = self.red_duration.unwrap_or(DEFAULT_RED_DURATION_MINUTES);
        if !red_minutes.is_finite() || red_minutes < 0.0 {
            bail!("red_duration ({red_minutes}) must be a non-negative number of minutes");
        }

        let schedule = LampSchedule::new(
            self.lamps
                .iter()
                .map(|lamp| {
                    let delay_minutes = lamp.delay.unwrap_or(0.0);
                    if !delay_minutes.is_finite() || delay_minutes < 0.0 {
                        bail!(
                            "lamp '{}': delay ({delay_minutes}) must be a non-negative number of minutes",
                            lamp.name
                        );
                    }
                    Ok(ScheduleEntry {
                        name: lamp.name.clone(),
                        delay: minute.mul_f64(delay_minutes),
                        brightness_override: lamp.brightness,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        );

        let phases = self
            .phases
            .iter()
            .enumerate()
            .map(|(idx, phase)| phase.to_transition(minute).with_context(|| format!("phase #{}", idx + 1)))
            .collect::<Result<Vec<_>>>()?;

        let alarm = match &self.alarm {
            Some(alarm) => AlarmSettings {
                repeat: overrides.alarm_repeat.or(alarm.repeat).unwrap_or(0),
                pulses: alarm
                    .pulses
                    .iter()
                    .enumerate()
                    .map(|(idx, pulse)| {
                        pulse
                            .to_transition()
                            .with_context(|| format!("alarm pulse #{}", idx + 1))
                    })
                    .collect::<Result<Vec<_>>>()?,
            },
            None => AlarmSettings {
                repeat: overrides.alarm_repeat.unwrap_or(0),
                pulses: Vec::new(),
            },
        };

        Ok(Settings {
            minute,
            red_duration: minute.mul_f64(red_minutes),
            red_brightness: self.red_brightness.unwrap_or(DEFAULT_RED_BRIGHTNESS),
            power_on: Duration::from_millis(self.power_on_duration.unwrap_or(DEFAULT_POWER_ON_MS)),
            schedule,
            phases,
            alarm,
            groups: self.groups.clone(),
        })
    }
}

impl PhaseEntry {
    fn to_transition(&self, minute: Duration) -> Result<Transition> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            bail!(
                "duration ({}) must be a non-negative number of minutes",
                self.duration
            );
        }
        let duration = minute.mul_f64(self.duration);
        let brightness = self
            .brightness
            .context("a phase requires an explicit brightness")?;
        match (self.hue, self.temperature) {
            (Some(hue), None) => Ok(Transition::hsv(
                hue,
                self.saturation.unwrap_or(FULL_SATURATION),
                brightness,
                duration,
            )),
            (None, Some(kelvin)) => Ok(Transition::temperature(kelvin, brightness, duration)),
            (Some(_), Some(_)) => bail!("a phase takes either hue or temperature, not both"),
            (None, None) => bail!("a phase requires either hue or temperature"),
        }
    }
}

impl PulseEntry {
    fn to_transition(&self) -> Result<Transition> {
        let duration = Duration::from_millis(self.duration);
        if self.sleep.unwrap_or(false) {
            if self.hue.is_some() || self.temperature.is_some() || self.brightness.is_some() {
                bail!("a sleep pulse takes no color or brightness fields");
            }
            return Ok(Transition::sleep(duration));
        }
        let brightness = self
            .brightness
            .context("a pulse requires an explicit brightness")?;
        match (self.hue, self.temperature) {
            (Some(hue), None) => Ok(Transition::hsv(
                hue,
                self.saturation.unwrap_or(FULL_SATURATION),
                brightness,
                duration,
            )),
            (None, Some(kelvin)) => Ok(Transition::temperature(kelvin, brightness, duration)),
            (Some(_), Some(_)) => bail!("a pulse takes either hue or temperature, not both"),
            (None, None) => bail!("a pulse requires either hue or temperature, or sleep = true"),
        }
    }
}
