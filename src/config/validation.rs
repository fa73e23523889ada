//! Settings validation.
//!
//! This is the fail-fast gate of a run: it executes once, after resolution
//! and before discovery or any network I/O. A failure here aborts the whole
//! run — a bad schedule is a configuration authoring error and must never
//! partially execute.

use anyhow::{Result, bail};

use super::Settings;
use crate::constants::*;
use crate::flow::{Transition, TransitionTarget};

/// Validate resolved settings before anything is scheduled.
///
/// The delay invariant reports *every* offending lamp, not just the first:
/// the author fixing the schedule should see the full damage in one pass.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.red_duration.is_zero() {
        bail!("red_duration must be greater than zero");
    }
    if settings.schedule.is_empty() {
        bail!("the lamp schedule is empty; configure at least one [[lamp]]");
    }

    // Every delay must be strictly below the red duration: each lamp's first
    // transition lasts red_duration - delay, which has to stay positive.
    let offenders: Vec<String> = settings
        .schedule
        .entries()
        .iter()
        .filter(|entry| entry.delay >= settings.red_duration)
        .map(|entry| {
            format!(
                "{} ({:.1}s >= {:.1}s)",
                entry.name,
                entry.delay.as_secs_f64(),
                settings.red_duration.as_secs_f64()
            )
        })
        .collect();
    if !offenders.is_empty() {
        bail!(
            "lamp delays exceed the duration of the red phase: {}",
            offenders.join(", ")
        );
    }

    validate_brightness(settings.red_brightness, "red_brightness")?;
    for entry in settings.schedule.entries() {
        if let Some(brightness) = entry.brightness_override {
            validate_brightness(brightness, &format!("lamp '{}' brightness", entry.name))?;
        }
    }

    for (idx, phase) in settings.phases.iter().enumerate() {
        validate_transition(phase, &format!("phase #{}", idx + 1))?;
    }
    for (idx, pulse) in settings.alarm.pulses.iter().enumerate() {
        validate_transition(pulse, &format!("alarm pulse #{}", idx + 1))?;
    }

    if settings.alarm.repeat > 0 && settings.alarm.pulses.is_empty() {
        bail!("an alarm was requested but no [[alarm.pulse]] entries are configured");
    }

    Ok(())
}

fn validate_brightness(brightness: u8, what: &str) -> Result<()> {
    if !(MINIMUM_BRIGHTNESS..=MAXIMUM_BRIGHTNESS).contains(&brightness) {
        bail!(
            "{what} ({brightness}%) must be between {MINIMUM_BRIGHTNESS}% and {MAXIMUM_BRIGHTNESS}%"
        );
    }
    Ok(())
}

fn validate_transition(transition: &Transition, what: &str) -> Result<()> {
    if let Some(brightness) = transition.brightness() {
        validate_brightness(brightness, what)?;
    }
    match transition.target {
        TransitionTarget::Hsv { hue, saturation, .. } => {
            if hue > 359 {
                bail!("{what}: hue ({hue}) must be between 0 and 359 degrees");
            }
            if saturation > 100 {
                bail!("{what}: saturation ({saturation}%) must be between 0% and 100%");
            }
        }
        TransitionTarget::Temperature { kelvin, .. } => {
            if !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&kelvin) {
                bail!(
                    "{what}: temperature ({kelvin}K) must be between {MINIMUM_TEMP}K and {MAXIMUM_TEMP}K"
                );
            }
        }
        TransitionTarget::Sleep => {}
    }
    Ok(())
}
