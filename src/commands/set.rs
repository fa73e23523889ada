//! Direct lamp control: apply one transition to a lamp or a configured group.
//!
//! This is the utility counterpart of the choreography: set brightness and
//! color temperature on a lamp or a whole room in one command. Requesting
//! brightness 0 is the distinct "turn off" action — the lamp dims gradually
//! and then powers down, rather than targeting 0% through a transition.

use anyhow::{Result, bail};
use std::time::Duration;

use crate::backend::LampFinder;
use crate::config::Settings;
use crate::constants::{MAXIMUM_BRIGHTNESS, MAXIMUM_TEMP, MINIMUM_BRIGHTNESS, MINIMUM_TEMP};
use crate::flow::{Flow, FlowFinish, Transition};

/// Apply one transition to `target` (a lamp name or a group name).
///
/// Lamps missing from the network are reported and skipped; the command
/// keeps going with the remaining group members.
pub fn run(
    settings: &Settings,
    finder: &dyn LampFinder,
    target: &str,
    brightness: u8,
    temperature: Option<u16>,
    duration: Duration,
) -> Result<()> {
    if let Some(kelvin) = temperature
        && !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&kelvin)
    {
        bail!("color temperature ({kelvin}K) must be between {MINIMUM_TEMP}K and {MAXIMUM_TEMP}K");
    }

    // A group name expands to its members; anything else is a single lamp
    let names: Vec<&str> = match settings.groups.get(target) {
        Some(members) => members.iter().map(String::as_str).collect(),
        None => vec![target],
    };

    for name in names {
        if let Err(error) = set_one(finder, name, brightness, temperature, duration) {
            log_warning!("{name}: {error:#}");
        }
    }
    Ok(())
}

fn set_one(
    finder: &dyn LampFinder,
    name: &str,
    brightness: u8,
    temperature: Option<u16>,
    duration: Duration,
) -> Result<()> {
    let Some(mut lamp) = finder.resolve(name)? else {
        log_warning!("{name}: lamp not found on the network");
        return Ok(());
    };

    if brightness == 0 {
        let props = lamp.properties()?;
        if !props.powered_on {
            log_debug!("{name}: already off");
            return Ok(());
        }
        // Dim to the floor, then let the lamp power itself down
        let kelvin = temperature.unwrap_or(props.temperature);
        log_decorated!("{name}: fading out over {:.0}s", duration.as_secs_f64());
        return lamp.apply_flow(&Flow {
            count: 1,
            finish: FlowFinish::Off,
            transitions: vec![Transition::temperature(kelvin, MINIMUM_BRIGHTNESS, duration)],
        });
    }

    let brightness = brightness.clamp(MINIMUM_BRIGHTNESS, MAXIMUM_BRIGHTNESS);
    let kelvin = match temperature {
        Some(kelvin) => kelvin,
        None => lamp.properties()?.temperature,
    };
    log_decorated!("{name}: {kelvin}K at {brightness}% over {:.0}s", duration.as_secs_f64());
    lamp.apply_transition(&Transition::temperature(kelvin, brightness, duration))
}
