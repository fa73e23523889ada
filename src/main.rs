//! Main application entry point and high-level flow coordination.
//!
//! This module dispatches command-line actions and coordinates the modules of
//! the library crate:
//!
//! - `args`: Command-line argument parsing and help/version display
//! - `config`: Configuration loading, resolution, and validation
//! - `backend`: Lamp discovery and the Yeelight control protocol
//! - `core`: The orchestrator fanning out per-lamp sequencers
//! - `commands`: One-shot commands (`set`)
//! - `signals`: Signal handling for cooperative shutdown
//!
//! The flow of a normal run:
//! 1. Argument parsing and early exit for help/version
//! 2. Configuration loading, resolution against CLI overrides, validation
//! 3. Dry-run exit if only the planned duration was requested
//! 4. Lamp discovery (one snapshot for the whole run)
//! 5. `Sunriser::run`: primary fan-out, join barrier, optional alarm stage

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use sunriser::{
    log_block_start, log_decorated, log_end, log_error, log_indented, log_pipe, log_version,
};

use sunriser::Sunriser;
use sunriser::args::{CliAction, ParsedArgs};
use sunriser::backend::yeelight::discovery::YeelightFinder;
use sunriser::commands;
use sunriser::config::{Config, Overrides, validation::validate_settings};
use sunriser::logger::{Log, Verbosity};
use sunriser::signals::setup_signal_handler;

fn main() {
    let parsed = ParsedArgs::parse(std::env::args());

    let result = match parsed.action {
        CliAction::ShowHelp => {
            commands::help::display_help();
            Ok(())
        }
        CliAction::ShowVersion => {
            commands::help::display_version();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            commands::help::display_help();
            std::process::exit(1);
        }
        CliAction::Run {
            verbosity,
            config_dir,
            duration_only,
            alarm,
            no_sunrise,
            minute_duration,
        } => run_choreography(
            verbosity,
            config_dir.as_deref(),
            duration_only,
            alarm,
            no_sunrise,
            minute_duration,
        ),
        CliAction::SetCommand {
            verbosity,
            config_dir,
            target,
            brightness,
            temperature,
            duration_secs,
        } => run_set(
            verbosity,
            config_dir.as_deref(),
            &target,
            brightness,
            temperature,
            duration_secs,
        ),
    };

    if let Err(error) = result {
        log_pipe!();
        log_error!("{error:#}");
        log_end!();
        std::process::exit(1);
    }
}

fn run_choreography(
    verbosity: Verbosity,
    config_dir: Option<&str>,
    duration_only: bool,
    alarm: Option<u32>,
    no_sunrise: bool,
    minute_duration: Option<f64>,
) -> Result<()> {
    Log::set_verbosity(verbosity);
    log_version!();

    if minute_duration.is_some() {
        // Compressed time base: timestamp log lines so the accelerated
        // schedule can be followed
        Log::set_timestamps(true);
    }

    let config = Config::load(config_dir.map(Path::new))?;
    let settings = config.resolve(&Overrides {
        minute_duration,
        alarm_repeat: alarm,
    })?;
    validate_settings(&settings)?;

    log_block_start!("Loaded configuration");
    log_indented!("{} lamp(s) scheduled", settings.schedule.len());
    log_indented!(
        "red phase: {:.0}s at {}%",
        settings.red_duration.as_secs_f64(),
        settings.red_brightness
    );
    log_indented!("{} phase(s) follow the red phase", settings.phases.len());
    if settings.alarm.repeat > 0 {
        log_indented!("alarm: {} pulse(s)", settings.alarm.repeat);
    }

    let running = setup_signal_handler()?;
    let mut sunriser = Sunriser::new(&settings, running);
    if no_sunrise {
        sunriser = sunriser.without_sunrise();
    }

    if duration_only {
        log_block_start!(
            "Total duration of the sunrise: {:.1} min",
            sunriser.planned_duration().as_secs_f64() / 60.0
        );
        log_end!();
        return Ok(());
    }

    log_block_start!("Discovering lamps on the network");
    let finder = YeelightFinder::discover()?;
    log_decorated!("{} lamp(s) found", finder.lamps().len());

    sunriser.run(&finder)?;
    log_end!();
    Ok(())
}

fn run_set(
    verbosity: Verbosity,
    config_dir: Option<&str>,
    target: &str,
    brightness: u8,
    temperature: Option<u16>,
    duration_secs: u64,
) -> Result<()> {
    Log::set_verbosity(verbosity);
    log_version!();

    let config = Config::load(config_dir.map(Path::new))?;
    // The set command needs only groups and limits; the schedule gate does
    // not apply here
    let settings = config.resolve(&Overrides::default())?;

    log_block_start!("Discovering lamps on the network");
    let finder = YeelightFinder::discover()?;
    log_decorated!("{} lamp(s) found", finder.lamps().len());

    commands::set::run(
        &settings,
        &finder,
        target,
        brightness,
        temperature,
        Duration::from_secs(duration_secs),
    )?;
    log_end!();
    Ok(())
}
