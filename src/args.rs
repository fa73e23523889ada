//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help
//! and version flags while gracefully handling unknown options.

use crate::logger::Verbosity;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the choreography with these settings
    Run {
        verbosity: Verbosity,
        config_dir: Option<String>,
        /// Report the total planned duration and exit
        duration_only: bool,
        /// Alarm pulse count override (`--alarm N`)
        alarm: Option<u32>,
        /// Skip the sunrise, run only the alarm
        no_sunrise: bool,
        /// Seconds per configured minute (`--minute-duration SECS`)
        minute_duration: Option<f64>,
    },
    /// Apply one transition to a lamp or group directly
    SetCommand {
        verbosity: Verbosity,
        config_dir: Option<String>,
        target: String,
        brightness: u8,
        temperature: Option<u16>,
        /// Transition length in seconds
        duration_secs: u64,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// This function processes the arguments and determines what action
    /// should be taken, including whether to show help, version info, or run
    /// normally.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    ///
    /// # Returns
    /// ParsedArgs containing the determined action
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut verbose_count: u8 = 0;
        let mut config_dir: Option<String> = None;
        let mut duration_only = false;
        let mut alarm: Option<u32> = None;
        let mut no_sunrise = false;
        let mut minute_duration: Option<f64> = None;

        let mut idx = 0;
        while idx < args_vec.len() {
            let arg = args_vec[idx].as_str();
            match arg {
                "--help" | "-h" => {
                    return ParsedArgs {
                        action: CliAction::ShowHelp,
                    };
                }
                "--version" | "-V" => {
                    return ParsedArgs {
                        action: CliAction::ShowVersion,
                    };
                }
                "-vv" => verbose_count = verbose_count.saturating_add(2),
                "--verbose" | "-v" => verbose_count = verbose_count.saturating_add(1),
                "--duration" | "-d" => duration_only = true,
                "--no-sunrise" | "-n" => no_sunrise = true,
                "--config" | "-c" => {
                    let Some(value) = args_vec.get(idx + 1) else {
                        log_error!("{arg} requires a directory argument");
                        return Self::error();
                    };
                    config_dir = Some(value.clone());
                    idx += 1;
                }
                "--alarm" | "-a" => {
                    let Some(value) = args_vec.get(idx + 1).and_then(|v| v.parse().ok()) else {
                        log_error!("{arg} requires a numeric pulse count");
                        return Self::error();
                    };
                    alarm = Some(value);
                    idx += 1;
                }
                "--minute-duration" | "-M" => {
                    let Some(value) = args_vec.get(idx + 1).and_then(|v| v.parse().ok()) else {
                        log_error!("{arg} requires a duration in seconds");
                        return Self::error();
                    };
                    minute_duration = Some(value);
                    idx += 1;
                }
                // The subcommand owns everything after it; global flags go
                // before `set` on the command line
                "set" => {
                    return Self::parse_set(
                        Verbosity::from_count(verbose_count),
                        config_dir,
                        &args_vec[idx + 1..],
                    );
                }
                _ => {
                    log_error!("Unknown argument: {arg}");
                    return Self::error();
                }
            }
            idx += 1;
        }

        ParsedArgs {
            action: CliAction::Run {
                verbosity: Verbosity::from_count(verbose_count),
                config_dir,
                duration_only,
                alarm,
                no_sunrise,
                minute_duration,
            },
        }
    }

    /// Parse the operands of the `set` subcommand:
    /// `set <lamp|group> <brightness> [kelvin]`.
    fn parse_set(
        verbosity: Verbosity,
        config_dir: Option<String>,
        operands: &[String],
    ) -> ParsedArgs {
        let positionals: Vec<&String> = operands.iter().take_while(|a| !a.starts_with('-')).collect();
        let (target, brightness) = match (positionals.first(), positionals.get(1)) {
            (Some(target), Some(brightness)) => (target, brightness),
            _ => {
                log_error!("Usage: sunriser set <lamp|group> <brightness> [kelvin]");
                return Self::error();
            }
        };
        let Ok(brightness) = brightness.parse::<u8>() else {
            log_error!("Brightness must be a number between 0 and 100");
            return Self::error();
        };
        let temperature = match positionals.get(2) {
            None => None,
            Some(value) => match value.parse::<u16>() {
                Ok(kelvin) => Some(kelvin),
                Err(_) => {
                    log_error!("Color temperature must be a number in Kelvin");
                    return Self::error();
                }
            },
        };
        if positionals.len() > 3 {
            log_error!("Too many arguments to `set`");
            return Self::error();
        }

        // Transition length: the remaining flags after the positionals
        let mut duration_secs = crate::constants::DEFAULT_SET_DURATION_SECS;
        let rest = &operands[positionals.len()..];
        let mut idx = 0;
        while idx < rest.len() {
            match rest[idx].as_str() {
                "--transition" | "-t" => {
                    let Some(value) = rest.get(idx + 1).and_then(|v| v.parse().ok()) else {
                        log_error!("--transition requires a duration in seconds");
                        return Self::error();
                    };
                    duration_secs = value;
                    idx += 1;
                }
                other => {
                    log_error!("Unknown argument to `set`: {other}");
                    return Self::error();
                }
            }
            idx += 1;
        }

        ParsedArgs {
            action: CliAction::SetCommand {
                verbosity,
                config_dir,
                target: target.to_string(),
                brightness,
                temperature,
                duration_secs,
            },
        }
    }

    fn error() -> ParsedArgs {
        ParsedArgs {
            action: CliAction::ShowHelpDueToError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        let full: Vec<&str> = std::iter::once("sunriser").chain(args.iter().copied()).collect();
        ParsedArgs::parse(full).action
    }

    #[test]
    fn bare_invocation_runs_with_defaults() {
        assert_eq!(
            parse(&[]),
            CliAction::Run {
                verbosity: Verbosity::Warning,
                config_dir: None,
                duration_only: false,
                alarm: None,
                no_sunrise: false,
                minute_duration: None,
            }
        );
    }

    #[test]
    fn verbosity_accumulates() {
        assert!(matches!(
            parse(&["-v"]),
            CliAction::Run { verbosity: Verbosity::Info, .. }
        ));
        assert!(matches!(
            parse(&["-v", "-v"]),
            CliAction::Run { verbosity: Verbosity::Debug, .. }
        ));
        assert!(matches!(
            parse(&["-vv"]),
            CliAction::Run { verbosity: Verbosity::Debug, .. }
        ));
    }

    #[test]
    fn run_flags_are_recognized() {
        let action = parse(&["-d", "-n", "-a", "4", "-M", "0.5", "-c", "/tmp/conf"]);
        assert_eq!(
            action,
            CliAction::Run {
                verbosity: Verbosity::Warning,
                config_dir: Some("/tmp/conf".to_string()),
                duration_only: true,
                alarm: Some(4),
                no_sunrise: true,
                minute_duration: Some(0.5),
            }
        );
    }

    #[test]
    fn help_and_version_take_precedence() {
        assert_eq!(parse(&["--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["-a", "3", "--version"]), CliAction::ShowVersion);
    }

    #[test]
    fn missing_flag_argument_is_an_error() {
        assert_eq!(parse(&["--alarm"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["--alarm", "many"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["--config"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn unknown_argument_is_an_error() {
        assert_eq!(parse(&["--frobnicate"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn set_command_parses_operands() {
        assert_eq!(
            parse(&["set", "kitchen", "55", "3000", "-t", "60"]),
            CliAction::SetCommand {
                verbosity: Verbosity::Warning,
                config_dir: None,
                target: "kitchen".to_string(),
                brightness: 55,
                temperature: Some(3000),
                duration_secs: 60,
            }
        );
    }

    #[test]
    fn set_command_without_temperature() {
        assert!(matches!(
            parse(&["set", "bed", "0"]),
            CliAction::SetCommand { brightness: 0, temperature: None, .. }
        ));
    }

    #[test]
    fn set_command_requires_target_and_brightness() {
        assert_eq!(parse(&["set", "bed"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["set"]), CliAction::ShowHelpDueToError);
    }
}
