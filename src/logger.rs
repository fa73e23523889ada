//! Structured logging system with visual formatting.
//!
//! This module provides a logging system designed for sunriser's visual output
//! style. It includes verbosity-gated log levels and special formatting macros
//! for creating structured output with Unicode box drawing characters.
//!
//! The logger supports runtime enable/disable functionality for quiet operation
//! during automated processes or testing, and an optional timestamp prefix that
//! is switched on when a run uses a compressed time base (so log lines can be
//! correlated with the accelerated schedule).

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// Use atomics instead of thread_local: sequencer threads log concurrently
static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Verbosity level selected on the command line (`-v`, `-vv`).
///
/// The structural macros (`log_block_start!`, `log_decorated!`, ...) always
/// print; `log_info!` requires `Info` and `log_debug!` requires `Debug`.
/// Warnings and errors are never gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Warning = 0,
    Info = 1,
    Debug = 2,
}

impl Verbosity {
    /// Map a `-v` occurrence count to a verbosity level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Warning,
            1 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    }
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: initiates a new conceptual block of log output
///   (major events: "Commencing sunrise", "Discovering lamps"). Prepends an
///   empty pipe `┃` for spacing, then prints `┣ message`.
/// - **`log_decorated!`**: a message within an existing block, printed as
///   `┣ message`.
/// - **`log_indented!`**: nested detail lines, printed as `┃   message`.
/// - **`log_pipe!`**: a single empty `┃` line for vertical spacing, typically
///   before a warning or error that interrupts a block.
/// - **`log_version!`** / **`log_end!`**: the startup header and the final
///   `╹` terminator.
/// - **`log_info!`, `log_debug!`, `log_warning!`, `log_error!`**: semantic
///   `[LEVEL]`-prefixed messages; info/debug are gated by the verbosity level.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    ///
    /// This is useful for quiet operation during automated processes
    /// or testing where log output would interfere with results.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Set the verbosity level for `log_info!` / `log_debug!` gating.
    pub fn set_verbosity(verbosity: Verbosity) {
        VERBOSITY.store(verbosity as u8, Ordering::SeqCst);
    }

    /// Current verbosity level.
    pub fn verbosity() -> Verbosity {
        match VERBOSITY.load(Ordering::SeqCst) {
            0 => Verbosity::Warning,
            1 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    }

    /// Enable the timestamp prefix on every log line.
    ///
    /// Switched on for compressed-time runs where wall-clock correlation
    /// matters; off by default to keep normal output clean.
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Get the timestamp prefix for the current log line.
    ///
    /// Returns an empty string unless timestamps were enabled.
    /// Public for macro access.
    pub fn get_timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

// # Logging Macros

/// Log a decorated message, typically as part of an existing block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣ {message}\n"));
        }
    }};
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┃   {message}\n"));
        }
    }};
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {message}\n"));
        }
    }};
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("{prefix}┏ sunriser v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

/// Log a warning message with pipe prefix and yellow-colored level tag.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!(
                "{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"
            ));
        }
    }};
}

/// Log an error message with pipe prefix and red-colored level tag.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!(
                "{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"
            ));
        }
    }};
}

/// Log an informational message; requires verbosity `Info` or higher.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::{Log, Verbosity};
        if Log::is_enabled() && Log::verbosity() >= Verbosity::Info {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!("{prefix}┣[INFO] {message}\n"));
        }
    }};
}

/// Log a debug message; requires verbosity `Debug`.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::logger::{Log, Verbosity};
        if Log::is_enabled() && Log::verbosity() >= Verbosity::Debug {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&format!(
                "{prefix}┣[\x1b[36mDEBUG\x1b[0m] {message}\n"
            ));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_count_saturates() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Warning);
        assert_eq!(Verbosity::from_count(1), Verbosity::Info);
        assert_eq!(Verbosity::from_count(2), Verbosity::Debug);
        assert_eq!(Verbosity::from_count(7), Verbosity::Debug);
    }

    #[test]
    fn timestamp_prefix_is_empty_by_default() {
        assert_eq!(Log::get_timestamp_prefix(), "");
    }
}
