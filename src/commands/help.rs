//! Help and version display.

/// Display the full help text.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: sunriser [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-v, --verbose              Increase output verbosity (-vv for debug)");
    log_indented!("-d, --duration             Print the total sunrise duration and exit");
    log_indented!("-a, --alarm <N>            Pulse the lamps N times after the sunrise");
    log_indented!("-n, --no-sunrise           Skip the sunrise and run only the alarm");
    log_indented!("-M, --minute-duration <S>  Seconds per configured minute (for testing)");
    log_indented!("-c, --config <DIR>         Use an alternate configuration directory");
    log_indented!("-h, --help                 Show this help");
    log_indented!("-V, --version              Show the version");
    log_block_start!("Commands:");
    log_indented!("set <lamp|group> <brightness> [kelvin]   Apply one transition directly");
    log_indented!("    -t, --transition <SECS>              Transition length (default 1)");
    log_end!();
}

/// Display the version line.
pub fn display_version() {
    log_version!();
    log_end!();
}
