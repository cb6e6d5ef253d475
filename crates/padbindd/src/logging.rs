use fern::Dispatch;
use log::SetLoggerError;

/// Crates whose messages pass the configured level.
const TARGETS: [&str; 4] = ["padbindd", "padbind_engine", "padbind_profile", "padbind_gamepad"];

/// Setup the logger.
pub(crate) fn setup(verbose: bool, no_color: bool) -> Result<(), SetLoggerError> {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // Hide enigo and notify logs
    let mut dispatch = Dispatch::new().level(log::LevelFilter::Error);
    for target in TARGETS {
        dispatch = dispatch.level_for(target, log_level);
    }
    dispatch.chain(std::io::stdout()).apply()?;

    if no_color {
        colored::control::set_override(false);
    }
    Ok(())
}
