// ============================================================================
// ffstuff-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Logger initialization for both binaries
//
// Without --log-dir the tools log to stderr through `env_logger`, with the
// level taken from -v or, failing that, RUST_LOG (default: warn). With
// --log-dir every record at debug level or above goes to a timestamped file
// through the core's log4rs setup instead, so assembled ffmpeg command lines
// are always captured there.

use crate::cli::LoggingArgs;
use ffstuff_core::file_logging::install_file_logger;
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("ffcat_run_{}.log", ffstuff::logging::get_timestamp());
/// assert!(log_filename.starts_with("ffcat_run_2"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Level requested on the command line, if any.
pub fn level_from_verbosity(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Path of the log file for one run of `tool` inside `log_dir`.
pub fn log_file_path(log_dir: &Path, tool: &str) -> PathBuf {
    log_dir.join(format!("{}_run_{}.log", tool, get_timestamp()))
}

/// Installs the global logger. Returns the log file path when one is used.
pub fn init_logging(tool: &str, args: &LoggingArgs) -> Option<PathBuf> {
    let requested = level_from_verbosity(args.verbose);

    if let Some(log_dir) = &args.log_dir {
        let log_file = log_file_path(log_dir, tool);
        let level = requested.unwrap_or(LevelFilter::Debug).max(LevelFilter::Debug);
        match install_file_logger(&log_file, level) {
            Ok(()) => {
                log::info!("{} {} started", tool, env!("CARGO_PKG_VERSION"));
                return Some(log_file);
            }
            Err(e) => {
                eprintln!(
                    "Warning: cannot log to {}: {:#}; logging to stderr instead",
                    log_file.display(),
                    e
                );
            }
        }
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = requested {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).format_target(false).init();
    None
}
