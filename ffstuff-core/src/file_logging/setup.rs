// ffstuff-core/src/file_logging/setup.rs
//
// A run log is one plain-text file per invocation. Records carry a local
// timestamp, level and module so a failed ffmpeg command line can be traced
// back to the step that assembled it.

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

/// Line layout of the run log.
const RUN_LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {M} | {m}{n}";

const APPENDER_NAME: &str = "run_log";

/// Makes `log_file` the process-wide log sink for records at `level` or above.
///
/// Missing parent directories are created. This claims the global logger, so
/// a second call in the same process fails.
pub fn install_file_logger(log_file: &Path, level: LevelFilter) -> Result<()> {
    if let Some(dir) = log_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }

    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(RUN_LOG_PATTERN)))
        .build(log_file)
        .with_context(|| format!("opening {}", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build(APPENDER_NAME, Box::new(appender)))
        .build(Root::builder().appender(APPENDER_NAME).build(level))
        .context("building log configuration")?;

    log4rs::init_config(config).context("another logger is already installed")?;
    Ok(())
}
