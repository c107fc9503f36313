//! Optional log file output for the command-line tools.

pub mod setup;

pub use setup::install_file_logger;
