//! Core library for the `ffcat` and `ffautocrop` ffmpeg wrappers.
//!
//! All decoding, filtering and encoding is done by an external ffmpeg. This
//! crate resolves which binary to run, assembles its arguments, launches it
//! through a [`ProcessLauncher`] and interprets the exit status and
//! diagnostic output.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ffstuff_core::{CatCommand, CatOptions, SystemLauncher, ToolResolver};
//! use std::path::{Path, PathBuf};
//!
//! let tool = ToolResolver::from_process_env().resolve();
//! let command = CatCommand::new(tool, SystemLauncher::new(), CatOptions::default());
//! let inputs = vec![PathBuf::from("part1.mkv"), PathBuf::from("part2.mkv")];
//! command.run(&inputs, Path::new("joined.mkv")).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod hardware_decode;
pub mod media;
pub mod processing;
pub mod utils;

// Re-exports for public API
pub use config::{
    CatOptions, ConcatStrategy, CropOptions, CropSelection, DEFAULT_TOOL_COMMAND,
    TOOL_PATH_ENV_VAR, ToolPath, ToolResolver,
};
pub use error::{CoreError, CoreResult};
pub use external::{
    FakeLauncher, InvocationRequest, InvocationResult, ProcessLauncher, ProcessRegistry,
    SystemLauncher, terminate_running_tools,
};
pub use hardware_decode::HardwareDecoding;
pub use media::MediaSummary;
pub use processing::{
    CatCommand, ConcatMethod, ConcatOutcome, CropCommand, CropGeometry, CropOutcome, CropPhase,
};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
