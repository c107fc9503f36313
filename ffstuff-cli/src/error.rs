// ============================================================================
// ffstuff-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Exit codes and error reporting
//
// The core returns tagged `CoreError`s; this module decides how each one is
// shown to the user and which process exit code it becomes.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - exit_code_for: CoreError -> process exit code
// - report_error: prints the message (and the tool's own stderr, if any)

use crate::terminal;
use ffstuff_core::{CoreError, CoreResult};

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_ARGUMENTS: i32 = 2;
pub const EXIT_DETECTION_FAILURE: i32 = 3;
/// Same code a shell uses for a command it cannot find.
pub const EXIT_TOOL_NOT_FOUND: i32 = 127;
/// 128 + SIGINT, used for any termination signal.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Message printed when cropdetect produced nothing usable.
pub const DETECTION_FAILURE_MESSAGE: &str = "no crop region could be determined";

pub fn exit_code_for(error: &CoreError) -> i32 {
    match error {
        CoreError::InvalidArguments(_) => EXIT_INVALID_ARGUMENTS,
        CoreError::DetectionFailure(_) => EXIT_DETECTION_FAILURE,
        CoreError::ToolNotFound { .. } => EXIT_TOOL_NOT_FOUND,
        CoreError::CommandStart { .. }
        | CoreError::ExternalToolFailure { .. }
        | CoreError::Io(_) => EXIT_FAILURE,
    }
}

/// Prints `error` to stderr and returns the exit code to use.
pub fn report_error(error: &CoreError) -> i32 {
    log::error!("{}", error);
    match error {
        CoreError::ExternalToolFailure { stderr, .. } => {
            terminal::print_tool_output(stderr);
            terminal::print_error(&error.to_string());
        }
        CoreError::DetectionFailure(detail) => {
            terminal::print_error(DETECTION_FAILURE_MESSAGE);
            terminal::print_status("detail", detail);
        }
        CoreError::ToolNotFound { .. } => {
            terminal::print_error(&error.to_string());
            terminal::print_note(&format!(
                "install ffmpeg or point {} at it",
                ffstuff_core::TOOL_PATH_ENV_VAR
            ));
        }
        _ => terminal::print_error(&error.to_string()),
    }
    exit_code_for(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&CoreError::InvalidArguments("x".into())),
            EXIT_INVALID_ARGUMENTS
        );
        assert_eq!(
            exit_code_for(&CoreError::DetectionFailure("x".into())),
            EXIT_DETECTION_FAILURE
        );
        assert_eq!(
            exit_code_for(&CoreError::ToolNotFound {
                tool: "ffmpeg".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
            EXIT_TOOL_NOT_FOUND
        );
        assert_eq!(
            exit_code_for(&CoreError::ExternalToolFailure {
                tool: "ffmpeg".into(),
                code: Some(69),
                stderr: String::new(),
            }),
            EXIT_FAILURE
        );
        assert_eq!(
            exit_code_for(&CoreError::Io(io::Error::other("disk"))),
            EXIT_FAILURE
        );
    }
}
