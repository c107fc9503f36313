// ============================================================================
// ffstuff-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the ffstuff core library
//
// Every failure of a command invocation is terminal and surfaces to the caller
// as one tagged `CoreError`. The CLI maps each tag to an exit code.

use std::io;
use thiserror::Error;

/// Errors produced while resolving, launching or interpreting the external tool.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Caller-supplied inputs violate a precondition. Raised before any spawn.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The resolved tool could not be launched (missing, not executable, ...).
    #[error("External tool '{tool}' could not be launched: {source}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The launch failed for a reason unrelated to locating the tool.
    #[error("Failed to start '{tool}': {source}")]
    CommandStart {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully. `stderr` is the captured text, verbatim.
    #[error("'{tool}' exited with {}", describe_code(.code))]
    ExternalToolFailure {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The crop probe produced no usable crop suggestions.
    #[error("No crop region could be determined: {0}")]
    DetectionFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for ffstuff core operations.
pub type CoreResult<T> = Result<T, CoreError>;

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Builds the error for a failed spawn, separating "cannot find/execute" from other failures.
pub(crate) fn launch_error(tool: &str, source: io::Error) -> CoreError {
    match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => CoreError::ToolNotFound {
            tool: tool.to_string(),
            source,
        },
        _ => CoreError::CommandStart {
            tool: tool.to_string(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_classification() {
        let err = launch_error("ffmpeg", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, CoreError::ToolNotFound { .. }));

        let err = launch_error("ffmpeg", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, CoreError::ToolNotFound { .. }));

        let err = launch_error("ffmpeg", io::Error::from(io::ErrorKind::WouldBlock));
        assert!(matches!(err, CoreError::CommandStart { .. }));
    }

    #[test]
    fn test_external_failure_message() {
        let err = CoreError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            code: Some(1),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "'ffmpeg' exited with status 1");

        let err = CoreError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
