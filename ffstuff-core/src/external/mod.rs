// ============================================================================
// ffstuff-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Invocations of the external media tool
//
// Every interaction with ffmpeg goes through an `InvocationRequest` handed to a
// `ProcessLauncher`. The commands never spawn processes themselves, which is
// what lets the tests substitute the scripted `FakeLauncher`.
//
// KEY COMPONENTS:
// - InvocationRequest / InvocationResult: one spawn-and-wait cycle
// - ProcessLauncher: trait implemented by SystemLauncher and FakeLauncher
// - FfmpegArgs: argument builder shared by both commands

use crate::config::ToolPath;
use crate::error::{CoreError, CoreResult};

use std::ffi::{OsStr, OsString};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Argument assembly for ffmpeg invocations
pub mod ffmpeg_builder;

/// The launcher trait and the real process implementation
pub mod launcher;

/// Scripted launcher used by tests
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::FfmpegArgs;
pub use launcher::{ProcessLauncher, ProcessRegistry, SystemLauncher, terminate_running_tools};
pub use mocks::FakeLauncher;

// ============================================================================
// INVOCATION TYPES
// ============================================================================

/// One subprocess launch: the tool plus its ordered arguments.
///
/// Built fresh for each phase of each command and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    tool: ToolPath,
    args: Vec<OsString>,
}

impl InvocationRequest {
    pub fn new<I, S>(tool: ToolPath, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            tool,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tool(&self) -> &ToolPath {
        &self.tool
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as (lossy) UTF-8 strings, for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// True if any argument contains `pattern`.
    pub fn mentions(&self, pattern: &str) -> bool {
        self.args
            .iter()
            .any(|arg| arg.to_string_lossy().contains(pattern))
    }

    /// Shell-like rendering of the command line for debug logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.tool.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(quote_for_log)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_for_log(arg: &OsStr) -> String {
    let text = arg.to_string_lossy();
    if !text.is_empty() && !text.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', "'\\''"))
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// A successful result carrying the given diagnostic text.
    pub fn with_stderr(stderr: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// A failed result with the given exit code and diagnostic text.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Converts a non-zero exit into [`CoreError::ExternalToolFailure`].
    pub fn into_checked(self, tool: &ToolPath) -> CoreResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(CoreError::ExternalToolFailure {
                tool: tool.to_string(),
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// Launches `request` and fails unless the tool exits successfully.
pub fn run_checked<L: ProcessLauncher + ?Sized>(
    launcher: &L,
    request: &InvocationRequest,
) -> CoreResult<InvocationResult> {
    log::debug!("Running: {}", request.command_line());
    let result = launcher.launch(request)?;
    if !result.success() {
        log::error!(
            "{} failed with exit code {:?}",
            request.tool(),
            result.code
        );
    }
    result.into_checked(request.tool())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_when_needed() {
        let request = InvocationRequest::new(
            ToolPath::default(),
            ["-i", "my movie.mkv", "it's.mp4", "plain.mp4"],
        );
        assert_eq!(
            request.command_line(),
            "ffmpeg -i 'my movie.mkv' 'it'\\''s.mp4' plain.mp4"
        );
    }

    #[test]
    fn test_into_checked() {
        let tool = ToolPath::default();
        assert!(InvocationResult::with_stderr("ok").into_checked(&tool).is_ok());

        match InvocationResult::failed(1, "Conversion failed!").into_checked(&tool) {
            Err(CoreError::ExternalToolFailure { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "Conversion failed!");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
