//! Configuration for locating the external tool and tuning the commands.
//!
//! The environment is never read ad hoc: [`ToolResolver`] is built from an
//! explicit set of variables (or from the process environment once, at
//! startup) and then resolves the [`ToolPath`] used by every invocation.

mod options;

use std::ffi::{OsStr, OsString};
use std::fmt;

pub use options::{
    CatOptions, ConcatStrategy, CropOptions, CropSelection, DEFAULT_CHUNK_DURATION_SECS,
    DEFAULT_MIN_TRIM_PX, DEFAULT_SAMPLE_CHUNKS, DEFAULT_VIDEO_CODEC,
};

// Default constants

/// Environment variable overriding the command used to invoke ffmpeg.
pub const TOOL_PATH_ENV_VAR: &str = "FFSTUFF_FFMPEG_PATH";

/// Command name used when no override is present, resolved through the
/// operating system's executable search path at spawn time.
pub const DEFAULT_TOOL_COMMAND: &str = "ffmpeg";

/// How to invoke the external media tool: a bare command name or a path.
///
/// Always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPath(OsString);

impl ToolPath {
    /// Returns `None` for an empty value.
    pub fn new(value: impl Into<OsString>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() { None } else { Some(Self(value)) }
    }

    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }
}

impl Default for ToolPath {
    fn default() -> Self {
        Self(OsString::from(DEFAULT_TOOL_COMMAND))
    }
}

impl fmt::Display for ToolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

/// Resolves the [`ToolPath`] from an injected environment.
///
/// # Examples
///
/// ```rust
/// use ffstuff_core::config::{ToolResolver, TOOL_PATH_ENV_VAR};
///
/// let resolver = ToolResolver::from_vars([(TOOL_PATH_ENV_VAR, "/opt/ffmpeg/bin/ffmpeg")]);
/// assert_eq!(resolver.resolve().to_string(), "/opt/ffmpeg/bin/ffmpeg");
///
/// let resolver = ToolResolver::from_vars(Vec::<(String, String)>::new());
/// assert_eq!(resolver.resolve().to_string(), "ffmpeg");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolResolver {
    override_value: Option<OsString>,
}

impl ToolResolver {
    /// Captures the override from the real process environment.
    pub fn from_process_env() -> Self {
        Self {
            override_value: std::env::var_os(TOOL_PATH_ENV_VAR),
        }
    }

    /// Captures the override from an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: Into<OsString>,
    {
        let override_value = vars
            .into_iter()
            .filter(|(key, _)| key.as_ref() == OsStr::new(TOOL_PATH_ENV_VAR))
            .map(|(_, value)| value.into())
            .last();
        Self { override_value }
    }

    /// The override when present and non-empty, otherwise [`DEFAULT_TOOL_COMMAND`].
    pub fn resolve(&self) -> ToolPath {
        match self.override_value.clone().and_then(ToolPath::new) {
            Some(path) => {
                log::debug!("Using {} override: {}", TOOL_PATH_ENV_VAR, path);
                path
            }
            None => ToolPath::default(),
        }
    }
}
