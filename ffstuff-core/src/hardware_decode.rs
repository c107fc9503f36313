//! Hardware decoding detection.
//!
//! ffmpeg lists the decode accelerators it was built with via `-hwaccels`.
//! Only CUDA is requested when present; every other method is reported in
//! the logs and otherwise ignored.
//!
//! This is only about DECODING. Encoding always uses the configured software
//! encoder.

use crate::config::ToolPath;
use crate::error::CoreResult;
use crate::external::{FfmpegArgs, InvocationRequest, ProcessLauncher};

/// Accelerator requested when ffmpeg lists it.
pub const PREFERRED_HWACCEL: &str = "cuda";

/// Decode accelerators reported by one ffmpeg build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareDecoding {
    methods: Vec<String>,
}

impl HardwareDecoding {
    /// No accelerators; decoding stays in software.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    /// Asks `tool` which accelerators it supports.
    ///
    /// A non-zero exit is treated as "none available". A launch failure is
    /// returned, since every later invocation would fail the same way.
    pub fn detect<L: ProcessLauncher>(tool: &ToolPath, launcher: &L) -> CoreResult<Self> {
        let result = launcher.launch(&detection_request(tool))?;
        if !result.success() {
            log::warn!(
                "Listing hardware accelerators failed (exit {:?}), decoding in software",
                result.code
            );
            return Ok(Self::none());
        }
        Ok(Self::from_methods(parse_hwaccels(&result.stdout)))
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn supports(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// The accelerator that will be requested, if any.
    pub fn selected(&self) -> Option<&str> {
        self.supports(PREFERRED_HWACCEL).then_some(PREFERRED_HWACCEL)
    }

    pub fn log_capabilities(&self) {
        match (self.selected(), self.methods.is_empty()) {
            (Some(method), _) => log::info!("Hardware decoding: {}", method),
            (None, true) => log::info!("Hardware decoding: None"),
            (None, false) => log::info!(
                "Hardware decoding: None (available but unused: {})",
                self.methods.join(", ")
            ),
        }
    }

    /// `-hwaccel <method>`, to be placed before the input it applies to.
    #[must_use]
    pub fn hwdecode_args(&self) -> Vec<String> {
        match self.selected() {
            Some(method) => vec!["-hwaccel".to_string(), method.to_string()],
            None => Vec::new(),
        }
    }
}

/// `ffmpeg -hide_banner -hwaccels`
pub fn detection_request(tool: &ToolPath) -> InvocationRequest {
    FfmpegArgs::new().arg("-hwaccels").build(tool)
}

/// Method names from `-hwaccels` output: every non-empty line after the
/// `Hardware acceleration methods:` heading.
pub fn parse_hwaccels(stdout: &str) -> Vec<String> {
    let mut lines = stdout.lines().map(str::trim);
    if !lines.any(|line| line.ends_with(':')) {
        return Vec::new();
    }
    lines
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
