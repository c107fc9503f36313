//! ffmpeg argument builder
//!
//! Collects arguments in order and turns them into an [`InvocationRequest`]
//! for a given [`ToolPath`]. Every invocation starts with `-hide_banner` so
//! the diagnostic stream only carries what the commands parse.

use super::InvocationRequest;
use crate::config::ToolPath;

use std::ffi::OsString;
use std::path::Path;

/// Builder for ffmpeg argument lists
#[derive(Debug, Clone)]
pub struct FfmpegArgs {
    args: Vec<OsString>,
}

impl Default for FfmpegArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegArgs {
    /// Starts an argument list with `-hide_banner`
    #[must_use]
    pub fn new() -> Self {
        Self {
            args: vec![OsString::from("-hide_banner")],
        }
    }

    /// Adds `-y` / `-n` for an explicit overwrite policy
    #[must_use]
    pub fn overwrite(self, overwrite: Option<bool>) -> Self {
        match overwrite {
            Some(true) => self.arg("-y"),
            Some(false) => self.arg("-n"),
            None => self,
        }
    }

    /// Makes decode errors fatal: `-xerror -err_detect explode`.
    ///
    /// Must come before the input so `-err_detect` applies to its decoders.
    #[must_use]
    pub fn strict_errors(self) -> Self {
        self.args(["-xerror", "-err_detect", "explode"])
    }

    /// Adds `-hwaccel <method>` when a method is given. Goes before `-i`.
    #[must_use]
    pub fn hwaccel(self, method: Option<&str>) -> Self {
        match method {
            Some(method) => self.arg("-hwaccel").arg(method),
            None => self,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds `-i <path>`
    #[must_use]
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().as_os_str().to_os_string();
        self.arg("-i").arg(path)
    }

    /// Adds `-f <format>` when a format is given
    #[must_use]
    pub fn format(self, format: Option<&str>) -> Self {
        match format {
            Some(format) => self.arg("-f").arg(format),
            None => self,
        }
    }

    /// Discards the output (`-f null -`), used for analysis-only runs
    #[must_use]
    pub fn null_output(self) -> Self {
        self.args(["-f", "null", "-"])
    }

    /// Appends the output path as the final argument
    #[must_use]
    pub fn output(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().as_os_str().to_os_string();
        self.arg(path)
    }

    #[must_use]
    pub fn build(self, tool: &ToolPath) -> InvocationRequest {
        InvocationRequest::new(tool.clone(), self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_order() {
        let request = FfmpegArgs::new()
            .overwrite(Some(true))
            .input("in.mkv")
            .args(["-c", "copy"])
            .format(Some("matroska"))
            .output("out.mkv")
            .build(&ToolPath::default());

        assert_eq!(
            request.args_lossy(),
            ["-hide_banner", "-y", "-i", "in.mkv", "-c", "copy", "-f", "matroska", "out.mkv"]
        );
    }

    #[test]
    fn test_overwrite_policies() {
        let no = FfmpegArgs::new().overwrite(Some(false)).build(&ToolPath::default());
        assert_eq!(no.args_lossy(), ["-hide_banner", "-n"]);

        let unset = FfmpegArgs::new().overwrite(None).null_output().build(&ToolPath::default());
        assert_eq!(unset.args_lossy(), ["-hide_banner", "-f", "null", "-"]);
    }

    #[test]
    fn test_decode_options_precede_input() {
        let request = FfmpegArgs::new()
            .strict_errors()
            .hwaccel(Some("cuda"))
            .input("in.mkv")
            .null_output()
            .build(&ToolPath::default());
        assert_eq!(
            request.args_lossy(),
            [
                "-hide_banner", "-xerror", "-err_detect", "explode", "-hwaccel", "cuda", "-i",
                "in.mkv", "-f", "null", "-"
            ]
        );

        let software = FfmpegArgs::new().hwaccel(None).build(&ToolPath::default());
        assert_eq!(software.args_lossy(), ["-hide_banner"]);
    }
}
