// ============================================================================
// ffstuff-core/src/processing/concat.rs
// ============================================================================
//
// CONCATENATION: Joining inputs into one output with ffmpeg
//
// The stream-copy path feeds ffmpeg's concat demuxer an ffconcat script passed
// inline through the `data:` protocol, so every input appears in the argument
// list in caller order and no list file is left on disk. If ffmpeg reports
// that the streams cannot be copied together, the inputs are re-encoded
// through the `concat` filter instead. Audio is carried through the filter
// only when every input's header lists an audio stream.

use crate::config::{CatOptions, ConcatStrategy, ToolPath};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegArgs, InvocationRequest, InvocationResult, ProcessLauncher, run_checked};
use crate::media::{parse_media_summary, summary_request};
use crate::utils::{absolute_normalized, paths_collide};

use std::path::{Path, PathBuf};

/// Diagnostic fragments meaning the inputs cannot be stream-copied together.
const COPY_INCOMPATIBILITY_MARKERS: &[&str] = &[
    "incompatible with output codec",
    "Could not write header",
    "Error initializing output stream",
    "Could not find tag for codec",
    "codec not currently supported in container",
];

/// Which strategy produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatMethod {
    StreamCopy,
    Reencode,
}

/// Result of a successful concatenation.
#[derive(Debug, Clone)]
pub struct ConcatOutcome {
    pub method: ConcatMethod,
    pub result: InvocationResult,
}

/// Concatenates inputs, in order, into one output file.
#[derive(Debug)]
pub struct CatCommand<L: ProcessLauncher> {
    tool: ToolPath,
    launcher: L,
    options: CatOptions,
}

impl<L: ProcessLauncher> CatCommand<L> {
    pub fn new(tool: ToolPath, launcher: L, options: CatOptions) -> Self {
        Self {
            tool,
            launcher,
            options,
        }
    }

    /// Checks preconditions, then runs the configured strategy.
    ///
    /// Nothing is spawned if the inputs are empty or the output collides with an input.
    pub fn run(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<ConcatOutcome> {
        validate_paths(inputs, output)?;
        let output_preexisting = output.exists();

        log::info!(
            "Concatenating {} input(s) into {}",
            inputs.len(),
            output.display()
        );

        match self.options.strategy {
            ConcatStrategy::Reencode => self.reencode(inputs, output, self.options.overwrite),
            ConcatStrategy::CopyOnly => self.stream_copy(inputs, output),
            ConcatStrategy::CopyThenReencode => match self.stream_copy(inputs, output) {
                Err(CoreError::ExternalToolFailure { stderr, .. })
                    if is_copy_incompatibility(&stderr) =>
                {
                    log::warn!("Stream copy is not possible for these inputs, re-encoding instead");
                    // Only clobber the output unconditionally if the failed copy created it.
                    let overwrite = if output_preexisting {
                        self.options.overwrite
                    } else {
                        Some(true)
                    };
                    self.reencode(inputs, output, overwrite)
                }
                other => other,
            },
        }
    }

    fn stream_copy(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<ConcatOutcome> {
        let request = self.copy_request(inputs, output)?;
        let result = run_checked(&self.launcher, &request)?;
        Ok(ConcatOutcome {
            method: ConcatMethod::StreamCopy,
            result,
        })
    }

    fn reencode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        overwrite: Option<bool>,
    ) -> CoreResult<ConcatOutcome> {
        let audio = self.all_inputs_have_audio(inputs)?;
        if !audio {
            log::warn!("Not every input has an audio stream, the output will be video only");
        }
        let request = self.reencode_request(inputs, output, overwrite, audio);
        let result = run_checked(&self.launcher, &request)?;
        Ok(ConcatOutcome {
            method: ConcatMethod::Reencode,
            result,
        })
    }

    /// Reads each input's header; the `concat` filter needs the same streams from every segment.
    fn all_inputs_have_audio(&self, inputs: &[PathBuf]) -> CoreResult<bool> {
        for input in inputs {
            let result = run_checked(&self.launcher, &summary_request(&self.tool, input))?;
            if !parse_media_summary(&result.stderr).has_audio {
                log::debug!("{} has no audio stream", input.display());
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The stream-copy invocation: concat demuxer over an inline ffconcat script.
    pub fn copy_request(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<InvocationRequest> {
        let script = ffconcat_script(inputs)?;
        Ok(FfmpegArgs::new()
            .overwrite(self.options.overwrite)
            .args(["-f", "concat", "-safe", "0"])
            // Entries are opened through file:, nested inside the data: script.
            .args(["-protocol_whitelist", "file,data"])
            .arg("-i")
            .arg(format!("data:text/plain,{script}"))
            .args(["-map", "0", "-c", "copy"])
            .format(self.options.format.as_deref())
            .output(output)
            .build(&self.tool))
    }

    /// The re-encoding invocation: one `-i` per input joined by the `concat` filter.
    ///
    /// With `audio` off only the first video stream of each input is joined.
    pub fn reencode_request(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        overwrite: Option<bool>,
        audio: bool,
    ) -> InvocationRequest {
        let mut args = FfmpegArgs::new().overwrite(overwrite);
        for input in inputs {
            args = args.input(input);
        }
        args = args
            .arg("-filter_complex")
            .arg(concat_filter(inputs.len(), audio))
            .args(["-map", "[v]"]);
        if audio {
            args = args.args(["-map", "[a]"]);
        }
        args.format(self.options.format.as_deref())
            .output(output)
            .build(&self.tool)
    }
}

/// Rejects an empty input list and an output that names one of the inputs.
pub fn validate_paths(inputs: &[PathBuf], output: &Path) -> CoreResult<()> {
    if inputs.is_empty() {
        return Err(CoreError::InvalidArguments(
            "at least one input file is required".to_string(),
        ));
    }
    if output.as_os_str().is_empty() {
        return Err(CoreError::InvalidArguments(
            "no output file path specified".to_string(),
        ));
    }
    if let Some(input) = inputs.iter().find(|input| paths_collide(input, output)) {
        return Err(CoreError::InvalidArguments(format!(
            "output {} is also an input ({}); refusing to overwrite a file being read",
            output.display(),
            input.display()
        )));
    }
    Ok(())
}

/// Quotes a path for an ffconcat `file` directive.
///
/// Apostrophes are closed, escaped and reopened (`'\''`); double quotes need no escaping.
pub fn escape_ffconcat_path(path: &str) -> String {
    path.replace('\'', "'\\''")
}

/// Builds the ffconcat script listing `inputs` by absolute `file:` URL.
///
/// Absolute URLs keep ffmpeg from resolving entries relative to the script's own location.
pub fn ffconcat_script(inputs: &[PathBuf]) -> CoreResult<String> {
    let mut script = String::from("ffconcat version 1.0\n");
    for input in inputs {
        let absolute = absolute_normalized(input);
        let text = absolute.to_str().ok_or_else(|| {
            CoreError::InvalidArguments(format!(
                "input path is not valid UTF-8: {}",
                input.display()
            ))
        })?;
        if text.contains(['\n', '\r']) {
            return Err(CoreError::InvalidArguments(format!(
                "input path contains a line break: {}",
                input.display()
            )));
        }
        script.push_str(&format!("file 'file:{}'\n", escape_ffconcat_path(text)));
    }
    Ok(script)
}

/// `concat` filter graph for `n` inputs, each contributing one video and
/// optionally one audio stream.
fn concat_filter(n: usize, audio: bool) -> String {
    let pads: String = (0..n)
        .map(|i| {
            if audio {
                format!("[{i}:v:0][{i}:a:0]")
            } else {
                format!("[{i}:v:0]")
            }
        })
        .collect();
    if audio {
        format!("{pads}concat=n={n}:v=1:a=1[v][a]")
    } else {
        format!("{pads}concat=n={n}:v=1:a=0[v]")
    }
}

fn is_copy_incompatibility(stderr: &str) -> bool {
    COPY_INCOMPATIBILITY_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_ffconcat_path() {
        assert_eq!(escape_ffconcat_path("plain.mp4"), "plain.mp4");
        assert_eq!(escape_ffconcat_path("it's.mp4"), "it'\\''s.mp4");
        assert_eq!(escape_ffconcat_path("say \"hi\".mp4"), "say \"hi\".mp4");
    }

    #[test]
    fn test_script_lists_inputs_in_order() {
        let inputs = vec![PathBuf::from("/media/b.mp4"), PathBuf::from("/media/a.mp4")];
        let script = ffconcat_script(&inputs).unwrap();
        assert_eq!(
            script,
            "ffconcat version 1.0\nfile 'file:/media/b.mp4'\nfile 'file:/media/a.mp4'\n"
        );
    }

    #[test]
    fn test_script_rejects_line_breaks() {
        let inputs = vec![PathBuf::from("/media/bad\nname.mp4")];
        assert!(matches!(
            ffconcat_script(&inputs),
            Err(CoreError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_copy_request_shape() {
        let command = CatCommand::new(
            ToolPath::default(),
            crate::external::FakeLauncher::new(),
            CatOptions::default().with_overwrite(Some(true)),
        );
        let inputs = vec![PathBuf::from("/media/a.mp4"), PathBuf::from("/media/b.mp4")];
        let request = command.copy_request(&inputs, Path::new("/media/out.mp4")).unwrap();
        assert_eq!(
            request.args_lossy(),
            [
                "-hide_banner",
                "-y",
                "-f",
                "concat",
                "-safe",
                "0",
                "-protocol_whitelist",
                "file,data",
                "-i",
                "data:text/plain,ffconcat version 1.0\nfile 'file:/media/a.mp4'\nfile 'file:/media/b.mp4'\n",
                "-map",
                "0",
                "-c",
                "copy",
                "/media/out.mp4",
            ]
        );
    }

    #[test]
    fn test_concat_filter_graph() {
        assert_eq!(
            concat_filter(2, true),
            "[0:v:0][0:a:0][1:v:0][1:a:0]concat=n=2:v=1:a=1[v][a]"
        );
        assert_eq!(concat_filter(3, false), "[0:v:0][1:v:0][2:v:0]concat=n=3:v=1:a=0[v]");
    }

    #[test]
    fn test_validate_paths() {
        let a = PathBuf::from("a.mp4");
        let b = PathBuf::from("b.mp4");
        assert!(validate_paths(&[a.clone(), b.clone()], Path::new("out.mp4")).is_ok());
        assert!(matches!(
            validate_paths(&[], Path::new("out.mp4")),
            Err(CoreError::InvalidArguments(_))
        ));
        assert!(matches!(
            validate_paths(&[a, b], Path::new("./b.mp4")),
            Err(CoreError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_copy_incompatibility_detection() {
        assert!(is_copy_incompatibility(
            "[mp4 @ 0x1] Could not find tag for codec pcm_s16le in stream #1, codec not currently supported in container\nCould not write header for output file #0"
        ));
        assert!(!is_copy_incompatibility("b.mp4: No such file or directory"));
        // A timestamp warning alone does not stop a copy from completing.
        assert!(!is_copy_incompatibility(
            "[mp4 @ 0x1] Application provided invalid, non monotonically increasing dts to muxer in stream 1: 1024 >= 1024"
        ));
    }
}
