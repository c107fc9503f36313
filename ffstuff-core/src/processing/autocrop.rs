//! Automatic black bar removal.
//!
//! `CropCommand` runs in phases: it probes sampled windows of the input with
//! ffmpeg's `cropdetect` filter, parses the suggestions from the diagnostic
//! text, and re-encodes the input through the selected `crop` filter.
//!
//! ```text
//! Idle -> Probing -> Parsing -> Applying -> Done
//!            \          \          \
//!             +----------+----------+--> Failed
//! ```
//!
//! Applying never starts before the geometry is known, and every external
//! invocation finishes before the next one is launched.
//!
//! The cropdetect passes and the final encode stop on the first decode error
//! and use CUDA decoding when ffmpeg offers it. Accelerator detection runs at
//! most once per command.

use crate::config::{CropOptions, ToolPath};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegArgs, InvocationRequest, InvocationResult, ProcessLauncher, run_checked};
use crate::hardware_decode::HardwareDecoding;
use crate::media::{MediaSummary, parse_media_summary, summary_request};
use crate::processing::concat::validate_paths;
use crate::processing::crop_detection::{CropGeometry, CropTally, crop_suggestions};
use crate::utils::format_duration;

use std::path::Path;

/// Where a [`CropCommand`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPhase {
    Idle,
    Probing,
    Parsing,
    Applying,
    Done,
    Failed,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub enum CropOutcome {
    /// The output was written with `geometry` applied.
    Cropped {
        geometry: CropGeometry,
        result: InvocationResult,
    },
    /// The detected crop was too small to be worth a re-encode; no output was written.
    Skipped {
        geometry: CropGeometry,
        source: (u32, u32),
    },
}

/// One sampled time range of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeWindow {
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// Detects and removes letterbox/pillarbox bars from one input.
#[derive(Debug)]
pub struct CropCommand<L: ProcessLauncher> {
    tool: ToolPath,
    launcher: L,
    options: CropOptions,
    phase: CropPhase,
    hardware: Option<HardwareDecoding>,
}

impl<L: ProcessLauncher> CropCommand<L> {
    pub fn new(tool: ToolPath, launcher: L, options: CropOptions) -> Self {
        Self {
            tool,
            launcher,
            options,
            phase: CropPhase::Idle,
            hardware: None,
        }
    }

    pub fn phase(&self) -> CropPhase {
        self.phase
    }

    /// Uses `hardware` instead of asking ffmpeg.
    #[must_use]
    pub fn with_hardware(mut self, hardware: HardwareDecoding) -> Self {
        self.hardware = Some(hardware);
        self
    }

    /// Accelerator passed with `-hwaccel`, once known.
    pub fn hwaccel(&self) -> Option<&str> {
        if !self.options.hwaccel {
            return None;
        }
        self.hardware.as_ref().and_then(HardwareDecoding::selected)
    }

    /// Probes `input`, selects a geometry and writes the cropped `output`.
    ///
    /// Argument problems are reported before anything is spawned.
    pub fn run(&mut self, input: &Path, output: &Path) -> CoreResult<CropOutcome> {
        self.phase = CropPhase::Idle;
        self.options.validate()?;
        validate_paths(&[input.to_path_buf()], output)?;

        let outcome = self.execute(input, output);
        if outcome.is_err()
            && matches!(
                self.phase,
                CropPhase::Probing | CropPhase::Parsing | CropPhase::Applying
            )
        {
            self.enter(CropPhase::Failed);
        }
        outcome
    }

    fn execute(&mut self, input: &Path, output: &Path) -> CoreResult<CropOutcome> {
        self.enter(CropPhase::Probing);
        self.detect_hardware()?;
        let (mut summary, diagnostics) = self.probe(input)?;

        self.enter(CropPhase::Parsing);
        let tally: CropTally = diagnostics
            .iter()
            .flat_map(|text| crop_suggestions(text))
            .collect();
        let geometry = tally.select(self.options.selection).ok_or_else(|| {
            CoreError::DetectionFailure(format!(
                "cropdetect reported no crop suggestions for {}",
                input.display()
            ))
        })?;
        log::info!(
            "Selected {} ({} of {} suggestions)",
            geometry,
            tally.count_of(&geometry),
            tally.total()
        );

        if summary.dimensions().is_none() {
            if let Some(text) = diagnostics.first() {
                summary = parse_media_summary(text);
            }
        }
        if let Some(source) = summary.dimensions() {
            if trims_too_little(&geometry, source, self.options.min_trim_px) {
                log::info!(
                    "Not cropping: {} is within {}px of the {}x{} source",
                    geometry,
                    self.options.min_trim_px,
                    source.0,
                    source.1
                );
                self.enter(CropPhase::Done);
                return Ok(CropOutcome::Skipped { geometry, source });
            }
        }

        self.enter(CropPhase::Applying);
        let request = self.apply_request(input, output, &geometry);
        let result = run_checked(&self.launcher, &request)?;

        self.enter(CropPhase::Done);
        Ok(CropOutcome::Cropped { geometry, result })
    }

    fn detect_hardware(&mut self) -> CoreResult<()> {
        if !self.options.hwaccel || self.hardware.is_some() {
            return Ok(());
        }
        let hardware = HardwareDecoding::detect(&self.tool, &self.launcher)?;
        hardware.log_capabilities();
        self.hardware = Some(hardware);
        Ok(())
    }

    /// Runs the summary (when sampling several chunks) and one cropdetect pass per window.
    fn probe(&self, input: &Path) -> CoreResult<(MediaSummary, Vec<String>)> {
        let summary = if self.options.sample_chunks > 1 {
            let result = run_checked(&self.launcher, &summary_request(&self.tool, input))?;
            parse_media_summary(&result.stderr)
        } else {
            MediaSummary::default()
        };

        let windows = plan_windows(
            summary.duration_secs,
            self.options.sample_chunks,
            self.options.chunk_duration_secs,
        );
        log::debug!(
            "Probing {} window(s) of up to {}",
            windows.len(),
            format_duration(self.options.chunk_duration_secs)
        );

        let mut diagnostics = Vec::with_capacity(windows.len());
        for (i, window) in windows.iter().enumerate() {
            log::debug!(
                "cropdetect window {}/{} at {:.3}s",
                i + 1,
                windows.len(),
                window.start_secs
            );
            let request = self.probe_request(input, window);
            diagnostics.push(run_checked(&self.launcher, &request)?.stderr);
        }
        Ok((summary, diagnostics))
    }

    /// cropdetect over one window, discarding the decoded output.
    pub fn probe_request(&self, input: &Path, window: &ProbeWindow) -> InvocationRequest {
        FfmpegArgs::new()
            .arg("-nostats")
            .arg("-ss")
            .arg(format!("{:.3}", window.start_secs))
            .arg("-t")
            .arg(format!("{:.3}", window.duration_secs))
            .strict_errors()
            .hwaccel(self.hwaccel())
            .input(input)
            .args(["-map", "0:v:0", "-vf", "cropdetect"])
            .null_output()
            .build(&self.tool)
    }

    /// Re-encodes video through the crop filter and copies every other stream.
    pub fn apply_request(
        &self,
        input: &Path,
        output: &Path,
        geometry: &CropGeometry,
    ) -> InvocationRequest {
        FfmpegArgs::new()
            .overwrite(self.options.overwrite)
            .strict_errors()
            .hwaccel(self.hwaccel())
            .input(input)
            .args(["-map", "0", "-c:s", "copy", "-c:a", "copy", "-c:d", "copy"])
            .args(["-c:v", self.options.video_codec.as_str()])
            .arg("-filter:v")
            .arg(geometry.to_filter())
            .format(self.options.format.as_deref())
            .output(output)
            .build(&self.tool)
    }

    fn enter(&mut self, next: CropPhase) {
        log::debug!("crop: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// Convenience wrapper for a one-shot crop.
pub fn crop_video<L: ProcessLauncher>(
    tool: ToolPath,
    launcher: L,
    options: CropOptions,
    input: &Path,
    output: &Path,
) -> CoreResult<CropOutcome> {
    CropCommand::new(tool, launcher, options).run(input, output)
}

/// Spreads `chunks` windows evenly over `duration`.
///
/// Each window lasts `chunk_duration` or the spacing between starts, whichever
/// is shorter, so windows never overlap. Without a known duration, with one
/// chunk, or when windows would be shorter than a second, a single window
/// from the start is used.
pub fn plan_windows(duration: Option<f64>, chunks: usize, chunk_duration: f64) -> Vec<ProbeWindow> {
    let from_start = |len: f64| {
        vec![ProbeWindow {
            start_secs: 0.0,
            duration_secs: round_ms(len),
        }]
    };

    let duration = match duration {
        Some(d) if d.is_finite() && d > 0.0 && chunks > 1 => d,
        Some(d) if d.is_finite() && d > 0.0 => return from_start(chunk_duration.min(d)),
        _ => return from_start(chunk_duration),
    };

    let spacing = duration / chunks as f64;
    if spacing < 1.0 {
        return from_start(chunk_duration.min(duration));
    }

    let len = round_ms(chunk_duration.min(spacing));
    (0..chunks)
        .map(|i| ProbeWindow {
            start_secs: round_ms(spacing * i as f64),
            duration_secs: len,
        })
        .collect()
}

fn round_ms(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// True when the crop removes fewer than `min_trim` pixels on both axes.
fn trims_too_little(geometry: &CropGeometry, source: (u32, u32), min_trim: u32) -> bool {
    min_trim > 0
        && source.0.saturating_sub(geometry.width) < min_trim
        && source.1.saturating_sub(geometry.height) < min_trim
}
