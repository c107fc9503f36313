//! Input summary read from ffmpeg's stream header.
//!
//! ffmpeg prints a description of every input on its diagnostic stream
//! before processing starts:
//!
//! ```text
//! Input #0, matroska,webm, from 'in.mkv':
//!   Duration: 01:32:10.04, start: 0.000000, bitrate: 5000 kb/s
//!   Stream #0:0(eng): Video: h264 (High), yuv420p(progressive), 1920x1080 [SAR 1:1 DAR 16:9], 23.98 fps
//! ```
//!
//! The crop command reads duration and frame size from that header and the
//! concat re-encode checks it for audio, which avoids depending on a second
//! external tool.

use crate::config::ToolPath;
use crate::external::{FfmpegArgs, InvocationRequest};
use crate::utils::parse_ffmpeg_time;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration:\s*(\d+:\d+:\d+(?:\.\d+)?)").expect("duration pattern is valid")
});

static VIDEO_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Stream #\d+:\d+.*: Video: .*?\b(\d{2,5})x(\d{2,5})\b")
        .expect("video size pattern is valid")
});

static AUDIO_STREAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Stream #\d+:\d+.*: Audio: ").expect("audio stream pattern is valid")
});

/// What the header says about the input. Fields are `None` when not reported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MediaSummary {
    pub duration_secs: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// At least one audio stream is listed.
    pub has_audio: bool,
}

impl MediaSummary {
    /// Frame size, when both dimensions are known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }
}

/// Parses the first input's duration, first video stream's size and whether
/// any audio stream is present.
pub fn parse_media_summary(diagnostics: &str) -> MediaSummary {
    let mut summary = MediaSummary::default();
    for line in diagnostics.lines() {
        if line.trim_start().starts_with("Output #") {
            break;
        }
        if summary.duration_secs.is_none() {
            summary.duration_secs = DURATION_RE
                .captures(line)
                .and_then(|caps| parse_ffmpeg_time(&caps[1]));
        }
        if summary.width.is_none() {
            if let Some(caps) = VIDEO_SIZE_RE.captures(line) {
                summary.width = caps[1].parse().ok();
                summary.height = caps[2].parse().ok();
            }
        }
        summary.has_audio |= AUDIO_STREAM_RE.is_match(line);
    }
    summary
}

/// A run that opens `input`, prints its header and processes nothing.
pub fn summary_request(tool: &ToolPath, input: &Path) -> InvocationRequest {
    FfmpegArgs::new()
        .input(input)
        .args(["-c", "copy", "-t", "0"])
        .null_output()
        .build(tool)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
Input #0, matroska,webm, from 'in.mkv':
  Metadata:
    title           : Some Film
  Duration: 01:32:10.04, start: 0.000000, bitrate: 5000 kb/s
  Stream #0:0(eng): Video: h264 (High) (avc1 / 0x31637661), yuv420p(tv, bt709, progressive), 1920x1080 [SAR 1:1 DAR 16:9], 23.98 fps, 23.98 tbr, 1k tbn (default)
  Stream #0:1(eng): Audio: ac3, 48000 Hz, 5.1(side), fltp, 448 kb/s
Output #0, null, to 'pipe:':
  Stream #0:0(eng): Video: h264, yuv420p, 1280x720
";

    #[test]
    fn test_parses_duration_and_size() {
        let summary = parse_media_summary(HEADER);
        let duration = summary.duration_secs.unwrap();
        assert!((duration - 5530.04).abs() < 1e-6, "got {duration}");
        assert_eq!(summary.dimensions(), Some((1920, 1080)));
        assert!(summary.has_audio);
    }

    #[test]
    fn test_video_only_header_has_no_audio() {
        let header = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'screen.mp4':
  Duration: 00:00:12.00, start: 0.000000, bitrate: 900 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p, 1280x720, 30 fps
Output #0, null, to 'pipe:':
  Stream #0:0(und): Audio: pcm_s16le, 48000 Hz
";
        let summary = parse_media_summary(header);
        assert_eq!(summary.dimensions(), Some((1280, 720)));
        assert!(!summary.has_audio, "output section must not count");
    }

    #[test]
    fn test_missing_fields_stay_none() {
        let summary = parse_media_summary("Input #0, mpegts, from 'live.ts':\n  Duration: N/A, start: 1.4\n");
        assert_eq!(summary, MediaSummary::default());
        assert_eq!(summary.dimensions(), None);
    }

    #[test]
    fn test_summary_request_shape() {
        let request = summary_request(&ToolPath::default(), Path::new("in.mkv"));
        assert_eq!(
            request.args_lossy(),
            ["-hide_banner", "-i", "in.mkv", "-c", "copy", "-t", "0", "-f", "null", "-"]
        );
    }
}
