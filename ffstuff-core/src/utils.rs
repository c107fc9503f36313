//! Small shared helpers.
//!
//! Human-readable durations and sizes for the terminal summaries, ffmpeg's
//! `HH:MM:SS.ss` timestamps, and the path comparison behind the
//! input/output collision check.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Placeholder shown for a duration that cannot be displayed.
const UNKNOWN_DURATION: &str = "--:--:--";

/// Binary size units above plain bytes.
const SIZE_UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Whole seconds as `HH:MM:SS`; fractions are dropped.
///
/// Negative, NaN and out-of-range values yield `--:--:--`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let Ok(duration) = Duration::try_from_secs_f64(seconds) else {
        return UNKNOWN_DURATION.to_string();
    };
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

/// File size in the largest binary unit that keeps the value at or above 1,
/// with one decimal. Sizes under 1 KiB are shown in bytes.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// Seconds in an ffmpeg clock value such as `01:32:10.04`.
///
/// Minutes and seconds must be below 60. Anything else, including `N/A`, is `None`.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let mut fields = time.trim().splitn(3, ':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: f64 = fields.next()?.parse().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some((hours * 3600 + minutes * 60) as f64 + seconds)
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
///
/// Does not touch the file system beyond reading the current directory.
pub fn absolute_normalized(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// True if `a` and `b` name the same file.
///
/// Existing files are compared by canonical path (following symlinks);
/// otherwise the lexically normalized absolute paths are compared.
#[must_use]
pub fn paths_collide(a: &Path, b: &Path) -> bool {
    if let (Ok(ca), Ok(cb)) = (a.canonicalize(), b.canonicalize()) {
        return ca == cb;
    }
    absolute_normalized(a) == absolute_normalized(b)
}
