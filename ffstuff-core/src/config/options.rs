// ============================================================================
// ffstuff-core/src/config/options.rs
// ============================================================================
//
// COMMAND OPTIONS: Tunables for CatCommand and CropCommand
//
// Defaults match what the command-line tools use when a flag is omitted.
// Both structs offer a small fluent API so callers only set what they change.

use crate::error::{CoreError, CoreResult};

/// Number of equally spaced windows probed by cropdetect.
pub const DEFAULT_SAMPLE_CHUNKS: usize = 10;

/// Length of each probed window, in seconds.
pub const DEFAULT_CHUNK_DURATION_SECS: f64 = 20.0;

/// Video encoder used when applying the crop.
pub const DEFAULT_VIDEO_CODEC: &str = "libx265";

/// A detected crop trimming fewer pixels than this on both axes is skipped.
pub const DEFAULT_MIN_TRIM_PX: u32 = 10;

/// How concatenation treats stream copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcatStrategy {
    /// Stream copy, re-encoding only if ffmpeg reports a copy incompatibility.
    #[default]
    CopyThenReencode,
    /// Stream copy only; incompatibilities are reported as failures.
    CopyOnly,
    /// Always re-encode through the concat filter.
    Reencode,
}

/// Rule for picking the authoritative geometry among the probe's suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropSelection {
    /// Mode of the suggestions; ties resolve to the earliest seen.
    #[default]
    MostFrequent,
    /// The last suggestion emitted.
    LastSeen,
    /// The suggestion covering the largest area.
    LargestArea,
}

/// Options for [`crate::processing::concat::CatCommand`].
#[derive(Debug, Clone, Default)]
pub struct CatOptions {
    pub strategy: ConcatStrategy,
    /// `Some(true)` passes `-y`, `Some(false)` passes `-n`, `None` leaves ffmpeg's default.
    pub overwrite: Option<bool>,
    /// Output container format (`-f`), when it cannot be inferred from the extension.
    pub format: Option<String>,
}

impl CatOptions {
    #[must_use]
    pub fn with_strategy(mut self, strategy: ConcatStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: Option<bool>) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format.filter(|f| !f.is_empty());
        self
    }
}

/// Options for [`crate::processing::autocrop::CropCommand`].
#[derive(Debug, Clone)]
pub struct CropOptions {
    pub sample_chunks: usize,
    pub chunk_duration_secs: f64,
    pub video_codec: String,
    pub format: Option<String>,
    pub overwrite: Option<bool>,
    /// Zero disables the minimum-trim check.
    pub min_trim_px: u32,
    pub selection: CropSelection,
    /// Ask ffmpeg for its decode accelerators and use CUDA when listed.
    pub hwaccel: bool,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            sample_chunks: DEFAULT_SAMPLE_CHUNKS,
            chunk_duration_secs: DEFAULT_CHUNK_DURATION_SECS,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            format: None,
            overwrite: None,
            min_trim_px: DEFAULT_MIN_TRIM_PX,
            selection: CropSelection::default(),
            hwaccel: true,
        }
    }
}

impl CropOptions {
    #[must_use]
    pub fn with_sample_chunks(mut self, chunks: usize) -> Self {
        self.sample_chunks = chunks;
        self
    }

    #[must_use]
    pub fn with_chunk_duration(mut self, secs: f64) -> Self {
        self.chunk_duration_secs = secs;
        self
    }

    /// An empty codec name falls back to [`DEFAULT_VIDEO_CODEC`].
    #[must_use]
    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        let codec = codec.into();
        self.video_codec = if codec.is_empty() {
            DEFAULT_VIDEO_CODEC.to_string()
        } else {
            codec
        };
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format.filter(|f| !f.is_empty());
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: Option<bool>) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn with_min_trim(mut self, px: u32) -> Self {
        self.min_trim_px = px;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: CropSelection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_hwaccel(mut self, enabled: bool) -> Self {
        self.hwaccel = enabled;
        self
    }

    /// Rejects option values the probe plan cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.sample_chunks == 0 {
            return Err(CoreError::InvalidArguments(
                "number of chunks must be at least 1".to_string(),
            ));
        }
        if !self.chunk_duration_secs.is_finite() || self.chunk_duration_secs <= 0.0 {
            return Err(CoreError::InvalidArguments(
                "chunk duration must be positive and nonzero".to_string(),
            ));
        }
        Ok(())
    }
}
