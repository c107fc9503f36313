// ffstuff-cli/src/cli.rs
//
// Defines the command-line argument structures for both binaries using clap.

use clap::{ArgAction, Args, Parser, ValueEnum};
use ffstuff_core::config::{
    DEFAULT_CHUNK_DURATION_SECS, DEFAULT_MIN_TRIM_PX, DEFAULT_SAMPLE_CHUNKS, DEFAULT_VIDEO_CODEC,
};
use ffstuff_core::{ConcatStrategy, CoreError, CoreResult, CropSelection};
use std::path::PathBuf;

// --- ffcat ---

#[derive(Parser, Debug)]
#[command(
    name = "ffcat",
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Concatenate media files with ffmpeg",
    long_about = "Joins the inputs, in the order given, into one output file. Streams are \
                  copied when possible and re-encoded only if ffmpeg cannot copy them together.\n\n\
                  The ffmpeg binary can be overridden with the FFSTUFF_FFMPEG_PATH environment variable."
)]
pub struct CatArgs {
    /// Input files in order, followed by the output file unless --output is given
    #[arg(required = true, value_name = "FILE")]
    pub paths: Vec<PathBuf>,

    /// Output file; every positional argument is then treated as an input
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Force the output container format (passed to ffmpeg as -f)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<String>,

    /// How to join the inputs
    #[arg(long, value_enum, default_value_t = StrategyArg::CopyThenReencode)]
    pub strategy: StrategyArg,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

impl CatArgs {
    /// Splits the positionals into inputs and output.
    pub fn inputs_and_output(&self) -> CoreResult<(Vec<PathBuf>, PathBuf)> {
        match &self.output {
            Some(output) => Ok((self.paths.clone(), output.clone())),
            None => match self.paths.split_last() {
                Some((output, inputs)) if !inputs.is_empty() => {
                    Ok((inputs.to_vec(), output.clone()))
                }
                _ => Err(CoreError::InvalidArguments(
                    "missing output file: give it as the last argument or with --output"
                        .to_string(),
                )),
            },
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Stream copy, re-encoding only if the streams cannot be copied together
    CopyThenReencode,
    /// Stream copy only
    Copy,
    /// Always re-encode through the concat filter
    Reencode,
}

impl From<StrategyArg> for ConcatStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::CopyThenReencode => ConcatStrategy::CopyThenReencode,
            StrategyArg::Copy => ConcatStrategy::CopyOnly,
            StrategyArg::Reencode => ConcatStrategy::Reencode,
        }
    }
}

// --- ffautocrop ---

#[derive(Parser, Debug)]
#[command(
    name = "ffautocrop",
    author,
    version,
    about = "Remove black bars from a video with ffmpeg",
    long_about = "Samples the input with ffmpeg's cropdetect filter, picks the crop region \
                  suggested most often and re-encodes the video through that crop. Audio, \
                  subtitle and data streams are copied.\n\n\
                  The ffmpeg binary can be overridden with the FFSTUFF_FFMPEG_PATH environment variable."
)]
pub struct CropArgs {
    /// Input video
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (or use --output)
    #[arg(value_name = "OUTPUT", conflicts_with = "output")]
    pub output_positional: Option<PathBuf>,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Number of windows spread across the input to run cropdetect on
    #[arg(short = 'n', long = "num-chunks", value_name = "COUNT", default_value_t = DEFAULT_SAMPLE_CHUNKS)]
    pub num_chunks: usize,

    /// Length of each sampled window in seconds
    #[arg(short = 'd', long = "chunk-duration", value_name = "SECONDS", default_value_t = DEFAULT_CHUNK_DURATION_SECS)]
    pub chunk_duration: f64,

    /// Video encoder used for the cropped stream
    #[arg(short = 'c', long = "video-codec", value_name = "CODEC", default_value = DEFAULT_VIDEO_CODEC)]
    pub video_codec: String,

    /// Force the output container format (passed to ffmpeg as -f)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<String>,

    /// Skip cropping when fewer than this many pixels would be removed on both axes (0 disables)
    #[arg(long = "min-trim", value_name = "PIXELS", default_value_t = DEFAULT_MIN_TRIM_PX)]
    pub min_trim: u32,

    /// Which of the suggested crop regions to apply
    #[arg(long, value_enum, default_value_t = SelectionArg::MostFrequent)]
    pub selection: SelectionArg,

    /// Decode in software even when ffmpeg offers CUDA
    #[arg(long = "no-hwaccel")]
    pub no_hwaccel: bool,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

impl CropArgs {
    pub fn output_path(&self) -> CoreResult<PathBuf> {
        self.output
            .as_ref()
            .or(self.output_positional.as_ref())
            .cloned()
            .ok_or_else(|| {
                CoreError::InvalidArguments(
                    "missing output file: give it after the input or with --output".to_string(),
                )
            })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionArg {
    /// The suggestion reported most often
    MostFrequent,
    /// The last suggestion reported
    LastSeen,
    /// The suggestion keeping the largest picture
    LargestArea,
}

impl From<SelectionArg> for CropSelection {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::MostFrequent => CropSelection::MostFrequent,
            SelectionArg::LastSeen => CropSelection::LastSeen,
            SelectionArg::LargestArea => CropSelection::LargestArea,
        }
    }
}

// --- Shared flags ---

#[derive(Args, Debug, Clone, Default)]
pub struct OverwriteArgs {
    /// Overwrite the output file without asking
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Never overwrite the output file
    #[arg(long = "no-overwrite", overrides_with = "overwrite")]
    pub no_overwrite: bool,
}

impl OverwriteArgs {
    /// `None` leaves the decision to ffmpeg.
    pub fn choice(&self) -> Option<bool> {
        match (self.overwrite, self.no_overwrite) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Environment fallback for `--log-dir`.
pub const LOG_DIR_ENV_VAR: &str = "FFSTUFF_LOG_DIR";

#[derive(Args, Debug, Clone, Default)]
pub struct LoggingArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Optional: Directory for a log file of this run
    #[arg(long, value_name = "LOG_DIR", env = LOG_DIR_ENV_VAR)]
    pub log_dir: Option<PathBuf>,
}
