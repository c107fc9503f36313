// ffstuff-cli/src/commands/autocrop.rs
//
// Implementation of the `ffautocrop` command.

use crate::cli::CropArgs;
use crate::commands::cat::report_output_size;
use crate::error::CliResult;
use crate::terminal;

use ffstuff_core::utils::format_duration;
use ffstuff_core::{CropCommand, CropOptions, CropOutcome, ProcessLauncher, ToolPath};
use std::time::Instant;

/// Builds the core options from the parsed flags.
pub fn crop_options(args: &CropArgs) -> CropOptions {
    CropOptions::default()
        .with_sample_chunks(args.num_chunks)
        .with_chunk_duration(args.chunk_duration)
        .with_video_codec(args.video_codec.clone())
        .with_format(args.format.clone())
        .with_overwrite(args.overwrite.choice())
        .with_min_trim(args.min_trim)
        .with_selection(args.selection.into())
        .with_hwaccel(!args.no_hwaccel)
}

/// Detects and removes black bars from the input named on the command line.
pub fn run_autocrop<L: ProcessLauncher>(
    tool: ToolPath,
    launcher: L,
    args: &CropArgs,
) -> CliResult<CropOutcome> {
    let output = args.output_path()?;
    log::debug!("Using external tool: {}", tool);

    let start = Instant::now();
    let mut command = CropCommand::new(tool, launcher, crop_options(args));
    let outcome = command.run(&args.input, &output)?;

    match &outcome {
        CropOutcome::Cropped { geometry, .. } => {
            terminal::print_success(&format!("Cropped {}", output.display()));
            terminal::print_status("crop", &geometry.to_string());
            report_output_size(&output);
        }
        CropOutcome::Skipped { geometry, source } => {
            terminal::print_note("Crop skipped, output file not created");
            terminal::print_status(
                "detected",
                &format!("{} on {}x{} source", geometry, source.0, source.1),
            );
        }
    }
    terminal::print_status("time", &format_duration(start.elapsed().as_secs_f64()));

    Ok(outcome)
}
