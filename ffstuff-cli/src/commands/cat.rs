// ffstuff-cli/src/commands/cat.rs
//
// Implementation of the `ffcat` command.

use crate::cli::CatArgs;
use crate::error::CliResult;
use crate::terminal;

use ffstuff_core::utils::format_duration;
use ffstuff_core::{
    CatCommand, CatOptions, ConcatMethod, ConcatOutcome, ProcessLauncher, ToolPath, format_bytes,
};
use std::path::Path;
use std::time::Instant;

/// Builds the core options from the parsed flags.
pub fn cat_options(args: &CatArgs) -> CatOptions {
    CatOptions::default()
        .with_strategy(args.strategy.into())
        .with_overwrite(args.overwrite.choice())
        .with_format(args.format.clone())
}

/// Concatenates the inputs named on the command line and reports the result.
pub fn run_cat<L: ProcessLauncher>(
    tool: ToolPath,
    launcher: L,
    args: &CatArgs,
) -> CliResult<ConcatOutcome> {
    let (inputs, output) = args.inputs_and_output()?;
    log::debug!("Using external tool: {}", tool);

    let start = Instant::now();
    let command = CatCommand::new(tool, launcher, cat_options(args));
    let outcome = command.run(&inputs, &output)?;

    let method = match outcome.method {
        ConcatMethod::StreamCopy => "stream copy",
        ConcatMethod::Reencode => "re-encode",
    };
    terminal::print_success(&format!(
        "Joined {} file(s) into {}",
        inputs.len(),
        output.display()
    ));
    terminal::print_status("method", method);
    report_output_size(&output);
    terminal::print_status("time", &format_duration(start.elapsed().as_secs_f64()));

    Ok(outcome)
}

pub(crate) fn report_output_size(output: &Path) {
    match std::fs::metadata(output) {
        Ok(meta) => terminal::print_status("size", &format_bytes(meta.len())),
        Err(e) => log::debug!("Cannot stat {}: {}", output.display(), e),
    }
}
