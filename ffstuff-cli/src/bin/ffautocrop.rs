// ffstuff-cli/src/bin/ffautocrop.rs
//
// Entry point for `ffautocrop`: detects black bars with ffmpeg's cropdetect
// and re-encodes the input without them. A skipped crop (bars too thin to be
// worth a re-encode) still exits successfully.

use clap::Parser;
use ffstuff::error::EXIT_SUCCESS;
use ffstuff::{CropArgs, interrupt, logging, report_error, run_autocrop, terminal};
use ffstuff_core::{SystemLauncher, ToolResolver};
use std::process;

fn main() {
    let args = CropArgs::parse();
    let log_file = logging::init_logging("ffautocrop", &args.logging);
    interrupt::install_handler();

    let tool = ToolResolver::from_process_env().resolve();
    let exit_code = match run_autocrop(tool, SystemLauncher::new(), &args) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => report_error(&e),
    };

    if let Some(path) = log_file {
        terminal::print_status("log", &path.display().to_string());
    }
    process::exit(interrupt::resolve_exit_code(exit_code));
}
