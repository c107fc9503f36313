// ffstuff-cli/src/bin/ffcat.rs
//
// Entry point for `ffcat`: joins media files, in order, with ffmpeg.
//
// Responsibilities:
// - Parsing arguments and setting up logging.
// - Resolving the ffmpeg command once from the process environment.
// - Running the concatenation through the real process launcher.
// - Mapping the result to an exit code.

use clap::Parser;
use ffstuff::error::EXIT_SUCCESS;
use ffstuff::{CatArgs, interrupt, logging, report_error, run_cat, terminal};
use ffstuff_core::{SystemLauncher, ToolResolver};
use std::process;

fn main() {
    let args = CatArgs::parse();
    let log_file = logging::init_logging("ffcat", &args.logging);
    interrupt::install_handler();

    let tool = ToolResolver::from_process_env().resolve();
    let exit_code = match run_cat(tool, SystemLauncher::new(), &args) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => report_error(&e),
    };

    if let Some(path) = log_file {
        terminal::print_status("log", &path.display().to_string());
    }
    process::exit(interrupt::resolve_exit_code(exit_code));
}
