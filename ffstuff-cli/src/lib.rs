// ffstuff-cli/src/lib.rs
//
// Library portion of the ffstuff command-line tools.
// Contains argument definitions and command logic shared by both binaries.

pub mod cli;
pub mod commands;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binaries or integration tests
pub use cli::{CatArgs, CropArgs};
pub use commands::autocrop::run_autocrop;
pub use commands::cat::run_cat;
pub use error::{exit_code_for, report_error};
