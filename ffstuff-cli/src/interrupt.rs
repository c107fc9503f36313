// ffstuff-cli/src/interrupt.rs
//
// Interrupt and termination handling for both binaries.
//
// On SIGINT, SIGTERM or SIGHUP the running ffmpeg is killed before the
// process exits, so no encoder keeps writing a half-finished output after
// the wrapper is gone.

use crate::error::EXIT_INTERRUPTED;
use crate::terminal;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Installs the process-wide handler. Failure to install only logs a warning.
pub fn install_handler() {
    let result = ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
        let killed = ffstuff_core::terminate_running_tools();
        log::warn!("Interrupted, terminated {} running process(es)", killed);
        terminal::print_error("interrupted");
        std::process::exit(EXIT_INTERRUPTED);
    });
    if let Err(e) = result {
        log::warn!("Failed to install interrupt handler: {}", e);
    }
}

/// True once a termination signal has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// The exit code to use, overriding `code` if the run was interrupted.
///
/// The main thread can observe its killed child before the handler thread
/// reaches `exit`; both must agree on the code.
pub fn resolve_exit_code(code: i32) -> i32 {
    if interrupted() { EXIT_INTERRUPTED } else { code }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_passes_through_without_signal() {
        assert!(!interrupted());
        assert_eq!(resolve_exit_code(0), 0);
        assert_eq!(resolve_exit_code(3), 3);
    }
}
