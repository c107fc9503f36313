//! Styled status lines on stderr.
//!
//! Stdout is left alone so the tools stay quiet in pipelines. Color follows
//! `console`'s terminal detection and is disabled by `NO_COLOR`.

use console::{Term, style};

fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && Term::stderr().features().colors_supported()
}

fn write_line(line: &str) {
    // Nothing sensible left to do if stderr itself is gone.
    let _ = Term::stderr().write_line(line);
}

/// Print a success message
pub fn print_success(message: &str) {
    if use_color() {
        write_line(&format!("{} {}", style("✓").green(), style(message).bold()));
    } else {
        write_line(&format!("✓ {message}"));
    }
}

/// Print a key-value status line
pub fn print_status(label: &str, value: &str) {
    if use_color() {
        write_line(&format!("  {:<10} {}", style(label).dim(), value));
    } else {
        write_line(&format!("  {label:<10} {value}"));
    }
}

/// Print an informational note
pub fn print_note(message: &str) {
    if use_color() {
        write_line(&format!("{} {}", style("»").cyan(), message));
    } else {
        write_line(&format!("» {message}"));
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    if use_color() {
        write_line(&format!("{} {}", style("✗ error:").red().bold(), message));
    } else {
        write_line(&format!("✗ error: {message}"));
    }
}

/// Writes the external tool's diagnostic text through unchanged.
pub fn print_tool_output(stderr: &str) {
    if stderr.is_empty() {
        return;
    }
    eprint!("{stderr}");
    if !stderr.ends_with('\n') {
        eprintln!();
    }
}
