//! Command implementations for the CLI.
//!
//! Each submodule backs one binary.

/// The `ffcat` command: ordered concatenation of media files.
pub mod cat;

/// The `ffautocrop` command: black bar detection and removal.
pub mod autocrop;
