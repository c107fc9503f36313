//! The two commands and the crop suggestion parser they share.
//!
//! - `concat`: joins inputs into one output (`CatCommand`)
//! - `crop_detection`: parses `cropdetect` diagnostics and selects a geometry
//! - `autocrop`: probes, selects and applies a crop (`CropCommand`)

pub mod autocrop;
pub mod concat;
pub mod crop_detection;

pub use autocrop::{CropCommand, CropOutcome, CropPhase, ProbeWindow, crop_video, plan_windows};
pub use concat::{CatCommand, ConcatMethod, ConcatOutcome};
pub use crop_detection::{CropGeometry, CropTally, crop_suggestions};
