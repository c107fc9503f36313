//! Crop suggestion parsing and selection.
//!
//! ffmpeg's `cropdetect` filter logs one suggestion per analyzed frame on the
//! diagnostic stream, e.g.
//!
//! ```text
//! [Parsed_cropdetect_0 @ 0x7f8] x1:0 x2:1919 y1:140 y2:939 w:1920 h:800 x:0 y:140 pts:0 t:0.000000 crop=1920:800:0:140
//! ```
//!
//! This module scans that text for `crop=W:H:X:Y` tokens and picks one
//! geometry out of all suggestions. It never spawns anything, so it is tested
//! against captured text directly.

use crate::config::CropSelection;

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static CROP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"crop=(\d+):(\d+):(\d+):(\d+)").expect("crop pattern is valid")
});

/// Region of the frame to keep: `width`x`height` starting at (`x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropGeometry {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropGeometry {
    pub fn new(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self { width, height, x, y }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The ffmpeg filter expression, e.g. `crop=1920:800:0:140`.
    pub fn to_filter(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CropGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Lazily yields every crop suggestion found in `diagnostics`, in order.
///
/// Tokens whose numbers do not fit in a `u32` are skipped. Calling it again
/// on the same text restarts the scan.
pub fn crop_suggestions(diagnostics: &str) -> impl Iterator<Item = CropGeometry> + '_ {
    diagnostics.lines().flat_map(|line| {
        CROP_RE.captures_iter(line).filter_map(|caps| {
            let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
            Some(CropGeometry::new(field(1)?, field(2)?, field(3)?, field(4)?))
        })
    })
}

/// Multiset of observed suggestions, accumulated across probe runs.
#[derive(Debug, Clone, Default)]
pub struct CropTally {
    // Insertion-ordered so ties resolve to the earliest seen geometry.
    counts: Vec<(CropGeometry, usize)>,
    last: Option<CropGeometry>,
}

impl CropTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, geometry: CropGeometry) {
        match self.counts.iter_mut().find(|(g, _)| *g == geometry) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((geometry, 1)),
        }
        self.last = Some(geometry);
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count_of(&self, geometry: &CropGeometry) -> usize {
        self.counts
            .iter()
            .find(|(g, _)| g == geometry)
            .map_or(0, |(_, count)| *count)
    }

    /// Distinct geometries with their counts, most frequent first.
    pub fn ranked(&self) -> Vec<(CropGeometry, usize)> {
        let mut ranked = self.counts.clone();
        // Stable sort keeps first-seen order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Picks the authoritative geometry under `policy`, or `None` if nothing was recorded.
    pub fn select(&self, policy: CropSelection) -> Option<CropGeometry> {
        match policy {
            CropSelection::MostFrequent => self.ranked().first().map(|(g, _)| *g),
            CropSelection::LastSeen => self.last,
            CropSelection::LargestArea => self
                .counts
                .iter()
                .map(|(g, _)| *g)
                .fold(None, |best: Option<CropGeometry>, g| match best {
                    Some(b) if b.area() >= g.area() => Some(b),
                    _ => Some(g),
                }),
        }
    }
}

impl Extend<CropGeometry> for CropTally {
    fn extend<I: IntoIterator<Item = CropGeometry>>(&mut self, iter: I) {
        for geometry in iter {
            self.record(geometry);
        }
    }
}

impl FromIterator<CropGeometry> for CropTally {
    fn from_iter<I: IntoIterator<Item = CropGeometry>>(iter: I) -> Self {
        let mut tally = Self::new();
        tally.extend(iter);
        tally
    }
}
