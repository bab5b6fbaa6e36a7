//! Path storage and locality-biased nearest-waypoint search.
//!
//! # Band Search
//!
//! Across consecutive frames the waypoint nearest the vehicle rarely moves
//! more than a handful of indices, so after the first (full) scan the search
//! only looks at a fixed band centred on the previous answer:
//!
//! ```text
//!   hint - band/2                hint                hint + band/2
//!        ├────────────────────────┼────────────────────────┤
//!   band = 2 × (window_behind + window_ahead) + BAND_SLACK
//! ```
//!
//! This is a locality cache rather than a spatial index. A teleport that
//! lands outside the band returns the best candidate *within* the band, not
//! the global nearest. Callers that need a guaranteed answer (session start)
//! pass no hint and pay for one full scan. At waypoint counts in the
//! hundreds this beats maintaining a k-d tree or grid; a larger path would
//! swap in a spatial index behind the same `nearest_index` contract.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::ops::RangeInclusive;
use std::path::{Path as FsPath, PathBuf};

use crate::geometry::Vec3;

use super::error::{PathError, PathResult};
use super::format::{read_path, write_path, LoadReport};
use super::waypoint::{Path, Waypoint};

/// Default number of waypoints kept ahead of the vehicle.
pub const DEFAULT_WINDOW_AHEAD: usize = 30;

/// Default number of waypoints kept behind the vehicle.
pub const DEFAULT_WINDOW_BEHIND: usize = 10;

/// Extra indices added to the search band on top of the content windows.
pub const BAND_SLACK: usize = 16;

/// Configuration for a [`PathStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathStoreConfig {
    /// Waypoints ahead of the vehicle that the content window covers.
    pub window_ahead: usize,
    /// Waypoints behind the vehicle that the content window covers.
    pub window_behind: usize,
    /// Whether the last waypoint connects back to the first.
    pub looped: bool,
}

impl Default for PathStoreConfig {
    fn default() -> Self {
        Self {
            window_ahead: DEFAULT_WINDOW_AHEAD,
            window_behind: DEFAULT_WINDOW_BEHIND,
            looped: true,
        }
    }
}

impl PathStoreConfig {
    /// Set the window sizes.
    pub fn with_windows(mut self, behind: usize, ahead: usize) -> Self {
        self.window_behind = behind;
        self.window_ahead = ahead;
        self
    }

    /// Set whether the path loops.
    pub fn with_looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }
}

/// Read-only owner of the recorded path.
///
/// Loaded once per session and shared (behind an `Arc`) by the progress
/// tracker and the scenario scheduler. Nothing mutates it after load.
#[derive(Debug, Clone)]
pub struct PathStore {
    path: Path,
    config: PathStoreConfig,
    report: LoadReport,
}

impl PathStore {
    /// Wrap an already-built path.
    pub fn new(path: Path, config: PathStoreConfig) -> Self {
        let report = LoadReport {
            points: path.len(),
            skipped_lines: 0,
        };
        Self {
            path,
            config,
            report,
        }
    }

    /// Load a path from a buffered reader.
    pub fn load<R: BufRead>(reader: R, config: PathStoreConfig) -> PathResult<Self> {
        let (path, report) = read_path(reader)?;

        if report.skipped_lines > 0 {
            tracing::warn!(
                skipped = report.skipped_lines,
                "Path contained malformed records"
            );
        }
        tracing::info!(points = report.points, looped = config.looped, "Path loaded");

        Ok(Self {
            path,
            config,
            report,
        })
    }

    /// Load a path file from disk.
    pub fn load_file(file: impl AsRef<FsPath>, config: PathStoreConfig) -> PathResult<Self> {
        let file = file.as_ref();
        let handle = File::open(file).map_err(|source| PathError::ReadFailed {
            path: file.to_path_buf(),
            source,
        })?;

        Self::load(BufReader::new(handle), config).map_err(|e| match e {
            PathError::Io(source) => PathError::ReadFailed {
                path: file.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Write the path to disk in the record format.
    pub fn save_file(&self, file: impl AsRef<FsPath>) -> PathResult<()> {
        let file = file.as_ref();
        let write_failed = |source| PathError::WriteFailed {
            path: PathBuf::from(file),
            source,
        };

        let handle = File::create(file).map_err(write_failed)?;
        write_path(&self.path, BufWriter::new(handle)).map_err(write_failed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &PathStoreConfig {
        &self.config
    }

    /// What the loader accepted and skipped.
    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Always false: a path holds at least one waypoint.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.path.len() - 1
    }

    pub fn is_looped(&self) -> bool {
        self.config.looped
    }

    pub fn window_ahead(&self) -> usize {
        self.config.window_ahead
    }

    pub fn window_behind(&self) -> usize {
        self.config.window_behind
    }

    pub fn waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.path.get(index)
    }

    /// Position of waypoint `index`. The index must be in range.
    pub fn position(&self, index: usize) -> Vec3 {
        self.path.waypoints()[index].position
    }

    /// Heading of waypoint `index`. The index must be in range.
    pub fn heading(&self, index: usize) -> f32 {
        self.path.waypoints()[index].heading
    }

    /// Total width of the locality search band, in indices.
    pub fn band_width(&self) -> usize {
        2 * (self.config.window_behind + self.config.window_ahead) + BAND_SLACK
    }

    /// Index of the waypoint nearest `position` (squared distance, z included).
    ///
    /// With `hint = None` this scans the whole path. With a hint it scans
    /// only the band around the hint (wrapping across the seam on looped
    /// paths) and may miss the true nearest after a large teleport. Exact
    /// ties resolve to the lowest index.
    pub fn nearest_index(&self, position: Vec3, hint: Option<usize>) -> usize {
        let len = self.len();

        let Some(hint) = hint else {
            return self.nearest_among(position, 0..len);
        };

        let hint = hint.min(len - 1);
        let half = self.band_width() / 2;

        if 2 * half + 1 >= len {
            return self.nearest_among(position, 0..len);
        }

        if self.config.looped {
            let start = hint + len - half;
            self.nearest_among(position, (0..=2 * half).map(|k| (start + k) % len))
        } else {
            let lo = hint.saturating_sub(half);
            let hi = (hint + half).min(len - 1);
            self.nearest_among(position, lo..=hi)
        }
    }

    fn nearest_among(&self, position: Vec3, indices: impl Iterator<Item = usize>) -> usize {
        let waypoints = self.path.waypoints();
        let mut best: Option<(f32, usize)> = None;

        for i in indices {
            let d = waypoints[i].position.distance_squared(position);
            let better = match best {
                None => true,
                Some((best_d, best_i)) => d < best_d || (d == best_d && i < best_i),
            };
            if better {
                best = Some((d, i));
            }
        }

        best.map(|(_, i)| i).unwrap_or(0)
    }

    /// Indices covered by the content window around `center`, clamped to
    /// the path.
    pub fn window_range(&self, center: usize) -> RangeInclusive<usize> {
        let start = center.saturating_sub(self.config.window_behind);
        let end = (center + self.config.window_ahead).min(self.last_index());
        start.min(end)..=end
    }

    /// Length of the segment leaving waypoint `index` (the wrap segment for
    /// the last waypoint of a looped path, zero otherwise).
    pub fn segment_length(&self, index: usize) -> f32 {
        let next = index + 1;
        if next < self.len() {
            self.position(index).distance(self.position(next))
        } else if self.config.looped && self.len() > 1 {
            self.position(index).distance(self.position(0))
        } else {
            0.0
        }
    }
}
