//! Forward-only projection of the vehicle onto the recorded path.
//!
//! # Algorithm
//!
//! Each update projects the vehicle position onto the current segment
//! `a → b` (`previous_index → next_index`):
//!
//! ```text
//!        t < 0          0 ≤ t < 1            t ≥ 1 (or within ε of b)
//!   ●  ·  ·  ·  a ━━━━━━━━━━━━━━━━━━━━━━━ b  ·  ·  ·  ●
//!   not yet here      between waypoints       crossed: emit marker(b),
//!   (fraction = 0)    (fraction = t)          advance, re-evaluate
//! ```
//!
//! Crossing a waypoint advances the cursor one segment and re-evaluates in
//! the same update, so a fast vehicle that covers several segments in one
//! frame still produces one marker per waypoint, in order. Zero-length
//! segments (duplicate recorded samples) are crossed immediately.
//!
//! The cursor never moves backwards. A vehicle that reverses simply stops
//! producing progress until it is ahead of the cursor again; smoothing of
//! displayed progress is the job of [`ProgressDisplay`](super::ProgressDisplay).
//!
//! # States
//!
//! ```text
//! Uninitialized --initialize()--> Tracking --reset()--> Uninitialized
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::geometry::Vec3;
use crate::path::PathStore;

use super::cursor::{ProgressCursor, FRACTION_CEILING};

/// Default distance at which a waypoint counts as reached.
///
/// Recorded samples are noisy; snapping a little early keeps a vehicle that
/// passes a hair to the side of a waypoint from stalling on it.
pub const DEFAULT_POINT_EPSILON: f32 = 0.25;

/// Squared length below which a segment is treated as zero-length.
pub const SEGMENT_EPSILON_SQ: f32 = 1e-6;

/// Errors reported by the progress tracker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    /// The path cannot be tracked.
    #[error("Path must contain at least 2 points (found {len})")]
    PathTooShort { len: usize },

    /// `update` was called before `initialize`.
    #[error("Progress tracker has not been initialized")]
    NotInitialized,

    /// `initialize` was given a position with a NaN or infinite component.
    #[error("Cannot initialize progress from a non-finite position")]
    NonFiniteTarget,
}

/// Something the tracker observed during an update, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The vehicle crossed the waypoint at this index.
    MarkerCrossed(usize),
    /// The vehicle finished a lap; carries the new lap count.
    LapCompleted(u32),
}

impl ProgressEvent {
    /// The crossed waypoint index, if this is a marker event.
    pub fn marker(&self) -> Option<usize> {
        match self {
            ProgressEvent::MarkerCrossed(index) => Some(*index),
            ProgressEvent::LapCompleted(_) => None,
        }
    }
}

/// Collect the marker indices from a batch of events.
pub fn marker_indices(events: &[ProgressEvent]) -> Vec<usize> {
    events.iter().filter_map(ProgressEvent::marker).collect()
}

/// Tracker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerState {
    /// No cursor; `initialize` must be called first.
    #[default]
    Uninitialized,
    /// Cursor is valid and advancing.
    Tracking,
}

impl std::fmt::Display for TrackerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerState::Uninitialized => write!(f, "uninitialized"),
            TrackerState::Tracking => write!(f, "tracking"),
        }
    }
}

/// Configuration for [`PathProgressTracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Distance from a waypoint at which it counts as reached.
    pub point_epsilon: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            point_epsilon: DEFAULT_POINT_EPSILON,
        }
    }
}

/// Monotonic progress tracker over a shared [`PathStore`].
#[derive(Debug)]
pub struct PathProgressTracker {
    store: Arc<PathStore>,
    config: TrackerConfig,
    state: TrackerState,
    cursor: ProgressCursor,
    /// Set once an open path's final waypoint has been crossed.
    finished: bool,
    /// Last nearest-waypoint answer, reused as the band-search hint.
    nearest_hint: Option<usize>,
}

impl PathProgressTracker {
    /// Create an uninitialized tracker.
    pub fn new(store: Arc<PathStore>, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            state: TrackerState::Uninitialized,
            cursor: ProgressCursor::start(),
            finished: false,
            nearest_hint: None,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(store: Arc<PathStore>) -> Self {
        Self::new(store, TrackerConfig::default())
    }

    /// Place the cursor where the vehicle actually is, without emitting events.
    ///
    /// The cursor is seeded on the segment leading into the waypoint nearest
    /// `target` (full scan) and then snapped forward, so a session restarted
    /// mid-path resumes where the train is instead of replaying from 0.
    ///
    /// A non-finite `target` is rejected and leaves the tracker untouched.
    pub fn initialize(&mut self, target: Vec3) -> Result<(), ProgressError> {
        self.check_length()?;
        if !target.is_finite() {
            return Err(ProgressError::NonFiniteTarget);
        }

        let nearest = self.store.nearest_index(target, None);
        self.cursor = if nearest == 0 {
            ProgressCursor::start()
        } else {
            ProgressCursor::on_segment(nearest - 1, self.store.len(), self.store.is_looped())
        };
        self.finished = false;
        self.nearest_hint = Some(nearest);
        self.state = TrackerState::Tracking;

        // Silent snap; wrapping during the snap is not a lap the vehicle drove
        let _ = self.advance(target);
        self.cursor.laps_completed = 0;

        tracing::info!(
            previous = self.cursor.previous_index,
            next = self.cursor.next_index,
            fraction = self.cursor.fraction,
            "Progress tracker initialized"
        );
        Ok(())
    }

    /// Start tracking on the segment leaving `previous_index`, without snapping.
    ///
    /// Used to resume from a known checkpoint: every waypoint ahead of it
    /// still produces a marker once the vehicle reaches it.
    pub fn initialize_at(&mut self, previous_index: usize) -> Result<(), ProgressError> {
        self.check_length()?;

        self.cursor =
            ProgressCursor::on_segment(previous_index, self.store.len(), self.store.is_looped());
        self.finished = false;
        self.nearest_hint = Some(self.cursor.previous_index);
        self.state = TrackerState::Tracking;

        tracing::debug!(
            previous = self.cursor.previous_index,
            "Progress tracker initialized at checkpoint"
        );
        Ok(())
    }

    /// Advance the cursor towards `target` and report what was crossed.
    ///
    /// Events are returned in the order they happened: markers in
    /// increasing index order, with a `LapCompleted` between the last
    /// waypoint's marker and marker 0 when a looped path wraps.
    pub fn update(&mut self, target: Vec3) -> Result<Vec<ProgressEvent>, ProgressError> {
        if self.state != TrackerState::Tracking {
            return Err(ProgressError::NotInitialized);
        }

        if !target.is_finite() {
            tracing::debug!("Ignoring non-finite target position");
            return Ok(Vec::new());
        }

        let events = self.advance(target);
        self.nearest_hint = Some(self.store.nearest_index(target, self.nearest_hint));
        Ok(events)
    }

    /// Drop the cursor and cached search hint. Idempotent.
    pub fn reset(&mut self) {
        self.state = TrackerState::Uninitialized;
        self.cursor = ProgressCursor::start();
        self.finished = false;
        self.nearest_hint = None;
    }

    fn check_length(&self) -> Result<(), ProgressError> {
        let len = self.store.len();
        if len < 2 {
            tracing::error!(len, "Path too short to track");
            return Err(ProgressError::PathTooShort { len });
        }
        Ok(())
    }

    /// Core projection loop. Performs at most one full path length of
    /// segment advances, which bounds the work even when every remaining
    /// segment is degenerate.
    fn advance(&mut self, target: Vec3) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        for _ in 0..self.store.len() {
            let a = self.store.position(self.cursor.previous_index);
            let b = self.store.position(self.cursor.next_index);
            let seg = b - a;
            let seg_len_sq = seg.length_squared();

            if seg_len_sq >= SEGMENT_EPSILON_SQ {
                let t = (target - a).dot(seg) / seg_len_sq;

                if t < 0.0 {
                    self.cursor.fraction = 0.0;
                    return events;
                }

                let closest = a + seg * t.clamp(0.0, 1.0);
                let reached = t >= 1.0 || closest.distance(b) <= self.config.point_epsilon;
                if !reached {
                    self.cursor.fraction = t.clamp(0.0, FRACTION_CEILING);
                    return events;
                }
            }

            events.push(ProgressEvent::MarkerCrossed(self.cursor.next_index));
            if !self.step_forward(&mut events) {
                return events;
            }
        }

        tracing::warn!(
            len = self.store.len(),
            previous = self.cursor.previous_index,
            "Progress update stopped after a full path of advances"
        );
        events
    }

    /// Move onto the next segment. Returns false once an open path is done.
    fn step_forward(&mut self, events: &mut Vec<ProgressEvent>) -> bool {
        let len = self.store.len();
        let crossed = self.cursor.next_index;

        self.cursor.previous_index = crossed;
        self.cursor.fraction = 0.0;

        if crossed + 1 < len {
            self.cursor.next_index = crossed + 1;
            return true;
        }

        if self.store.is_looped() {
            self.cursor.laps_completed += 1;
            self.cursor.next_index = 0;
            events.push(ProgressEvent::LapCompleted(self.cursor.laps_completed));
            return true;
        }

        self.cursor.previous_index = len - 2;
        self.cursor.next_index = len - 1;
        self.cursor.fraction = FRACTION_CEILING;
        self.finished = true;
        tracing::info!(last = len - 1, "Reached end of open path");
        false
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    pub fn cursor(&self) -> ProgressCursor {
        self.cursor
    }

    pub fn previous_index(&self) -> usize {
        self.cursor.previous_index
    }

    pub fn next_index(&self) -> usize {
        self.cursor.next_index
    }

    pub fn fraction(&self) -> f32 {
        self.cursor.fraction
    }

    pub fn laps_completed(&self) -> u32 {
        self.cursor.laps_completed
    }

    /// Whether an open path has been driven to its end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Nearest waypoint from the last update's band search.
    pub fn nearest_index(&self) -> Option<usize> {
        self.nearest_hint
    }

    /// Progress through the current lap in `[0, 1]`.
    pub fn progress_ratio(&self) -> f32 {
        if self.finished {
            return 1.0;
        }
        let segments = if self.store.is_looped() {
            self.store.len()
        } else {
            self.store.len() - 1
        };
        if segments == 0 {
            return 0.0;
        }
        ((self.cursor.previous_index as f32 + self.cursor.fraction) / segments as f32).min(1.0)
    }

    pub fn store(&self) -> &Arc<PathStore> {
        &self.store
    }
}
