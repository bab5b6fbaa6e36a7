//! Progress of the vehicle along the path.
//!
//! [`PathProgressTracker`] turns a stream of vehicle positions into discrete,
//! ordered [`ProgressEvent`]s: one `MarkerCrossed` per waypoint the vehicle
//! passes and a `LapCompleted` each time a looped path wraps. Consumers
//! (scheduler, HUD, scoring) react to those events instead of polling
//! distances every frame.
//!
//! [`ProgressDisplay`] is the display-side counterpart that smooths the
//! number the player sees.

mod cursor;
mod display;
mod tracker;

pub use cursor::ProgressCursor;
pub use display::{ProgressDisplay, DEFAULT_BACKTRACK_TOLERANCE};
pub use tracker::{
    marker_indices, PathProgressTracker, ProgressError, ProgressEvent, TrackerConfig,
    TrackerState, DEFAULT_POINT_EPSILON, SEGMENT_EPSILON_SQ,
};
