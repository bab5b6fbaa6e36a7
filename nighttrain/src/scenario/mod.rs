//! Scenario content along the path.
//!
//! A schedule assigns content (pickups, actors, targets) to path indices
//! when a session starts. The [`WindowedEntityScheduler`] then turns
//! marker events into spawns ahead of the vehicle and despawns behind it,
//! delegating the concrete world objects to the host's
//! [`EntityFactory`](crate::host::EntityFactory).

mod content;
mod schedule;
mod scheduler;

pub use content::{
    ContentDescriptor, ContentKind, Placement, DEFAULT_TARGET_SIDE_OFFSET,
    DEFAULT_TARGET_UP_OFFSET, DEFAULT_TRACK_Z_OFFSET,
};
pub use schedule::{
    generate_schedule, Schedule, ScheduleBounds, SchedulePolicy, DEFAULT_FIRST_INDEX,
    DEFAULT_MAX_INDEX, DEFAULT_RANDOM_COUNT, DEFAULT_SPACING,
};
pub use scheduler::{
    ActiveEntry, SchedulerConfig, SchedulerStats, WindowedEntityScheduler,
    DEFAULT_ENGAGE_RADIUS, DEFAULT_MIN_START_INDEX,
};
