//! NightTrain - drive a scripted train along a recorded path
//!
//! This library holds the engine-agnostic core of the NightTrain mod: it
//! follows a vehicle along a pre-recorded 3D path, turns its movement into
//! discrete waypoint markers, and streams scenario content (pickups, actors,
//! targets) into the world ahead of the train and out of it behind.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────────────┐   ┌─────────────────────────┐
//! │ PathStore │◄──│ PathProgressTracker │──►│ WindowedEntityScheduler │
//! └───────────┘   └─────────────────────┘   └─────────────────────────┘
//!        ▲                  markers                     │ spawn/despawn
//!        │                                              ▼
//!        └──────────────── Session ◄──── host (TargetSource, EntityFactory)
//! ```
//!
//! - [`path`]: waypoints, the path file codec, nearest-waypoint search
//! - [`progress`]: forward-only projection and marker events
//! - [`scenario`]: schedules and the windowed spawn/despawn scheduler
//! - [`host`]: traits the host game implements
//! - [`session`]: per-frame orchestration
//! - [`config`]: `config.ini` handling
//! - [`logging`]: tracing setup

pub mod config;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod path;
pub mod progress;
pub mod scenario;
pub mod session;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
