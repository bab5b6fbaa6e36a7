//! Host integration surface.
//!
//! The core never touches the game directly. Everything it needs from the
//! host (where the train is, how to create and remove world objects, where
//! to send notifications) goes through the narrow traits in this module.
//!
//! ```text
//!                 ┌──────────────┐  position_of / heading_of
//!   host game ───►│ TargetSource │──────────────────────────┐
//!                 └──────────────┘                          ▼
//!                 ┌───────────────┐  spawn / despawn   ┌─────────┐
//!   host game ◄───│ EntityFactory │◄───────────────────│ Session │
//!                 └───────────────┘                    └─────────┘
//!                 ┌───────────────┐  marker / lap /         │
//!   host game ◄───│ SessionEvents │◄── collected / done ────┘
//!                 └───────────────┘
//! ```
//!
//! All calls happen synchronously on the host's frame thread.

use std::fmt;

use crate::geometry::Vec3;
use crate::scenario::ContentKind;

/// Opaque identifier of a host-side entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current pose of host entities.
///
/// `None` means the entity does not exist this frame (not yet created,
/// already deleted); the caller skips the frame rather than failing.
pub trait TargetSource {
    fn position_of(&self, handle: EntityHandle) -> Option<Vec3>;

    fn heading_of(&self, handle: EntityHandle) -> Option<f32>;
}

/// Creates and removes the concrete world objects behind scheduled content.
pub trait EntityFactory {
    /// Spawn the entities for one piece of content.
    ///
    /// `variant` selects among interchangeable models for the kind. An empty
    /// result means the spawn failed; the scheduler drops the entry.
    fn spawn(
        &mut self,
        kind: ContentKind,
        position: Vec3,
        heading: f32,
        variant: u32,
    ) -> Vec<EntityHandle>;

    /// Remove previously spawned entities. Unknown handles are ignored.
    fn despawn(&mut self, handles: &[EntityHandle]);

    /// Turn an entity to a compass heading.
    fn set_heading(&mut self, _handle: EntityHandle, _heading: f32) {}

    /// Make an actor react to the tracked target coming close.
    fn engage(&mut self, _handle: EntityHandle, _target: EntityHandle) {}
}

/// Outward notifications, delivered in emission order within a tick.
pub trait SessionEvents {
    fn on_marker_crossed(&mut self, _index: usize) {}

    fn on_lap_completed(&mut self, _laps: u32) {}

    fn on_collected(&mut self, _index: usize, _kind: ContentKind) {}

    /// The final waypoint of the path was crossed.
    fn on_path_completed(&mut self) {}
}

/// Event sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl SessionEvents for NoEvents {}
