//! Waypoints and the ordered path they form.

use crate::geometry::{normalize_heading, Vec3};

use super::error::{PathError, PathResult};

/// A recorded `(position, heading)` sample on the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// World position.
    pub position: Vec3,
    /// Compass heading in degrees, normalized to `[0, 360)`.
    pub heading: f32,
}

impl Waypoint {
    /// Create a waypoint, normalizing the heading.
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading: normalize_heading(heading),
        }
    }

    /// Create a waypoint from raw record fields.
    pub fn from_xyzh(x: f32, y: f32, z: f32, heading: f32) -> Self {
        Self::new(Vec3::new(x, y, z), heading)
    }
}

/// The ordered sequence of waypoints.
///
/// Order is meaningful: it defines the direction of travel and which
/// waypoints are adjacent. A `Path` always holds at least one waypoint;
/// whether it is long enough to be *tracked* (two or more) is checked by
/// the progress tracker, since that is a start-up concern rather than a
/// load concern.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Build a path from waypoints in traversal order.
    pub fn new(waypoints: Vec<Waypoint>) -> PathResult<Self> {
        if waypoints.is_empty() {
            return Err(PathError::EmptyPath);
        }
        Ok(Self { waypoints })
    }

    /// Number of waypoints (always ≥ 1).
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    /// Sum of the straight segment lengths between consecutive waypoints.
    pub fn total_length(&self, looped: bool) -> f32 {
        let open: f32 = self
            .waypoints
            .windows(2)
            .map(|pair| pair[0].position.distance(pair[1].position))
            .sum();

        if looped && self.len() > 1 {
            let first = self.waypoints[0].position;
            let last = self.waypoints[self.len() - 1].position;
            open + last.distance(first)
        } else {
            open
        }
    }
}
