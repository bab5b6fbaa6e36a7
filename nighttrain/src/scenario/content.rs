//! Content kinds and where their entities are placed.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::geometry::{track_basis, Vec3};

/// Category of spawnable world content tied to a path index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Pickup resting on the track; collected by driving over its waypoint.
    Collectible,
    /// Pedestrian standing on the track.
    StationaryActor,
    /// Target prop beside and above the track that turns to face the train.
    AimableTarget,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [
        ContentKind::Collectible,
        ContentKind::StationaryActor,
        ContentKind::AimableTarget,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Collectible => "collectible",
            ContentKind::StationaryActor => "stationary_actor",
            ContentKind::AimableTarget => "aimable_target",
        }
    }

    /// Number of interchangeable models the host offers for this kind.
    pub fn variant_count(&self) -> u32 {
        match self {
            ContentKind::Collectible => 4,
            ContentKind::StationaryActor => 1,
            ContentKind::AimableTarget => 1,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collectible" | "pickup" => Ok(ContentKind::Collectible),
            "stationary_actor" | "actor" | "ped" => Ok(ContentKind::StationaryActor),
            "aimable_target" | "target" => Ok(ContentKind::AimableTarget),
            other => Err(format!("unknown content kind '{}'", other)),
        }
    }
}

/// A scheduled piece of content: what to spawn and which model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub kind: ContentKind,
    pub variant: u32,
}

impl ContentDescriptor {
    pub fn new(kind: ContentKind, variant: u32) -> Self {
        Self { kind, variant }
    }
}

/// Default height of a collectible above the track.
pub const DEFAULT_TRACK_Z_OFFSET: f32 = 0.5;

/// Default distance of an aimable target to the left of the track.
pub const DEFAULT_TARGET_SIDE_OFFSET: f32 = 10.0;

/// Default height of an aimable target above the track.
pub const DEFAULT_TARGET_UP_OFFSET: f32 = 10.0;

/// Spawn offsets relative to the waypoint a piece of content belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Collectibles are raised this far so they do not clip into the rail.
    pub track_z_offset: f32,
    /// Aimable targets sit this far to the left of the track.
    pub target_side_offset: f32,
    /// Aimable targets sit this far above the track.
    pub target_up_offset: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            track_z_offset: DEFAULT_TRACK_Z_OFFSET,
            target_side_offset: DEFAULT_TARGET_SIDE_OFFSET,
            target_up_offset: DEFAULT_TARGET_UP_OFFSET,
        }
    }
}

impl Placement {
    /// World position for `kind` spawned at a waypoint with the given pose.
    pub fn position_for(&self, kind: ContentKind, waypoint: Vec3, heading: f32) -> Vec3 {
        match kind {
            ContentKind::Collectible => waypoint + Vec3::UP * self.track_z_offset,
            ContentKind::StationaryActor => waypoint,
            ContentKind::AimableTarget => {
                let (left, _) = track_basis(heading);
                waypoint + left * self.target_side_offset + Vec3::UP * self.target_up_offset
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_collectible_raised() {
        let p = Placement::default().position_for(
            ContentKind::Collectible,
            Vec3::new(1.0, 2.0, 3.0),
            45.0,
        );
        assert!(approx(p, Vec3::new(1.0, 2.0, 3.5)));
    }

    #[test]
    fn test_actor_on_waypoint() {
        let wp = Vec3::new(5.0, 5.0, 0.0);
        let p = Placement::default().position_for(ContentKind::StationaryActor, wp, 90.0);
        assert_eq!(p, wp);
    }

    #[test]
    fn test_target_left_and_above() {
        let placement = Placement::default();

        // Heading 0 faces +y, so left is -x
        let p = placement.position_for(ContentKind::AimableTarget, Vec3::ZERO, 0.0);
        assert!(approx(p, Vec3::new(-10.0, 0.0, 10.0)));

        // Heading 90 faces +x, so left is +y
        let p = placement.position_for(ContentKind::AimableTarget, Vec3::ZERO, 90.0);
        assert!(approx(p, Vec3::new(0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_kind_parse_and_display() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.name().parse::<ContentKind>(), Ok(kind));
        }
        assert_eq!("Pickup".parse::<ContentKind>(), Ok(ContentKind::Collectible));
        assert!("boat".parse::<ContentKind>().is_err());
        assert_eq!(ContentKind::AimableTarget.to_string(), "aimable_target");
    }
}
