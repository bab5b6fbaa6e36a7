//! Headless stand-ins for the game: a scripted vehicle and a recording world.
//!
//! The vehicle moves along the path polyline by arc length at a fixed speed
//! per tick. The world hands out sequential entity handles and remembers what
//! is alive, so a simulation can be checked for leaks after `stop`.

use std::collections::BTreeMap;
use std::sync::Arc;

use nighttrain::geometry::{heading_towards, Vec3};
use nighttrain::host::{EntityFactory, EntityHandle, SessionEvents, TargetSource};
use nighttrain::path::PathStore;
use nighttrain::scenario::ContentKind;

/// Handle of the scripted vehicle.
pub const VEHICLE: EntityHandle = EntityHandle(0);

/// A vehicle that follows the path exactly.
pub struct ScriptedVehicle {
    store: Arc<PathStore>,
    /// Distance from waypoint 0 to each waypoint; looped paths get one more
    /// entry for the closing segment.
    cumulative: Vec<f32>,
    distance: f32,
}

impl ScriptedVehicle {
    /// Place the vehicle on waypoint `start_index` (clamped to the path).
    pub fn new(store: Arc<PathStore>, start_index: usize) -> Self {
        let len = store.len();
        let mut cumulative = Vec::with_capacity(len + 1);
        let mut total = 0.0f32;
        cumulative.push(0.0);
        let segments = if store.is_looped() { len } else { len - 1 };
        for i in 0..segments {
            total += store.segment_length(i);
            cumulative.push(total);
        }

        let distance = cumulative[start_index.min(len - 1)];
        Self {
            store,
            cumulative,
            distance,
        }
    }

    /// Length of one traversal.
    pub fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Distance travelled along the current lap.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Whether an open path has been driven to its end.
    pub fn at_end(&self) -> bool {
        !self.store.is_looped() && self.distance >= self.total_length()
    }

    /// Move forward by `meters`, wrapping on looped paths.
    pub fn advance(&mut self, meters: f32) {
        let total = self.total_length();
        self.distance += meters;
        if total <= 0.0 {
            self.distance = 0.0;
        } else if self.store.is_looped() {
            self.distance %= total;
        } else {
            self.distance = self.distance.min(total);
        }
    }

    /// World position at the current distance.
    pub fn position(&self) -> Vec3 {
        let (segment, t) = self.locate();
        let len = self.store.len();
        let a = self.store.position(segment % len);
        let b = self.store.position((segment + 1) % len);
        a + (b - a) * t
    }

    /// Direction of travel as a compass heading.
    pub fn heading(&self) -> f32 {
        let (segment, _) = self.locate();
        let len = self.store.len();
        let a = self.store.position(segment % len);
        let b = self.store.position((segment + 1) % len);
        heading_towards(a, b).unwrap_or_else(|| self.store.heading(segment % len))
    }

    /// Segment index and fraction along it for the current distance.
    fn locate(&self) -> (usize, f32) {
        let segments = self.cumulative.len() - 1;
        if segments == 0 {
            return (0, 0.0);
        }

        let after = self.cumulative.partition_point(|&d| d <= self.distance);
        let segment = after.saturating_sub(1).min(segments - 1);
        let start = self.cumulative[segment];
        let length = self.cumulative[segment + 1] - start;
        let t = if length > 0.0 {
            ((self.distance - start) / length).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (segment, t)
    }
}

impl TargetSource for ScriptedVehicle {
    fn position_of(&self, handle: EntityHandle) -> Option<Vec3> {
        (handle == VEHICLE).then(|| self.position())
    }

    fn heading_of(&self, handle: EntityHandle) -> Option<f32> {
        (handle == VEHICLE).then(|| self.heading())
    }
}

/// Entity factory that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingWorld {
    next: u64,
    live: BTreeMap<EntityHandle, ContentKind>,
    pub spawned: BTreeMap<ContentKind, u64>,
    pub despawned: u64,
    pub heading_updates: u64,
    pub engagements: u64,
    pub peak_live: usize,
}

impl RecordingWorld {
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl EntityFactory for RecordingWorld {
    fn spawn(
        &mut self,
        kind: ContentKind,
        position: Vec3,
        _heading: f32,
        variant: u32,
    ) -> Vec<EntityHandle> {
        self.next += 1;
        let handle = EntityHandle(self.next);
        self.live.insert(handle, kind);
        *self.spawned.entry(kind).or_default() += 1;
        self.peak_live = self.peak_live.max(self.live.len());
        tracing::trace!(%handle, %kind, variant, %position, "World spawn");
        vec![handle]
    }

    fn despawn(&mut self, handles: &[EntityHandle]) {
        for handle in handles {
            if self.live.remove(handle).is_some() {
                self.despawned += 1;
            }
        }
    }

    fn set_heading(&mut self, _handle: EntityHandle, _heading: f32) {
        self.heading_updates += 1;
    }

    fn engage(&mut self, _handle: EntityHandle, _target: EntityHandle) {
        self.engagements += 1;
    }
}

/// One host notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Marker(usize),
    Lap(u32),
    Collected(usize, ContentKind),
    Completed,
}

/// Collects notifications and optionally echoes them as they arrive.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
    echo: bool,
    tick: usize,
}

impl EventLog {
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            ..Default::default()
        }
    }

    /// Set the tick number printed with echoed events.
    pub fn set_tick(&mut self, tick: usize) {
        self.tick = tick;
    }

    pub fn markers(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::Marker(_)))
            .count()
    }

    fn record(&mut self, event: SimEvent) {
        if self.echo {
            match event {
                SimEvent::Marker(index) => println!("[{:>6}] marker {}", self.tick, index),
                SimEvent::Lap(laps) => println!("[{:>6}] lap {} completed", self.tick, laps),
                SimEvent::Collected(index, kind) => {
                    println!("[{:>6}] collected {} at {}", self.tick, kind, index)
                }
                SimEvent::Completed => println!("[{:>6}] reached the end of the path", self.tick),
            }
        }
        self.events.push(event);
    }
}

impl SessionEvents for EventLog {
    fn on_marker_crossed(&mut self, index: usize) {
        self.record(SimEvent::Marker(index));
    }

    fn on_lap_completed(&mut self, laps: u32) {
        self.record(SimEvent::Lap(laps));
    }

    fn on_collected(&mut self, index: usize, kind: ContentKind) {
        self.record(SimEvent::Collected(index, kind));
    }

    fn on_path_completed(&mut self) {
        self.record(SimEvent::Completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nighttrain::path::{Path, PathStoreConfig, Waypoint};
    use proptest::prelude::*;

    fn square(looped: bool) -> Arc<PathStore> {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let waypoints = points
            .iter()
            .map(|&(x, y)| Waypoint::from_xyzh(x, y, 0.0, 0.0))
            .collect();
        Arc::new(PathStore::new(
            Path::new(waypoints).unwrap(),
            PathStoreConfig::default().with_looped(looped),
        ))
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_vehicle_follows_polyline() {
        let mut vehicle = ScriptedVehicle::new(square(false), 0);
        assert_eq!(vehicle.total_length(), 30.0);

        vehicle.advance(15.0);
        assert!(approx(vehicle.position(), Vec3::new(10.0, 5.0, 0.0)));
        assert!((vehicle.heading() - 0.0).abs() < 1e-3);

        vehicle.advance(100.0);
        assert!(vehicle.at_end());
        assert!(approx(vehicle.position(), Vec3::new(0.0, 10.0, 0.0)));
    }

    #[test]
    fn test_vehicle_wraps_on_loop() {
        let mut vehicle = ScriptedVehicle::new(square(true), 3);
        assert_eq!(vehicle.total_length(), 40.0);
        assert_eq!(vehicle.distance(), 30.0);

        vehicle.advance(15.0);
        assert!(approx(vehicle.position(), Vec3::new(5.0, 0.0, 0.0)));
        assert!(!vehicle.at_end());
    }

    #[test]
    fn test_vehicle_only_answers_for_itself() {
        let vehicle = ScriptedVehicle::new(square(true), 0);
        assert!(vehicle.position_of(VEHICLE).is_some());
        assert!(vehicle.position_of(EntityHandle(5)).is_none());
        assert!(vehicle.heading_of(EntityHandle(5)).is_none());
    }

    #[test]
    fn test_recording_world_tracks_live_entities() {
        let mut world = RecordingWorld::default();
        let a = world.spawn(ContentKind::Collectible, Vec3::ZERO, 0.0, 1);
        let b = world.spawn(ContentKind::AimableTarget, Vec3::ZERO, 0.0, 0);
        assert_eq!(world.live(), 2);

        world.despawn(&a);
        world.despawn(&a);
        assert_eq!(world.live(), 1);
        assert_eq!(world.despawned, 1);
        assert_eq!(world.peak_live, 2);
        assert_eq!(world.spawned[&ContentKind::AimableTarget], 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_event_log_counts_markers() {
        let mut log = EventLog::new(false);
        log.on_marker_crossed(1);
        log.on_lap_completed(1);
        log.on_marker_crossed(2);
        assert_eq!(log.markers(), 2);
        assert_eq!(log.events[1], SimEvent::Lap(1));
    }

    proptest! {
        #[test]
        fn prop_vehicle_stays_on_looped_path(steps in prop::collection::vec(0.0f32..25.0, 1..50)) {
            let mut vehicle = ScriptedVehicle::new(square(true), 0);
            for step in steps {
                vehicle.advance(step);
                let p = vehicle.position();
                prop_assert!(vehicle.distance() >= 0.0 && vehicle.distance() < 40.0);
                // Every point of the square's perimeter lies on its boundary
                let on_edge = p.x.abs() < 1e-3
                    || (p.x - 10.0).abs() < 1e-3
                    || p.y.abs() < 1e-3
                    || (p.y - 10.0).abs() < 1e-3;
                prop_assert!(on_edge);
            }
        }
    }
}
