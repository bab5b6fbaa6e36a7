//! Frame-driven orchestration of tracker, scheduler and display.
//!
//! A [`Session`] is what the host drives: `start` when the player starts the
//! run, `tick` once per frame, `stop` when the run ends.
//!
//! # Tick Order
//!
//! ```text
//! tick()
//!   ├─ sample target position (skip frame if unavailable or non-finite)
//!   ├─ tracker.update(position) ──► [MarkerCrossed(i), LapCompleted(n), ...]
//!   │     for each event, in order:
//!   │       MarkerCrossed(i) ─► on_marker_crossed(i)
//!   │                           on_path_completed()     (i == last index)
//!   │                           scheduler.on_marker(i)
//!   │       LapCompleted(n) ──► on_lap_completed(n)
//!   ├─ heading deviation from the path direction
//!   ├─ scheduler.tick(position)
//!   └─ display.observe(...)
//! ```
//!
//! Every marker of a frame reaches the scheduler before the next frame's
//! position is sampled, which is what keeps spawning exactly once per
//! waypoint when the train crosses several waypoints in one frame.
//!
//! # Deferred Initialization
//!
//! If the tracked entity does not exist yet when `start` is called (the
//! host is still creating the train), initialization happens on the first
//! tick that can see it.

mod config;
mod error;

pub use config::{SessionConfig, DEFAULT_SEED};
pub use error::SessionError;

use std::sync::Arc;

use serde::Serialize;

use crate::geometry::{heading_delta, heading_towards, normalize_heading, Vec3};
use crate::host::{EntityFactory, EntityHandle, SessionEvents, TargetSource};
use crate::path::PathStore;
use crate::progress::{PathProgressTracker, ProgressDisplay, ProgressError, ProgressEvent};
use crate::scenario::WindowedEntityScheduler;

/// Deviation from the path direction beyond which the target counts as
/// travelling backwards.
pub const REVERSING_DEVIATION: f32 = 90.0;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Stopped,
    /// Started, waiting for the target to appear.
    Pending,
    Running,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Stopped => write!(f, "stopped"),
            SessionState::Pending => write!(f, "pending"),
            SessionState::Running => write!(f, "running"),
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Markers crossed this frame, in order.
    pub markers: Vec<usize>,
    /// Lap counts reached this frame.
    pub laps: Vec<u32>,
    /// Collectibles picked up this frame.
    pub collected: u64,
    /// The last waypoint was crossed this frame.
    pub path_completed: bool,
    /// The frame was skipped (not running or target missing).
    pub skipped: bool,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

/// Summary of a session for logging and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub state: SessionState,
    pub markers_crossed: u64,
    pub laps_completed: u32,
    pub collected: u64,
    pub spawned: u64,
    pub despawned: u64,
    pub spawn_failures: u64,
    pub active: usize,
    pub scheduled: usize,
    pub previous_index: usize,
    pub progress: String,
    /// Angle between the target's heading and the path, when the host
    /// reports a heading.
    pub heading_deviation: Option<f32>,
}

/// One run of the train along a path.
pub struct Session {
    store: Arc<PathStore>,
    config: SessionConfig,
    state: SessionState,
    target: Option<EntityHandle>,
    tracker: PathProgressTracker,
    scheduler: WindowedEntityScheduler,
    display: ProgressDisplay,
    markers_crossed: u64,
    heading_deviation: Option<f32>,
}

impl Session {
    /// Create a stopped session. Content windows are taken from the store.
    pub fn new(store: Arc<PathStore>, mut config: SessionConfig) -> Self {
        config.scheduler = config
            .scheduler
            .with_windows(store.window_behind(), store.window_ahead());

        let tracker = PathProgressTracker::new(store.clone(), config.tracker.clone());
        let scheduler = WindowedEntityScheduler::new(store.clone(), config.scheduler.clone());
        let display = ProgressDisplay::new(store.len(), config.backtrack_tolerance);

        Self {
            store,
            config,
            state: SessionState::Stopped,
            target: None,
            tracker,
            scheduler,
            display,
            markers_crossed: 0,
            heading_deviation: None,
        }
    }

    /// Start tracking `target`.
    ///
    /// Fails if the session is already started or the path is too short to
    /// track. If the target is not visible yet, initialization is deferred
    /// to the first tick that sees it.
    pub fn start(
        &mut self,
        target: EntityHandle,
        sources: &dyn TargetSource,
        factory: &mut dyn EntityFactory,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Stopped {
            return Err(SessionError::AlreadyRunning);
        }

        let len = self.store.len();
        if len < 2 {
            tracing::error!(len, "Refusing to start session on a path this short");
            return Err(ProgressError::PathTooShort { len }.into());
        }

        self.target = Some(target);
        self.markers_crossed = 0;

        match sample(sources, target) {
            Some(position) => self.begin(position, factory)?,
            None => {
                self.state = SessionState::Pending;
                tracing::info!(%target, "Session started, waiting for target");
            }
        }
        Ok(())
    }

    fn begin(
        &mut self,
        position: Vec3,
        factory: &mut dyn EntityFactory,
    ) -> Result<(), ProgressError> {
        self.tracker.initialize(position)?;
        let start_index = self.tracker.previous_index();

        self.scheduler
            .start(&self.config.policy, self.config.seed, start_index, factory);
        self.display
            .observe(self.tracker.laps_completed(), start_index, position);
        self.state = SessionState::Running;

        tracing::info!(
            start_index,
            points = self.store.len(),
            looped = self.store.is_looped(),
            "Session running"
        );
        Ok(())
    }

    /// Process one frame.
    pub fn tick(
        &mut self,
        sources: &dyn TargetSource,
        factory: &mut dyn EntityFactory,
        events: &mut dyn SessionEvents,
    ) -> TickReport {
        let Some(target) = self.target else {
            return TickReport::skipped();
        };
        if self.state == SessionState::Stopped {
            return TickReport::skipped();
        }

        let Some(position) = sample(sources, target) else {
            return TickReport::skipped();
        };

        if self.state == SessionState::Pending {
            if let Err(e) = self.begin(position, factory) {
                tracing::error!(error = %e, "Deferred session start failed");
                return TickReport::skipped();
            }
        }

        let progress = match self.tracker.update(position) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "Progress update failed");
                return TickReport::skipped();
            }
        };

        let collected_before = self.scheduler.stats().collected;
        let last_index = self.store.last_index();
        let mut report = TickReport::default();

        for event in progress {
            match event {
                ProgressEvent::MarkerCrossed(index) => {
                    self.markers_crossed += 1;
                    report.markers.push(index);
                    events.on_marker_crossed(index);

                    if index == last_index {
                        report.path_completed = true;
                        tracing::info!(index, "Reached final waypoint");
                        events.on_path_completed();
                    }

                    self.scheduler.on_marker(index, factory, events);
                }
                ProgressEvent::LapCompleted(laps) => {
                    report.laps.push(laps);
                    tracing::info!(laps, "Lap completed");
                    events.on_lap_completed(laps);
                }
            }
        }

        self.observe_heading(sources.heading_of(target));
        self.scheduler.tick(target, position, factory);
        let shown = if self.tracker.is_finished() {
            last_index
        } else {
            self.tracker.previous_index()
        };
        self.display
            .observe(self.tracker.laps_completed(), shown, position);

        report.collected = self.scheduler.stats().collected - collected_before;
        report
    }

    /// Compare the target's heading with the direction of the current
    /// segment. Logs when the target turns against the path or back.
    fn observe_heading(&mut self, heading: Option<f32>) {
        let previous = self.tracker.previous_index();
        let next = self.tracker.next_index();
        let path_heading =
            heading_towards(self.store.position(previous), self.store.position(next))
                .unwrap_or_else(|| self.store.heading(previous));

        let deviation = heading
            .filter(|h| h.is_finite())
            .map(|h| heading_delta(normalize_heading(h), path_heading));

        let was_reversing = self.heading_deviation.is_some_and(|d| d > REVERSING_DEVIATION);
        let reversing = deviation.is_some_and(|d| d > REVERSING_DEVIATION);
        if reversing != was_reversing {
            tracing::debug!(
                index = previous,
                deviation = deviation.unwrap_or_default(),
                reversing,
                "Target direction relative to path changed"
            );
        }
        self.heading_deviation = deviation;
    }

    /// Tear everything down. Idempotent.
    pub fn stop(&mut self, factory: &mut dyn EntityFactory) {
        let was = self.state;

        self.scheduler.stop(factory);
        self.tracker.reset();
        self.display.reset();
        self.target = None;
        self.heading_deviation = None;
        self.state = SessionState::Stopped;

        if was != SessionState::Stopped {
            tracing::info!(markers = self.markers_crossed, "Session stopped");
        }
    }

    pub fn stats(&self) -> SessionStats {
        let scheduler = self.scheduler.stats();
        SessionStats {
            state: self.state,
            markers_crossed: self.markers_crossed,
            laps_completed: self.tracker.laps_completed(),
            collected: scheduler.collected,
            spawned: scheduler.spawned,
            despawned: scheduler.despawned,
            spawn_failures: scheduler.spawn_failures,
            active: self.scheduler.active_len(),
            scheduled: self.scheduler.scheduled_len(),
            previous_index: self.tracker.previous_index(),
            progress: self.display.text(),
            heading_deviation: self.heading_deviation,
        }
    }

    /// Latest angle between the target's heading and the path direction.
    pub fn heading_deviation(&self) -> Option<f32> {
        self.heading_deviation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<PathStore> {
        &self.store
    }

    pub fn tracker(&self) -> &PathProgressTracker {
        &self.tracker
    }

    pub fn scheduler(&self) -> &WindowedEntityScheduler {
        &self.scheduler
    }

    pub fn display(&self) -> &ProgressDisplay {
        &self.display
    }
}

/// Current position of `target`, treating a non-finite pose as absent.
fn sample(sources: &dyn TargetSource, target: EntityHandle) -> Option<Vec3> {
    let position = sources.position_of(target)?;
    if !position.is_finite() {
        tracing::debug!(%target, "Ignoring non-finite target position");
        return None;
    }
    Some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoEvents;
    use crate::path::{Path, PathStoreConfig, Waypoint};
    use crate::scenario::ContentKind;
    use std::cell::Cell;
    use std::collections::BTreeSet;

    const TRAIN: EntityHandle = EntityHandle(1);

    struct Train {
        position: Cell<Option<Vec3>>,
        heading: Cell<Option<f32>>,
    }

    impl Train {
        fn at(x: f32) -> Self {
            Self {
                position: Cell::new(Some(Vec3::new(x, 0.0, 0.0))),
                heading: Cell::new(Some(90.0)),
            }
        }

        fn missing() -> Self {
            Self {
                position: Cell::new(None),
                heading: Cell::new(None),
            }
        }

        fn move_to(&self, x: f32) {
            self.position.set(Some(Vec3::new(x, 0.0, 0.0)));
        }
    }

    impl TargetSource for Train {
        fn position_of(&self, handle: EntityHandle) -> Option<Vec3> {
            if handle == TRAIN {
                self.position.get()
            } else {
                None
            }
        }

        fn heading_of(&self, handle: EntityHandle) -> Option<f32> {
            if handle == TRAIN {
                self.heading.get()
            } else {
                None
            }
        }
    }

    #[derive(Default)]
    struct Factory {
        next: u64,
        live: BTreeSet<EntityHandle>,
    }

    impl EntityFactory for Factory {
        fn spawn(&mut self, _: ContentKind, _: Vec3, _: f32, _: u32) -> Vec<EntityHandle> {
            self.next += 1;
            self.live.insert(EntityHandle(self.next));
            vec![EntityHandle(self.next)]
        }

        fn despawn(&mut self, handles: &[EntityHandle]) {
            for h in handles {
                self.live.remove(h);
            }
        }
    }

    fn session(n: usize, looped: bool) -> Session {
        let waypoints = (0..n)
            .map(|i| Waypoint::from_xyzh(i as f32 * 10.0, 0.0, 0.0, 90.0))
            .collect();
        let store = PathStore::new(
            Path::new(waypoints).unwrap(),
            PathStoreConfig::default().with_looped(looped),
        );
        Session::new(Arc::new(store), SessionConfig::default())
    }

    #[test]
    fn test_start_twice_fails() {
        let mut s = session(50, false);
        let train = Train::at(0.0);
        let mut factory = Factory::default();

        s.start(TRAIN, &train, &mut factory).unwrap();
        assert_eq!(
            s.start(TRAIN, &train, &mut factory),
            Err(SessionError::AlreadyRunning)
        );
    }

    #[test]
    fn test_short_path_refused() {
        let mut s = session(1, false);
        let mut factory = Factory::default();
        assert_eq!(
            s.start(TRAIN, &Train::at(0.0), &mut factory),
            Err(SessionError::Progress(ProgressError::PathTooShort { len: 1 }))
        );
        assert_eq!(s.state(), SessionState::Stopped);
    }

    #[test]
    fn test_deferred_start() {
        let mut s = session(50, false);
        let train = Train::missing();
        let mut factory = Factory::default();

        s.start(TRAIN, &train, &mut factory).unwrap();
        assert_eq!(s.state(), SessionState::Pending);
        assert!(s.tick(&train, &mut factory, &mut NoEvents).skipped);

        train.move_to(0.0);
        let report = s.tick(&train, &mut factory, &mut NoEvents);
        assert!(!report.skipped);
        assert_eq!(s.state(), SessionState::Running);
        assert!(!factory.live.is_empty());
    }

    #[test]
    fn test_tick_reports_markers() {
        let mut s = session(50, false);
        let train = Train::at(0.0);
        let mut factory = Factory::default();
        s.start(TRAIN, &train, &mut factory).unwrap();

        train.move_to(35.0);
        let report = s.tick(&train, &mut factory, &mut NoEvents);
        assert_eq!(report.markers, vec![1, 2, 3]);
        assert_eq!(s.stats().markers_crossed, 3);
    }

    #[test]
    fn test_missing_target_skips_frame() {
        let mut s = session(50, false);
        let train = Train::at(0.0);
        let mut factory = Factory::default();
        s.start(TRAIN, &train, &mut factory).unwrap();

        train.position.set(None);
        assert!(s.tick(&train, &mut factory, &mut NoEvents).skipped);
        assert!(s.is_running());
    }

    #[test]
    fn test_non_finite_position_defers_start() {
        let mut s = session(50, false);
        let train = Train::at(0.0);
        train.position.set(Some(Vec3::new(f32::NAN, 0.0, 0.0)));
        let mut factory = Factory::default();

        s.start(TRAIN, &train, &mut factory).unwrap();
        assert_eq!(s.state(), SessionState::Pending);
        assert!(factory.live.is_empty());
        assert!(s.tick(&train, &mut factory, &mut NoEvents).skipped);

        // First valid pose lands mid-path
        train.move_to(203.0);
        s.tick(&train, &mut factory, &mut NoEvents);
        assert!(s.is_running());
        assert_eq!(s.tracker().previous_index(), 20);
        assert!((0.0..1.0).contains(&s.tracker().fraction()));
    }

    #[test]
    fn test_heading_deviation_tracks_direction() {
        let mut s = session(50, false);
        let train = Train::at(0.0);
        let mut factory = Factory::default();
        s.start(TRAIN, &train, &mut factory).unwrap();
        assert_eq!(s.heading_deviation(), None);

        train.move_to(15.0);
        s.tick(&train, &mut factory, &mut NoEvents);
        assert!(s.heading_deviation().is_some_and(|d| d < 1e-3));

        // Facing west on an eastbound path
        train.heading.set(Some(-90.0));
        s.tick(&train, &mut factory, &mut NoEvents);
        let deviation = s.stats().heading_deviation.unwrap();
        assert!((deviation - 180.0).abs() < 1e-3);
        assert!(deviation > REVERSING_DEVIATION);

        train.heading.set(None);
        s.tick(&train, &mut factory, &mut NoEvents);
        assert_eq!(s.heading_deviation(), None);

        s.stop(&mut factory);
        assert_eq!(s.stats().heading_deviation, None);
    }

    #[test]
    fn test_stop_is_idempotent_and_releases() {
        let mut s = session(50, false);
        let train = Train::at(0.0);
        let mut factory = Factory::default();
        s.start(TRAIN, &train, &mut factory).unwrap();
        assert!(!factory.live.is_empty());

        s.stop(&mut factory);
        s.stop(&mut factory);
        assert!(factory.live.is_empty());
        assert_eq!(s.state(), SessionState::Stopped);
        assert!(s.tick(&train, &mut factory, &mut NoEvents).skipped);

        s.start(TRAIN, &train, &mut factory).unwrap();
        assert!(s.is_running());
    }

    #[test]
    fn test_path_completed_on_last_marker() {
        let mut s = session(5, false);
        let train = Train::at(0.0);
        let mut factory = Factory::default();
        s.start(TRAIN, &train, &mut factory).unwrap();

        train.move_to(30.0);
        assert!(!s.tick(&train, &mut factory, &mut NoEvents).path_completed);
        train.move_to(45.0);
        assert!(s.tick(&train, &mut factory, &mut NoEvents).path_completed);
        assert_eq!(s.stats().progress, "5/5  (100.0%)");
    }

    #[test]
    fn test_stats_before_start() {
        let s = session(10, true);
        let stats = s.stats();
        assert_eq!(stats.state, SessionState::Stopped);
        assert_eq!(stats.progress, "0/10  (0.0%)");
    }
}
