//! Marker-driven spawn/despawn of scheduled content.
//!
//! # Window
//!
//! Content is kept alive in a sliding window of path indices around the
//! vehicle:
//!
//! ```text
//!          behind                 marker                 ahead
//!   ──────────┬──────────────────────●──────────────────────┬──────────
//!   despawned │◄──── window_behind ──┼──── window_ahead ───►│ scheduled
//!             └──────────── active entries live here ───────┘
//! ```
//!
//! Each marker spawns at most one entry (the one scheduled exactly
//! `window_ahead` indices ahead) and trims the active set behind the
//! window with a range operation on the ordered map. Nothing here polls
//! distances every frame to decide spawning, so the cost per marker does not
//! grow with the amount of scheduled content.
//!
//! # Lifecycle
//!
//! ```text
//! start() ──► schedule generated ──► catch_up() spawns the initial window
//!   │
//!   ├─ on_marker(i) ── spawn i + ahead, collect at i, cleanup behind i
//!   ├─ tick(target) ── face targets, engage nearby actors
//!   │
//! stop() ──► everything despawned, both maps empty
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::geometry::{heading_towards, Vec3};
use crate::host::{EntityFactory, EntityHandle, SessionEvents};
use crate::path::{PathStore, DEFAULT_WINDOW_AHEAD, DEFAULT_WINDOW_BEHIND};

use super::content::{ContentDescriptor, ContentKind, Placement};
use super::schedule::{generate_schedule, Schedule, ScheduleBounds, SchedulePolicy};

/// Default minimum index for scheduled content.
pub const DEFAULT_MIN_START_INDEX: usize = 10;

/// Default distance at which a stationary actor reacts to the train.
pub const DEFAULT_ENGAGE_RADIUS: f32 = 5.0;

/// Configuration for [`WindowedEntityScheduler`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Indices ahead of the marker at which content is spawned.
    pub window_ahead: usize,
    /// Indices behind the marker after which content is despawned.
    pub window_behind: usize,
    /// Nothing is scheduled before this index.
    pub min_start_index: usize,
    /// Distance at which stationary actors engage the tracked target.
    pub engage_radius: f32,
    /// Spawn offsets per content kind.
    pub placement: Placement,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            window_ahead: DEFAULT_WINDOW_AHEAD,
            window_behind: DEFAULT_WINDOW_BEHIND,
            min_start_index: DEFAULT_MIN_START_INDEX,
            engage_radius: DEFAULT_ENGAGE_RADIUS,
            placement: Placement::default(),
        }
    }
}

impl SchedulerConfig {
    /// Defaults with the windows taken from the path store.
    pub fn for_store(store: &PathStore) -> Self {
        Self::default().with_windows(store.window_behind(), store.window_ahead())
    }

    pub fn with_windows(mut self, behind: usize, ahead: usize) -> Self {
        self.window_behind = behind;
        self.window_ahead = ahead;
        self
    }

    pub fn with_min_start_index(mut self, index: usize) -> Self {
        self.min_start_index = index;
        self
    }

    pub fn with_engage_radius(mut self, radius: f32) -> Self {
        self.engage_radius = radius;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// Content that is currently alive in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEntry {
    pub kind: ContentKind,
    pub handles: Vec<EntityHandle>,
    /// Where the content was spawned.
    pub position: Vec3,
    /// Whether a stationary actor has already reacted to the target.
    pub engaged: bool,
}

/// Running counters for logging and the CLI summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub spawned: u64,
    pub despawned: u64,
    pub collected: u64,
    pub consumed: u64,
    pub spawn_failures: u64,
}

/// Keeps a bounded set of world entities alive around the vehicle.
pub struct WindowedEntityScheduler {
    store: Arc<PathStore>,
    config: SchedulerConfig,
    schedule: Schedule,
    active: BTreeMap<usize, ActiveEntry>,
    rng: StdRng,
    stats: SchedulerStats,
    /// Last known target position, used to orient freshly spawned targets.
    last_target: Option<Vec3>,
}

impl WindowedEntityScheduler {
    pub fn new(store: Arc<PathStore>, config: SchedulerConfig) -> Self {
        Self {
            store,
            config,
            schedule: Schedule::new(),
            active: BTreeMap::new(),
            rng: StdRng::seed_from_u64(0),
            stats: SchedulerStats::default(),
            last_target: None,
        }
    }

    /// Create with windows matching the store and otherwise default settings.
    pub fn with_defaults(store: Arc<PathStore>) -> Self {
        let config = SchedulerConfig::for_store(&store);
        Self::new(store, config)
    }

    /// Generate the schedule and spawn whatever already falls inside the
    /// look-ahead window of `current_index`.
    pub fn start(
        &mut self,
        policy: &SchedulePolicy,
        seed: u64,
        current_index: usize,
        factory: &mut dyn EntityFactory,
    ) {
        self.generate_schedule(policy, seed);
        let spawned = self.catch_up(current_index, factory);

        tracing::info!(
            policy = policy.name(),
            seed,
            scheduled = self.schedule.len() + spawned,
            initial = spawned,
            start_index = current_index,
            "Scenario scheduler started"
        );
    }

    /// Replace the schedule using `policy`, reseeding the generator.
    ///
    /// Indices that already hold live content are left out.
    pub fn generate_schedule(&mut self, policy: &SchedulePolicy, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        let reserved: BTreeSet<usize> = self.active.keys().copied().collect();
        let bounds = ScheduleBounds {
            len: self.store.len(),
            window_ahead: self.config.window_ahead,
            min_start_index: self.config.min_start_index,
        };
        self.schedule = generate_schedule(policy, bounds, &reserved, &mut self.rng);
    }

    /// Spawn every scheduled entry within `(current_index, current_index + ahead]`.
    ///
    /// Runs after a (re)start so content that is already in view appears
    /// immediately instead of waiting for a marker that has been passed.
    /// The entry at `current_index` itself stays scheduled: the vehicle is
    /// already on it. Returns the number of entries taken from the schedule.
    pub fn catch_up(&mut self, current_index: usize, factory: &mut dyn EntityFactory) -> usize {
        let len = self.store.len();
        if current_index >= len {
            return 0;
        }
        let first = current_index + 1;
        let end = current_index + self.config.window_ahead;

        let mut due: Vec<usize> = if first < len {
            self.schedule
                .range(first..=end.min(len - 1))
                .map(|(&index, _)| index)
                .collect()
        } else {
            Vec::new()
        };

        if self.store.is_looped() && end >= len && current_index > 0 {
            let wrapped_end = (end - len).min(current_index - 1);
            due.extend(self.schedule.range(..=wrapped_end).map(|(&index, _)| index));
        }

        for &index in &due {
            if let Some(descriptor) = self.schedule.remove(&index) {
                self.spawn_entry(index, descriptor, factory);
            }
        }

        if !due.is_empty() {
            tracing::debug!(count = due.len(), current_index, "Catch-up spawn pass");
        }
        due.len()
    }

    /// React to the vehicle crossing waypoint `index`.
    pub fn on_marker(
        &mut self,
        index: usize,
        factory: &mut dyn EntityFactory,
        events: &mut dyn SessionEvents,
    ) {
        if let Some(target) = self.look_ahead_index(index) {
            if let Some(descriptor) = self.schedule.remove(&target) {
                self.spawn_entry(target, descriptor, factory);
            }
        }

        let collect_here = self
            .active
            .get(&index)
            .is_some_and(|entry| entry.kind == ContentKind::Collectible);
        if collect_here {
            if let Some(entry) = self.active.remove(&index) {
                self.despawn_entry(&entry, factory);
                self.stats.collected += 1;
                tracing::debug!(index, "Collected");
                events.on_collected(index, entry.kind);
            }
        }

        self.cleanup(index, factory);
    }

    fn look_ahead_index(&self, index: usize) -> Option<usize> {
        let target = index + self.config.window_ahead;
        let len = self.store.len();
        if target < len {
            Some(target)
        } else if self.store.is_looped() && len > 0 {
            Some(target % len)
        } else {
            None
        }
    }

    /// Despawn everything that has fallen behind the window around `index`.
    ///
    /// On open paths this is a range split of the ordered map. On looped
    /// paths the keep window `[index - behind, index + ahead]` is taken
    /// modulo the length and the stale entries are range lookups on either
    /// side of it.
    pub fn cleanup(&mut self, index: usize, factory: &mut dyn EntityFactory) {
        let removed: Vec<ActiveEntry> = if self.store.is_looped() {
            let stale = self.stale_looped(index);
            stale
                .into_iter()
                .filter_map(|k| self.active.remove(&k))
                .collect()
        } else {
            let keep_from = index.saturating_sub(self.config.window_behind);
            let kept = self.active.split_off(&keep_from);
            std::mem::replace(&mut self.active, kept)
                .into_values()
                .collect()
        };

        for entry in &removed {
            self.despawn_entry(entry, factory);
        }
        if !removed.is_empty() {
            tracing::debug!(index, removed = removed.len(), "Cleaned up content behind window");
        }
    }

    /// Active indices outside the cyclic window around `index`.
    ///
    /// ```text
    ///   plain:    [..start) keep [start..=end] (end..]
    ///   wrapping: keep [..=end] (end..start) keep [start..]
    /// ```
    fn stale_looped(&self, index: usize) -> Vec<usize> {
        let len = self.store.len();
        let (behind, ahead) = (self.config.window_behind, self.config.window_ahead);
        if behind + ahead + 1 >= len {
            return Vec::new();
        }
        let index = index % len;
        let start = (index + len - behind) % len;
        let end = (index + ahead) % len;

        if start <= end {
            self.active
                .range(..start)
                .chain(self.active.range(end + 1..))
                .map(|(&k, _)| k)
                .collect()
        } else {
            self.active
                .range(end + 1..start)
                .map(|(&k, _)| k)
                .collect()
        }
    }

    /// Per-frame maintenance: orient targets and let nearby actors engage.
    ///
    /// Never spawns or despawns.
    pub fn tick(
        &mut self,
        target: EntityHandle,
        target_position: Vec3,
        factory: &mut dyn EntityFactory,
    ) {
        self.last_target = Some(target_position);
        let engage_radius_sq = self.config.engage_radius * self.config.engage_radius;

        for (index, entry) in self.active.iter_mut() {
            match entry.kind {
                ContentKind::Collectible => {}
                ContentKind::AimableTarget => {
                    if let Some(heading) = heading_towards(entry.position, target_position) {
                        for &handle in &entry.handles {
                            factory.set_heading(handle, heading);
                        }
                    }
                }
                ContentKind::StationaryActor => {
                    if !entry.engaged
                        && entry.position.distance_squared(target_position) < engage_radius_sq
                    {
                        entry.engaged = true;
                        for &handle in &entry.handles {
                            factory.engage(handle, target);
                        }
                        tracing::debug!(index = *index, "Actor engaged");
                    }
                }
            }
        }
    }

    /// Explicitly consume the content at `index`, despawning it.
    pub fn consume(
        &mut self,
        index: usize,
        factory: &mut dyn EntityFactory,
    ) -> Option<ContentKind> {
        let entry = self.active.remove(&index)?;
        self.despawn_entry(&entry, factory);
        self.stats.consumed += 1;
        Some(entry.kind)
    }

    /// Despawn everything and forget the schedule. Idempotent.
    pub fn stop(&mut self, factory: &mut dyn EntityFactory) {
        let active = std::mem::take(&mut self.active);
        for entry in active.values() {
            self.despawn_entry(entry, factory);
        }
        let dropped = self.schedule.len();
        self.schedule.clear();
        self.last_target = None;

        if !active.is_empty() || dropped > 0 {
            tracing::info!(
                despawned = active.len(),
                unscheduled = dropped,
                "Scenario scheduler stopped"
            );
        }
    }

    fn spawn_entry(
        &mut self,
        index: usize,
        descriptor: ContentDescriptor,
        factory: &mut dyn EntityFactory,
    ) {
        let Some(waypoint) = self.store.waypoint(index) else {
            return;
        };
        let kind = descriptor.kind;
        let position = self
            .config
            .placement
            .position_for(kind, waypoint.position, waypoint.heading);
        let heading = match (kind, self.last_target) {
            (ContentKind::AimableTarget, Some(target)) => {
                heading_towards(position, target).unwrap_or(waypoint.heading)
            }
            _ => waypoint.heading,
        };

        let handles = factory.spawn(kind, position, heading, descriptor.variant);
        if handles.is_empty() {
            self.stats.spawn_failures += 1;
            tracing::warn!(index, kind = %kind, "Spawn failed, dropping scheduled content");
            return;
        }

        tracing::debug!(index, kind = %kind, entities = handles.len(), "Spawned content");
        self.stats.spawned += 1;
        let entry = ActiveEntry {
            kind,
            handles,
            position,
            engaged: false,
        };
        if let Some(previous) = self.active.insert(index, entry) {
            self.despawn_entry(&previous, factory);
        }
    }

    fn despawn_entry(&mut self, entry: &ActiveEntry, factory: &mut dyn EntityFactory) {
        factory.despawn(&entry.handles);
        self.stats.despawned += 1;
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn active(&self) -> &BTreeMap<usize, ActiveEntry> {
        &self.active
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn scheduled_len(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.contains_key(&index)
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}
