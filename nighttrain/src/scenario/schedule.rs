//! Schedule generation policies.
//!
//! A schedule maps path indices to the content that should appear there. It
//! is generated once when a session starts and only shrinks afterwards, as
//! entries are handed over to the active set.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::Rng;

use super::content::{ContentDescriptor, ContentKind};

/// Default first index of the cycle policy.
pub const DEFAULT_FIRST_INDEX: usize = 10;

/// Default distance between cycle placements.
pub const DEFAULT_SPACING: usize = 10;

/// Default highest index the cycle policy places content at.
pub const DEFAULT_MAX_INDEX: usize = 580;

/// Default number of entries for the random policy.
pub const DEFAULT_RANDOM_COUNT: usize = 50;

/// Ordered schedule keyed by path index.
pub type Schedule = BTreeMap<usize, ContentDescriptor>;

/// How content is distributed along the path.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulePolicy {
    /// Every `spacing` indices from `first_index` up to `max_index`,
    /// rotating through `kinds`.
    Cycle {
        first_index: usize,
        spacing: usize,
        max_index: usize,
        kinds: Vec<ContentKind>,
    },
    /// `count` entries of random kind at random indices beyond the
    /// look-ahead window.
    Random { count: usize },
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        SchedulePolicy::Cycle {
            first_index: DEFAULT_FIRST_INDEX,
            spacing: DEFAULT_SPACING,
            max_index: DEFAULT_MAX_INDEX,
            kinds: ContentKind::ALL.to_vec(),
        }
    }
}

impl SchedulePolicy {
    pub fn random(count: usize) -> Self {
        SchedulePolicy::Random { count }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchedulePolicy::Cycle { .. } => "cycle",
            SchedulePolicy::Random { .. } => "random",
        }
    }
}

/// Path facts the generator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleBounds {
    /// Number of waypoints in the path.
    pub len: usize,
    /// Look-ahead window of the scheduler.
    pub window_ahead: usize,
    /// Nothing is scheduled before this index.
    pub min_start_index: usize,
}

/// Build a schedule for `policy`.
///
/// Indices in `reserved` (content already alive) are never scheduled.
/// Model variants are drawn from `rng`, so a fixed seed reproduces the same
/// schedule.
pub fn generate_schedule(
    policy: &SchedulePolicy,
    bounds: ScheduleBounds,
    reserved: &BTreeSet<usize>,
    rng: &mut StdRng,
) -> Schedule {
    let schedule = match policy {
        SchedulePolicy::Cycle {
            first_index,
            spacing,
            max_index,
            kinds,
        } => cycle(
            (*first_index).max(bounds.min_start_index),
            (*spacing).max(1),
            *max_index,
            kinds,
            bounds,
            reserved,
            rng,
        ),
        SchedulePolicy::Random { count } => random(*count, bounds, reserved, rng),
    };

    tracing::debug!(
        policy = policy.name(),
        entries = schedule.len(),
        "Generated schedule"
    );
    schedule
}

fn cycle(
    first: usize,
    spacing: usize,
    max_index: usize,
    kinds: &[ContentKind],
    bounds: ScheduleBounds,
    reserved: &BTreeSet<usize>,
    rng: &mut StdRng,
) -> Schedule {
    let mut schedule = Schedule::new();
    if kinds.is_empty() || bounds.len == 0 {
        return schedule;
    }

    let last = max_index.min(bounds.len - 1);
    for (slot, index) in (first..=last).step_by(spacing).enumerate() {
        if reserved.contains(&index) {
            continue;
        }
        let kind = kinds[slot % kinds.len()];
        schedule.insert(index, descriptor(kind, rng));
    }
    schedule
}

fn random(
    count: usize,
    bounds: ScheduleBounds,
    reserved: &BTreeSet<usize>,
    rng: &mut StdRng,
) -> Schedule {
    let mut schedule = Schedule::new();
    let min = (bounds.window_ahead + 1).max(bounds.min_start_index);

    let mut free: Vec<usize> = (min..bounds.len)
        .filter(|index| !reserved.contains(index))
        .collect();

    let count = count.min(free.len());

    // Partial Fisher-Yates: the first `count` slots end up a uniform sample
    for i in 0..count {
        let j = rng.random_range(i..free.len());
        free.swap(i, j);
        let kind = ContentKind::ALL[rng.random_range(0..ContentKind::ALL.len())];
        schedule.insert(free[i], descriptor(kind, rng));
    }
    schedule
}

fn descriptor(kind: ContentKind, rng: &mut StdRng) -> ContentDescriptor {
    let variant = rng.random_range(0..kind.variant_count().max(1));
    ContentDescriptor::new(kind, variant)
}
