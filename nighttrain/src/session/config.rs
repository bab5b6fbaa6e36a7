//! Session configuration.

use crate::progress::{TrackerConfig, DEFAULT_BACKTRACK_TOLERANCE};
use crate::scenario::{SchedulePolicy, SchedulerConfig};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 66642069;

/// Everything a [`Session`](super::Session) needs besides the path itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub tracker: TrackerConfig,
    pub scheduler: SchedulerConfig,
    pub policy: SchedulePolicy,
    /// Seed for schedule generation and model variants.
    pub seed: u64,
    /// Distance before the displayed progress may move backwards.
    pub backtrack_tolerance: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            scheduler: SchedulerConfig::default(),
            policy: SchedulePolicy::default(),
            seed: DEFAULT_SEED,
            backtrack_tolerance: DEFAULT_BACKTRACK_TOLERANCE,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }
}
