//! HUD-facing progress with backtrack hysteresis.
//!
//! The tracker's cursor is literal geometric progress and never moves
//! backwards. What the player sees is smoothed here instead: the display
//! keeps the best `(laps, index)` pair seen so far and only adopts a smaller
//! one once the vehicle is more than `backtrack_tolerance` metres away from
//! where the best pair was recorded. Small wobbles at a waypoint boundary
//! never flicker the counter; a genuine relocation (restart further back on
//! the track) is reflected.

use crate::geometry::Vec3;

/// Default distance before a lower progress value is shown.
pub const DEFAULT_BACKTRACK_TOLERANCE: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Best {
    laps: u32,
    index: usize,
    position: Vec3,
}

/// Display-layer progress value for a path of `total` waypoints.
#[derive(Debug, Clone)]
pub struct ProgressDisplay {
    total: usize,
    backtrack_tolerance: f32,
    best: Option<Best>,
}

impl ProgressDisplay {
    pub fn new(total: usize, backtrack_tolerance: f32) -> Self {
        Self {
            total,
            backtrack_tolerance,
            best: None,
        }
    }

    pub fn with_defaults(total: usize) -> Self {
        Self::new(total, DEFAULT_BACKTRACK_TOLERANCE)
    }

    /// Offer a new progress sample. Returns true if it was adopted.
    pub fn observe(&mut self, laps: u32, index: usize, position: Vec3) -> bool {
        let candidate = Best {
            laps,
            index,
            position,
        };

        let adopt = match self.best {
            None => true,
            Some(best) if (laps, index) >= (best.laps, best.index) => true,
            Some(best) => best.position.distance(position) > self.backtrack_tolerance,
        };

        if adopt {
            if let Some(best) = self.best {
                if (laps, index) < (best.laps, best.index) {
                    tracing::debug!(
                        from = best.index,
                        to = index,
                        "Display progress moved back after relocation"
                    );
                }
            }
            self.best = Some(candidate);
        }
        adopt
    }

    /// Displayed waypoint index, if any sample has been observed.
    pub fn index(&self) -> Option<usize> {
        self.best.map(|b| b.index)
    }

    pub fn laps(&self) -> u32 {
        self.best.map_or(0, |b| b.laps)
    }

    /// Number of waypoints shown as reached, `1..=total`.
    pub fn reached(&self) -> usize {
        self.best.map_or(0, |b| (b.index + 1).min(self.total))
    }

    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.reached() as f32 / self.total as f32 * 100.0
    }

    /// HUD line, e.g. `"42/580  (7.2%)"` or `"12/580  (2.1%)  lap 1"`.
    pub fn text(&self) -> String {
        let mut text = format!("{}/{}  ({:.1}%)", self.reached(), self.total, self.percent());
        let laps = self.laps();
        if laps > 0 {
            text.push_str(&format!("  lap {}", laps));
        }
        text
    }

    pub fn reset(&mut self) {
        self.best = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_forward_progress_adopted() {
        let mut display = ProgressDisplay::with_defaults(100);
        assert!(display.observe(0, 3, at(30.0)));
        assert!(display.observe(0, 4, at(40.0)));
        assert_eq!(display.index(), Some(4));
    }

    #[test]
    fn test_small_regression_ignored() {
        let mut display = ProgressDisplay::with_defaults(100);
        display.observe(0, 10, at(100.0));

        assert!(!display.observe(0, 9, at(95.0)));
        assert_eq!(display.index(), Some(10));
    }

    #[test]
    fn test_large_regression_adopted() {
        let mut display = ProgressDisplay::with_defaults(100);
        display.observe(0, 10, at(100.0));

        assert!(display.observe(0, 2, at(20.0)));
        assert_eq!(display.index(), Some(2));
    }

    #[test]
    fn test_new_lap_outranks_higher_index() {
        let mut display = ProgressDisplay::with_defaults(100);
        display.observe(0, 99, at(990.0));

        assert!(display.observe(1, 0, at(995.0)));
        assert_eq!(display.laps(), 1);
        assert_eq!(display.index(), Some(0));
    }

    #[test]
    fn test_text_format() {
        let mut display = ProgressDisplay::with_defaults(580);
        assert_eq!(display.text(), "0/580  (0.0%)");

        display.observe(0, 41, at(0.0));
        assert_eq!(display.text(), "42/580  (7.2%)");

        display.observe(1, 11, at(0.0));
        assert_eq!(display.text(), "12/580  (2.1%)  lap 1");
    }

    #[test]
    fn test_reached_caps_at_total() {
        let mut display = ProgressDisplay::with_defaults(3);
        display.observe(0, 2, at(0.0));
        assert_eq!(display.reached(), 3);
        assert_eq!(display.text(), "3/3  (100.0%)");
    }

    #[test]
    fn test_reset_clears() {
        let mut display = ProgressDisplay::with_defaults(10);
        display.observe(0, 5, at(0.0));
        display.reset();
        assert_eq!(display.index(), None);
        assert!(display.observe(0, 1, at(0.0)));
    }
}
