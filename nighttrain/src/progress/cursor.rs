//! Progress cursor value type.

/// Largest fraction the cursor reports while between two waypoints.
pub(crate) const FRACTION_CEILING: f32 = 1.0 - f32::EPSILON;

/// Position of the tracked vehicle expressed in path terms.
///
/// The vehicle sits `fraction` of the way along the segment from
/// `previous_index` to `next_index`. `next_index` is always the waypoint
/// after `previous_index`, wrapping to 0 on looped paths and clamped to the
/// last waypoint on open paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressCursor {
    /// Last waypoint confirmed as reached.
    pub previous_index: usize,
    /// Waypoint currently being approached.
    pub next_index: usize,
    /// Position along the current segment, `0 <= fraction < 1`.
    pub fraction: f32,
    /// Completed laps (looped paths only).
    pub laps_completed: u32,
}

impl ProgressCursor {
    /// Cursor on the first segment.
    pub fn start() -> Self {
        Self {
            previous_index: 0,
            next_index: 1,
            fraction: 0.0,
            laps_completed: 0,
        }
    }

    /// Cursor at the start of the segment leaving `previous_index`.
    ///
    /// `previous_index` is clamped so the segment exists: on open paths the
    /// last segment starts at `len - 2`.
    pub fn on_segment(previous_index: usize, len: usize, looped: bool) -> Self {
        debug_assert!(len >= 2);
        let (previous_index, next_index) = if looped {
            let prev = previous_index % len;
            (prev, (prev + 1) % len)
        } else {
            let prev = previous_index.min(len - 2);
            (prev, prev + 1)
        };

        Self {
            previous_index,
            next_index,
            fraction: 0.0,
            laps_completed: 0,
        }
    }
}

impl Default for ProgressCursor {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_cursor() {
        let c = ProgressCursor::start();
        assert_eq!((c.previous_index, c.next_index), (0, 1));
        assert_eq!(c.fraction, 0.0);
        assert_eq!(c.laps_completed, 0);
    }

    #[test]
    fn test_on_segment_open_clamps_to_last_segment() {
        let c = ProgressCursor::on_segment(9, 10, false);
        assert_eq!((c.previous_index, c.next_index), (8, 9));

        let c = ProgressCursor::on_segment(3, 10, false);
        assert_eq!((c.previous_index, c.next_index), (3, 4));
    }

    #[test]
    fn test_on_segment_looped_wraps() {
        let c = ProgressCursor::on_segment(9, 10, true);
        assert_eq!((c.previous_index, c.next_index), (9, 0));

        let c = ProgressCursor::on_segment(12, 10, true);
        assert_eq!((c.previous_index, c.next_index), (2, 3));
    }
}
