//! Plain-text path file codec.
//!
//! One record per line, four whitespace-separated numbers:
//!
//! ```text
//! 926.74 6436.79 32.12 265.6
//! 921.03 6436.41 32.09 265.2
//! ```
//!
//! Fields are `x y z heading` in world units and compass degrees. Numbers use
//! a locale-invariant decimal format (Rust's `f32` parser is never locale
//! aware). There is no header. The recorder, this crate and the offline
//! viewer all share this layout.
//!
//! A line whose first four fields are not all finite numbers is skipped
//! rather than failing the whole load; recorded files occasionally contain a
//! truncated final line.

use std::io::{self, BufRead, Write};

use super::error::PathResult;
use super::waypoint::{Path, Waypoint};

/// Summary of a load, for logging and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Number of waypoints accepted.
    pub points: usize,
    /// Number of non-blank lines that were skipped as malformed.
    pub skipped_lines: usize,
}

/// Parse a single record line.
///
/// Returns `None` for malformed lines. Extra trailing fields are ignored.
pub fn parse_record(line: &str) -> Option<Waypoint> {
    let mut fields = line.split_whitespace().map(|f| f.parse::<f32>().ok());

    let mut next = || fields.next().flatten().filter(|v| v.is_finite());
    let x = next()?;
    let y = next()?;
    let z = next()?;
    let heading = next()?;

    Some(Waypoint::from_xyzh(x, y, z, heading))
}

/// Parse a whole path file held in memory.
pub fn parse_path(text: &str) -> PathResult<(Path, LoadReport)> {
    collect(text.lines().map(|line| Ok(line.to_string())))
}

/// Parse a path from any buffered reader.
pub fn read_path<R: BufRead>(reader: R) -> PathResult<(Path, LoadReport)> {
    collect(reader.lines())
}

fn collect<I>(lines: I) -> PathResult<(Path, LoadReport)>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut waypoints = Vec::new();
    let mut report = LoadReport::default();

    for (line_no, line) in lines.enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_record(trimmed) {
            Some(wp) => waypoints.push(wp),
            None => {
                report.skipped_lines += 1;
                tracing::debug!(
                    line = line_no + 1,
                    content = trimmed,
                    "Skipping malformed path record"
                );
            }
        }
    }

    report.points = waypoints.len();
    let path = Path::new(waypoints)?;
    Ok((path, report))
}

/// Format one waypoint as a record line (without newline).
///
/// Uses Rust's shortest round-trip float formatting so that writing and
/// re-reading a path is lossless.
pub fn format_record(wp: &Waypoint) -> String {
    format!(
        "{} {} {} {}",
        wp.position.x, wp.position.y, wp.position.z, wp.heading
    )
}

/// Write a path in the record format.
pub fn write_path<W: Write>(path: &Path, mut writer: W) -> io::Result<()> {
    for wp in path.iter() {
        writeln!(writer, "{}", format_record(wp))?;
    }
    writer.flush()
}

/// Convenience: render a path to a string.
pub fn path_to_string(path: &Path) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_path(path, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::path::PathError;

    #[test]
    fn test_parse_record_basic() {
        let wp = parse_record("926.74 6436.79 32.12 265.6").unwrap();
        assert_eq!(wp.position, Vec3::new(926.74, 6436.79, 32.12));
        assert!((wp.heading - 265.6).abs() < 1e-4);
    }

    #[test]
    fn test_parse_record_extra_whitespace_and_fields() {
        let wp = parse_record("  1  2\t3   4 extra").unwrap();
        assert_eq!(wp.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((wp.heading - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_record_rejects_short_and_garbage() {
        assert!(parse_record("1 2 3").is_none());
        assert!(parse_record("1 2 three 4").is_none());
        assert!(parse_record("1,5 2 3 4").is_none());
        assert!(parse_record("NaN 2 3 4").is_none());
        assert!(parse_record("inf 2 3 4").is_none());
    }

    #[test]
    fn test_parse_path_skips_malformed_lines() {
        let text = "0 0 0 0\n\nbad line\n10 0 0 90\n1 2\n20 0 0 90\n";
        let (path, report) = parse_path(text).unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(report.points, 3);
        assert_eq!(report.skipped_lines, 2);
    }

    #[test]
    fn test_parse_path_empty_is_error() {
        assert!(matches!(parse_path(""), Err(PathError::EmptyPath)));
        assert!(matches!(parse_path("garbage\nmore"), Err(PathError::EmptyPath)));
    }

    #[test]
    fn test_heading_normalized_on_load() {
        let (path, _) = parse_path("0 0 0 450\n").unwrap();
        assert!((path.waypoints()[0].heading - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_write_then_read_preserves_waypoints() {
        let original = Path::new(vec![
            Waypoint::from_xyzh(926.74, 6436.79, 32.12, 265.6),
            Waypoint::from_xyzh(-0.1, 1.0e-7, 123456.78, 0.0),
            Waypoint::from_xyzh(1.0 / 3.0, 2.0 / 3.0, -5.5, 359.99),
        ])
        .unwrap();

        let text = path_to_string(&original);
        let (reloaded, report) = read_path(text.as_bytes()).unwrap();

        assert_eq!(report.skipped_lines, 0);
        assert_eq!(reloaded, original);
    }
}
