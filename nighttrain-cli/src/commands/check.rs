//! Check command - load a path file and report on its shape.

use std::path::PathBuf;

use clap::Args;
use nighttrain::path::PathStore;
use serde::Serialize;

use super::common::ConfigLocation;
use crate::error::CliError;

/// Segments shorter than this are reported as degenerate.
const DEGENERATE_SEGMENT: f32 = 1e-3;

/// Arguments for `nighttrain check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path file to check (defaults to general.path_file from the config)
    pub path: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Shape summary of a loaded path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub points: usize,
    pub skipped_lines: usize,
    pub open_length: f32,
    pub looped_length: f32,
    pub min_segment: f32,
    pub max_segment: f32,
    pub degenerate_segments: usize,
    pub closing_gap: f32,
}

impl PathReport {
    pub fn from_store(store: &PathStore) -> Self {
        let load = store.load_report();
        let path = store.path();

        let mut min_segment = f32::INFINITY;
        let mut max_segment = 0.0f32;
        let mut degenerate_segments = 0;
        for i in 0..store.len().saturating_sub(1) {
            let length = store.segment_length(i);
            min_segment = min_segment.min(length);
            max_segment = max_segment.max(length);
            if length < DEGENERATE_SEGMENT {
                degenerate_segments += 1;
            }
        }
        if !min_segment.is_finite() {
            min_segment = 0.0;
        }

        Self {
            file: None,
            points: store.len(),
            skipped_lines: load.skipped_lines,
            open_length: path.total_length(false),
            looped_length: path.total_length(true),
            min_segment,
            max_segment,
            degenerate_segments,
            closing_gap: store.position(0).distance(store.position(store.last_index())),
        }
    }

    pub fn with_file(mut self, file: &std::path::Path) -> Self {
        self.file = Some(file.display().to_string());
        self
    }
}

/// Run the check command.
pub fn run(args: CheckArgs, location: &ConfigLocation) -> Result<(), CliError> {
    let config = location.load()?;
    let file = match args.path {
        Some(path) => path,
        None => config.resolve_path_file(location.base_dir()),
    };

    let store = PathStore::load_file(&file, config.path_store_config())?;
    let report = PathReport::from_store(&store).with_file(&file);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Path file: {}", file.display());
    println!();
    println!("  Waypoints:           {}", report.points);
    println!("  Skipped lines:       {}", report.skipped_lines);
    println!("  Length (open):       {:.1} m", report.open_length);
    println!("  Length (looped):     {:.1} m", report.looped_length);
    println!(
        "  Segment length:      {:.2} - {:.2} m",
        report.min_segment, report.max_segment
    );
    println!("  Degenerate segments: {}", report.degenerate_segments);
    println!("  Closing gap:         {:.1} m", report.closing_gap);

    if report.points < 2 {
        println!();
        println!("Warning: a path needs at least 2 waypoints to be driven.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nighttrain::path::PathStoreConfig;

    fn load(text: &str) -> PathStore {
        PathStore::load(text.as_bytes(), PathStoreConfig::default()).unwrap()
    }

    #[test]
    fn test_report_on_l_shape() {
        let store = load("0 0 0 0\n3 0 0 0\nnot a record\n3 4 0 0\n3 4 0 0\n");
        let report = PathReport::from_store(&store);

        assert_eq!(report.points, 4);
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(report.open_length, 7.0);
        assert_eq!(report.looped_length, 12.0);
        assert_eq!(report.min_segment, 0.0);
        assert_eq!(report.max_segment, 4.0);
        assert_eq!(report.degenerate_segments, 1);
        assert_eq!(report.closing_gap, 5.0);
    }

    #[test]
    fn test_report_on_single_point() {
        let store = load("1 2 3 90\n");
        let report = PathReport::from_store(&store);
        assert_eq!(report.points, 1);
        assert_eq!(report.min_segment, 0.0);
        assert_eq!(report.max_segment, 0.0);
        assert_eq!(report.closing_gap, 0.0);
    }

    #[test]
    fn test_report_serializes_every_field() {
        let store = load("0 0 0 0
3 0 0 0
3 4 0 0
");
        let report = PathReport::from_store(&store);

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("file").is_none());
        assert_eq!(value["points"], 3);
        assert_eq!(value["skipped_lines"], 0);
        assert_eq!(value["open_length"], 7.0);
        assert_eq!(value["looped_length"], 12.0);
        assert_eq!(value["degenerate_segments"], 0);
        assert_eq!(value["closing_gap"], 5.0);

        let named = report.with_file(std::path::Path::new("route.txt"));
        let value = serde_json::to_value(&named).unwrap();
        assert_eq!(value["file"], "route.txt");
        assert_eq!(value.as_object().unwrap().len(), 9);
    }
}
