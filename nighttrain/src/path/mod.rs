//! Recorded path storage.
//!
//! Owns the ordered waypoint sequence the train follows, the plain-text file
//! codec shared with the recorder, and the nearest-waypoint query used to
//! (re)locate the vehicle on the path.
//!
//! # Example
//!
//! ```ignore
//! use nighttrain::path::{PathStore, PathStoreConfig};
//!
//! let store = PathStore::load_file("nighttrain/nighttrain_path.txt", PathStoreConfig::default())?;
//! let start = store.nearest_index(engine_position, None);
//! ```

mod error;
mod format;
mod store;
mod waypoint;

pub use error::{PathError, PathResult};
pub use format::{
    format_record, parse_path, parse_record, path_to_string, read_path, write_path, LoadReport,
};
pub use store::{
    PathStore, PathStoreConfig, BAND_SLACK, DEFAULT_WINDOW_AHEAD, DEFAULT_WINDOW_BEHIND,
};
pub use waypoint::{Path, Waypoint};
