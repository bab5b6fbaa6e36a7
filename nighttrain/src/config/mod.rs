//! Configuration file support.
//!
//! Settings live in an INI file, by default
//! `~/.config/nighttrain/config.ini` (the platform config directory):
//!
//! ```ini
//! [general]
//! path_file = nighttrain_path.txt
//! seed = 66642069
//! looped = true
//!
//! [window]
//! ahead = 30
//! behind = 10
//!
//! [progress]
//! point_epsilon = 0.25
//! backtrack_tolerance = 25
//!
//! [scenario]
//! policy = cycle
//! first_index = 10
//! spacing = 10
//! max_index = 580
//! kinds = collectible,stationary_actor,aimable_target
//! count = 50
//! min_start_index = 10
//! engage_radius = 5
//!
//! [placement]
//! track_z_offset = 0.5
//! target_side_offset = 10
//! target_up_offset = 10
//! ```
//!
//! A missing file or key falls back to the defaults above. A value that
//! cannot be parsed is an error naming the offending key.

mod error;
mod file;
mod keys;

use std::path::PathBuf;

pub use error::ConfigError;
pub use file::{
    ConfigFile, GeneralSettings, PolicyKind, ProgressSettings, ScenarioSettings, WindowSettings,
};
pub use keys::ConfigKey;

/// Default path file name, relative to the config directory.
pub const DEFAULT_PATH_FILE: &str = "nighttrain_path.txt";

/// Directory holding `config.ini` and, by default, the path file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nighttrain")
}

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with("nighttrain/config.ini"));
    }
}
