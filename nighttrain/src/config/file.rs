//! The `config.ini` file and its mapping onto component configs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::path::{PathStoreConfig, DEFAULT_WINDOW_AHEAD, DEFAULT_WINDOW_BEHIND};
use crate::progress::{TrackerConfig, DEFAULT_BACKTRACK_TOLERANCE, DEFAULT_POINT_EPSILON};
use crate::scenario::{
    ContentKind, Placement, SchedulePolicy, SchedulerConfig, DEFAULT_ENGAGE_RADIUS,
    DEFAULT_FIRST_INDEX, DEFAULT_MAX_INDEX, DEFAULT_MIN_START_INDEX, DEFAULT_RANDOM_COUNT,
    DEFAULT_SPACING,
};
use crate::session::{SessionConfig, DEFAULT_SEED};

use super::error::ConfigError;
use super::keys::ConfigKey;
use super::{config_file_path, DEFAULT_PATH_FILE};

/// `[general]`
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralSettings {
    /// Path file; relative paths resolve against the config directory.
    pub path_file: String,
    pub seed: u64,
    pub looped: bool,
}

/// `[window]`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub ahead: usize,
    pub behind: usize,
}

/// `[progress]`
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSettings {
    pub point_epsilon: f32,
    pub backtrack_tolerance: f32,
}

/// Which schedule generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Cycle,
    Random,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Cycle => write!(f, "cycle"),
            PolicyKind::Random => write!(f, "random"),
        }
    }
}

/// `[scenario]`
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSettings {
    pub policy: PolicyKind,
    pub first_index: usize,
    pub spacing: usize,
    pub max_index: usize,
    pub kinds: Vec<ContentKind>,
    pub count: usize,
    pub min_start_index: usize,
    pub engage_radius: f32,
}

/// Contents of `config.ini`. Missing sections and keys keep their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub general: GeneralSettings,
    pub window: WindowSettings,
    pub progress: ProgressSettings,
    pub scenario: ScenarioSettings,
    /// `[placement]`
    pub placement: Placement,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            general: GeneralSettings {
                path_file: DEFAULT_PATH_FILE.to_string(),
                seed: DEFAULT_SEED,
                looped: true,
            },
            window: WindowSettings {
                ahead: DEFAULT_WINDOW_AHEAD,
                behind: DEFAULT_WINDOW_BEHIND,
            },
            progress: ProgressSettings {
                point_epsilon: DEFAULT_POINT_EPSILON,
                backtrack_tolerance: DEFAULT_BACKTRACK_TOLERANCE,
            },
            scenario: ScenarioSettings {
                policy: PolicyKind::Cycle,
                first_index: DEFAULT_FIRST_INDEX,
                spacing: DEFAULT_SPACING,
                max_index: DEFAULT_MAX_INDEX,
                kinds: ContentKind::ALL.to_vec(),
                count: DEFAULT_RANDOM_COUNT,
                min_start_index: DEFAULT_MIN_START_INDEX,
                engage_radius: DEFAULT_ENGAGE_RADIUS,
            },
            placement: Placement::default(),
        }
    }
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_file_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }

        for (section, properties) in ini.iter() {
            let Some(section) = section else { continue };
            for (name, _) in properties.iter() {
                let full = format!("{}.{}", section, name);
                if full.parse::<ConfigKey>().is_err() {
                    tracing::warn!(key = %full, "Ignoring unknown config key");
                }
            }
        }

        Ok(config)
    }

    /// Render as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }

        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = ini.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, self.to_ini_string()).map_err(io_error)?;

        tracing::info!(path = %path.display(), "Saved config file");
        Ok(())
    }

    /// Path file location, resolved against `base_dir` when relative.
    pub fn resolve_path_file(&self, base_dir: &Path) -> PathBuf {
        let file = PathBuf::from(&self.general.path_file);
        if file.is_absolute() {
            file
        } else {
            base_dir.join(file)
        }
    }

    pub fn path_store_config(&self) -> PathStoreConfig {
        PathStoreConfig::default()
            .with_windows(self.window.behind, self.window.ahead)
            .with_looped(self.general.looped)
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            point_epsilon: self.progress.point_epsilon,
        }
    }

    pub fn schedule_policy(&self) -> SchedulePolicy {
        match self.scenario.policy {
            PolicyKind::Cycle => SchedulePolicy::Cycle {
                first_index: self.scenario.first_index,
                spacing: self.scenario.spacing,
                max_index: self.scenario.max_index,
                kinds: self.scenario.kinds.clone(),
            },
            PolicyKind::Random => SchedulePolicy::random(self.scenario.count),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_windows(self.window.behind, self.window.ahead)
            .with_min_start_index(self.scenario.min_start_index)
            .with_engage_radius(self.scenario.engage_radius)
            .with_placement(self.placement.clone())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tracker: self.tracker_config(),
            scheduler: self.scheduler_config(),
            policy: self.schedule_policy(),
            seed: self.general.seed,
            backtrack_tolerance: self.progress.backtrack_tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(dir.path().join("nope.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ConfigFile::parse("[window]\nahead = 50\n").unwrap();
        assert_eq!(config.window.ahead, 50);
        assert_eq!(config.window.behind, DEFAULT_WINDOW_BEHIND);
        assert_eq!(config.general.seed, DEFAULT_SEED);
    }

    #[test]
    fn test_full_file() {
        let text = "\
[general]
path_file = /tmp/track.txt
seed = 7
looped = false

[scenario]
policy = random
count = 12
engage_radius = 2.5

[placement]
target_side_offset = 4
";
        let config = ConfigFile::parse(text).unwrap();

        assert!(!config.general.looped);
        assert_eq!(config.schedule_policy(), SchedulePolicy::random(12));
        assert!(!config.path_store_config().looped);

        let session = config.session_config();
        assert_eq!(session.seed, 7);
        assert_eq!(session.scheduler.engage_radius, 2.5);
        assert_eq!(session.scheduler.placement.target_side_offset, 4.0);
        assert_eq!(
            config.resolve_path_file(Path::new("/etc")),
            PathBuf::from("/tmp/track.txt")
        );
    }

    #[test]
    fn test_invalid_value_reports_key() {
        let err = ConfigFile::parse("[window]\nbehind = many\n").unwrap_err();
        match err {
            ConfigError::InvalidValue {
                section,
                key,
                value,
            } => {
                assert_eq!(section, "window");
                assert_eq!(key, "behind");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.ini");

        let mut config = ConfigFile::default();
        config.general.seed = 1234;
        config.window.ahead = 25;
        config.scenario.kinds = vec![ContentKind::AimableTarget];
        config.progress.point_epsilon = 0.1;
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_relative_path_file_resolves_against_base() {
        let config = ConfigFile::default();
        assert_eq!(
            config.resolve_path_file(Path::new("/home/me/.config/nighttrain")),
            PathBuf::from("/home/me/.config/nighttrain/nighttrain_path.txt")
        );
    }
}
