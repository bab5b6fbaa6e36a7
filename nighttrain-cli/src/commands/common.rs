//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use nighttrain::config::{config_file_path, ConfigFile};
use nighttrain::scenario::SchedulePolicy;

use crate::error::CliError;

/// Schedule policy selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PolicyArg {
    /// Fixed spacing, cycling through content kinds
    Cycle,
    /// Seeded random indices beyond the start window
    Random,
}

impl PolicyArg {
    /// Build the policy, taking cycle parameters and the random count from
    /// the config file.
    pub fn to_policy(self, config: &ConfigFile) -> SchedulePolicy {
        match self {
            PolicyArg::Cycle => SchedulePolicy::Cycle {
                first_index: config.scenario.first_index,
                spacing: config.scenario.spacing,
                max_index: config.scenario.max_index,
                kinds: config.scenario.kinds.clone(),
            },
            PolicyArg::Random => SchedulePolicy::random(config.scenario.count),
        }
    }
}

/// Where the configuration comes from.
#[derive(Debug, Clone)]
pub struct ConfigLocation {
    pub file: PathBuf,
}

impl ConfigLocation {
    /// Use `--config` if given, otherwise the platform default.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            file: explicit.unwrap_or_else(config_file_path),
        }
    }

    /// Directory relative path files are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Load the config file, falling back to defaults when it is missing.
    pub fn load(&self) -> Result<ConfigFile, CliError> {
        Ok(ConfigFile::load_from(&self.file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_location() {
        let location = ConfigLocation::new(Some(PathBuf::from("/tmp/nt/config.ini")));
        assert_eq!(location.base_dir(), Path::new("/tmp/nt"));
    }

    #[test]
    fn test_bare_file_name_resolves_to_cwd() {
        let location = ConfigLocation::new(Some(PathBuf::from("config.ini")));
        assert_eq!(location.base_dir(), Path::new("."));
    }

    #[test]
    fn test_policy_arg_uses_config_count() {
        let mut config = ConfigFile::default();
        config.scenario.count = 7;
        assert_eq!(
            PolicyArg::Random.to_policy(&config),
            SchedulePolicy::random(7)
        );
        assert_eq!(PolicyArg::Cycle.to_policy(&config), config.schedule_policy());
    }
}
