//! Typed access to individual configuration keys.
//!
//! Every setting in `config.ini` has a [`ConfigKey`]. Loading, saving and
//! the CLI's `config get/set` all go through the same key table, so a key
//! only has to be described once.

use std::fmt;
use std::str::FromStr;

use crate::scenario::ContentKind;

use super::error::ConfigError;
use super::file::{ConfigFile, PolicyKind};

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    GeneralPathFile,
    GeneralSeed,
    GeneralLooped,
    WindowAhead,
    WindowBehind,
    ProgressPointEpsilon,
    ProgressBacktrackTolerance,
    ScenarioPolicy,
    ScenarioFirstIndex,
    ScenarioSpacing,
    ScenarioMaxIndex,
    ScenarioKinds,
    ScenarioCount,
    ScenarioMinStartIndex,
    ScenarioEngageRadius,
    PlacementTrackZOffset,
    PlacementTargetSideOffset,
    PlacementTargetUpOffset,
}

impl ConfigKey {
    /// All keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            GeneralPathFile,
            GeneralSeed,
            GeneralLooped,
            WindowAhead,
            WindowBehind,
            ProgressPointEpsilon,
            ProgressBacktrackTolerance,
            ScenarioPolicy,
            ScenarioFirstIndex,
            ScenarioSpacing,
            ScenarioMaxIndex,
            ScenarioKinds,
            ScenarioCount,
            ScenarioMinStartIndex,
            ScenarioEngageRadius,
            PlacementTrackZOffset,
            PlacementTargetSideOffset,
            PlacementTargetUpOffset,
        ]
    }

    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            GeneralPathFile | GeneralSeed | GeneralLooped => "general",
            WindowAhead | WindowBehind => "window",
            ProgressPointEpsilon | ProgressBacktrackTolerance => "progress",
            ScenarioPolicy | ScenarioFirstIndex | ScenarioSpacing | ScenarioMaxIndex
            | ScenarioKinds | ScenarioCount | ScenarioMinStartIndex | ScenarioEngageRadius => {
                "scenario"
            }
            PlacementTrackZOffset | PlacementTargetSideOffset | PlacementTargetUpOffset => {
                "placement"
            }
        }
    }

    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            GeneralPathFile => "path_file",
            GeneralSeed => "seed",
            GeneralLooped => "looped",
            WindowAhead => "ahead",
            WindowBehind => "behind",
            ProgressPointEpsilon => "point_epsilon",
            ProgressBacktrackTolerance => "backtrack_tolerance",
            ScenarioPolicy => "policy",
            ScenarioFirstIndex => "first_index",
            ScenarioSpacing => "spacing",
            ScenarioMaxIndex => "max_index",
            ScenarioKinds => "kinds",
            ScenarioCount => "count",
            ScenarioMinStartIndex => "min_start_index",
            ScenarioEngageRadius => "engage_radius",
            PlacementTrackZOffset => "track_z_offset",
            PlacementTargetSideOffset => "target_side_offset",
            PlacementTargetUpOffset => "target_up_offset",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it is written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            GeneralPathFile => config.general.path_file.clone(),
            GeneralSeed => config.general.seed.to_string(),
            GeneralLooped => config.general.looped.to_string(),
            WindowAhead => config.window.ahead.to_string(),
            WindowBehind => config.window.behind.to_string(),
            ProgressPointEpsilon => config.progress.point_epsilon.to_string(),
            ProgressBacktrackTolerance => config.progress.backtrack_tolerance.to_string(),
            ScenarioPolicy => config.scenario.policy.to_string(),
            ScenarioFirstIndex => config.scenario.first_index.to_string(),
            ScenarioSpacing => config.scenario.spacing.to_string(),
            ScenarioMaxIndex => config.scenario.max_index.to_string(),
            ScenarioKinds => config
                .scenario
                .kinds
                .iter()
                .map(ContentKind::name)
                .collect::<Vec<_>>()
                .join(","),
            ScenarioCount => config.scenario.count.to_string(),
            ScenarioMinStartIndex => config.scenario.min_start_index.to_string(),
            ScenarioEngageRadius => config.scenario.engage_radius.to_string(),
            PlacementTrackZOffset => config.placement.track_z_offset.to_string(),
            PlacementTargetSideOffset => config.placement.target_side_offset.to_string(),
            PlacementTargetUpOffset => config.placement.target_up_offset.to_string(),
        }
    }

    /// Parse and store `value`. The config is unchanged on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            GeneralPathFile => {
                if value.is_empty() {
                    return Err(self.invalid(value));
                }
                config.general.path_file = value.to_string();
            }
            GeneralSeed => config.general.seed = self.parse(value)?,
            GeneralLooped => config.general.looped = self.parse_bool(value)?,
            WindowAhead => config.window.ahead = self.parse_positive(value)?,
            WindowBehind => config.window.behind = self.parse(value)?,
            ProgressPointEpsilon => config.progress.point_epsilon = self.parse_distance(value)?,
            ProgressBacktrackTolerance => {
                config.progress.backtrack_tolerance = self.parse_distance(value)?
            }
            ScenarioPolicy => config.scenario.policy = self.parse(value)?,
            ScenarioFirstIndex => config.scenario.first_index = self.parse(value)?,
            ScenarioSpacing => config.scenario.spacing = self.parse_positive(value)?,
            ScenarioMaxIndex => config.scenario.max_index = self.parse(value)?,
            ScenarioKinds => config.scenario.kinds = self.parse_kinds(value)?,
            ScenarioCount => config.scenario.count = self.parse(value)?,
            ScenarioMinStartIndex => config.scenario.min_start_index = self.parse(value)?,
            ScenarioEngageRadius => config.scenario.engage_radius = self.parse_distance(value)?,
            PlacementTrackZOffset => config.placement.track_z_offset = self.parse_finite(value)?,
            PlacementTargetSideOffset => {
                config.placement.target_side_offset = self.parse_finite(value)?
            }
            PlacementTargetUpOffset => {
                config.placement.target_up_offset = self.parse_finite(value)?
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str) -> ConfigError {
        ConfigError::invalid(self.section(), self.key_name(), value)
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value.parse().map_err(|_| self.invalid(value))
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value)),
        }
    }

    fn parse_positive(&self, value: &str) -> Result<usize, ConfigError> {
        match self.parse::<usize>(value)? {
            0 => Err(self.invalid(value)),
            n => Ok(n),
        }
    }

    fn parse_finite(&self, value: &str) -> Result<f32, ConfigError> {
        let v: f32 = self.parse(value)?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(self.invalid(value))
        }
    }

    fn parse_distance(&self, value: &str) -> Result<f32, ConfigError> {
        let v = self.parse_finite(value)?;
        if v >= 0.0 {
            Ok(v)
        } else {
            Err(self.invalid(value))
        }
    }

    fn parse_kinds(&self, value: &str) -> Result<Vec<ContentKind>, ConfigError> {
        let kinds = value
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<ContentKind>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| self.invalid(value))?;
        if kinds.is_empty() {
            return Err(self.invalid(value));
        }
        Ok(kinds)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl FromStr for PolicyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(PolicyKind::Cycle),
            "random" => Ok(PolicyKind::Random),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_round_trips_through_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "window.sideways".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::WindowAhead.set(&mut config, " 45 ").unwrap();
        assert_eq!(ConfigKey::WindowAhead.get(&config), "45");

        ConfigKey::GeneralLooped.set(&mut config, "no").unwrap();
        assert!(!config.general.looped);

        ConfigKey::ScenarioKinds
            .set(&mut config, "target, pickup")
            .unwrap();
        assert_eq!(
            ConfigKey::ScenarioKinds.get(&config),
            "aimable_target,collectible"
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = ConfigFile::default();
        let cases = [
            (ConfigKey::WindowAhead, "0"),
            (ConfigKey::WindowAhead, "-3"),
            (ConfigKey::GeneralSeed, "abc"),
            (ConfigKey::GeneralLooped, "maybe"),
            (ConfigKey::ProgressPointEpsilon, "-0.5"),
            (ConfigKey::PlacementTrackZOffset, "NaN"),
            (ConfigKey::ScenarioPolicy, "sometimes"),
            (ConfigKey::ScenarioKinds, "boat"),
            (ConfigKey::ScenarioKinds, ""),
            (ConfigKey::ScenarioSpacing, "0"),
        ];

        for (key, value) in cases {
            match key.set(&mut config, value) {
                Err(ConfigError::InvalidValue { section, key: k, .. }) => {
                    assert_eq!(section, key.section());
                    assert_eq!(k, key.key_name());
                }
                other => panic!("{} = {:?} gave {:?}", key, value, other),
            }
        }
        assert_eq!(config, ConfigFile::default());
    }
}
