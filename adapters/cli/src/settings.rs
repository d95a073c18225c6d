use std::{fs, io, path::Path, path::PathBuf};

use lane_defence_core::{StrategyTuning, UnitPlacement};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file version understood by this build.
pub const SETTINGS_VERSION: u32 = 1;

/// Contents of a skirmish settings file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Format version; must equal [`SETTINGS_VERSION`].
    pub version: u32,
    /// Seed for the match random source, overridden by `--seed`.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of turns to play, overridden by `--turns`.
    #[serde(default)]
    pub turns: Option<u32>,
    /// Strategy thresholds.
    #[serde(default)]
    pub tuning: StrategyTuning,
    /// Starting board of the skirmish.
    #[serde(default)]
    pub scenario: Scenario,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            seed: None,
            turns: None,
            tuning: StrategyTuning::default(),
            scenario: Scenario::default(),
        }
    }
}

/// Starting board of a skirmish against the reference world.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Opponent health pool; the world default when absent.
    pub opponent_health: Option<f32>,
    /// Opponent structures placed before the first turn.
    pub opponent_structures: Vec<UnitPlacement>,
}

/// Failures while loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("failed to read settings from {path}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid settings TOML.
    #[error("malformed settings")]
    Parse(#[from] toml::de::Error),
    /// The file was written for another format version.
    #[error("unsupported settings version {found}, expected {SETTINGS_VERSION}")]
    UnsupportedVersion {
        /// Version declared by the file.
        found: u32,
    },
}

impl Settings {
    /// Reads and validates the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(contents)?;
        if settings.version != SETTINGS_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
            });
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{Position, UnitType};

    #[test]
    fn partial_tuning_keeps_the_defaults() {
        let settings = Settings::from_toml(
            r#"
            version = 1
            seed = 11

            [tuning.rush]
            enemy_health = 12.0
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.seed, Some(11));
        assert_eq!(settings.turns, None);
        assert_eq!(settings.tuning.rush.enemy_health, 12.0);
        assert_eq!(
            settings.tuning.posture,
            StrategyTuning::default().posture
        );
    }

    #[test]
    fn scenario_structures_are_parsed() {
        let settings = Settings::from_toml(
            r#"
            version = 1

            [scenario]
            opponent_health = 8.0

            [[scenario.opponent_structures]]
            unit = "Turret"
            position = { x = 5, y = 17 }
            count = 1
            upgraded = true
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.scenario.opponent_health, Some(8.0));
        assert_eq!(
            settings.scenario.opponent_structures,
            vec![UnitPlacement {
                unit: UnitType::Turret,
                position: Position::new(5, 17),
                count: 1,
                upgraded: true,
            }]
        );
    }

    #[test]
    fn other_versions_are_rejected() {
        let error = Settings::from_toml("version = 2").expect_err("future version");
        assert!(matches!(error, SettingsError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Settings::from_toml("version = 1\nturn = 4").expect_err("typo");
        assert!(matches!(error, SettingsError::Parse(_)));
    }
}
