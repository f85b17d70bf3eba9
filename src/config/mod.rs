//! Runtime tuning knobs, read from a RON file at startup.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::GameError;

pub const DEFAULT_CONFIG_PATH: &str = "clickdex.ron";
pub const CONFIG_PATH_ENV: &str = "CLICKDEX_CONFIG";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_period_ms: u64,
    pub event_interval_ms: u64,
    /// Probability that an event fires on each interval roll.
    pub event_chance: f64,
    /// Probability of an item drop on each tick.
    pub item_drop_chance: f64,
    pub save_path: PathBuf,
    /// 0 disables autosave.
    pub autosave_interval_ms: u64,
    pub rng_seed: Option<u64>,
    /// When set, creatures are read from this RON file instead of the built-in table.
    pub creature_catalog: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1000,
            event_interval_ms: 10_000,
            event_chance: 0.3,
            item_drop_chance: 0.05,
            save_path: PathBuf::from("clickdex_save.json"),
            autosave_interval_ms: 60_000,
            rng_seed: None,
            creature_catalog: None,
        }
    }
}

impl GameConfig {
    /// Rejects chances that are not finite numbers.
    pub fn parse(content: &str) -> Result<Self, GameError> {
        let config: Self = ron::from_str(content).map_err(|e| GameError::Config(e.to_string()))?;
        for (name, chance) in [
            ("event_chance", config.event_chance),
            ("item_drop_chance", config.item_drop_chance),
        ] {
            if !chance.is_finite() {
                return Err(GameError::Config(format!("{name} must be a finite number")));
            }
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Missing file → defaults. Malformed file → warning, then defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("[Config] no config at '{}', using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("[Config] loaded '{}'", path.display());
                config
            }
            Err(e) => {
                warn!("[Config] unable to read '{}', using defaults: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Resolves the config path from `CLICKDEX_CONFIG`, falling back to `clickdex.ron`.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_or_default(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = GameConfig::parse("(tick_period_ms: 250, rng_seed: Some(7))").unwrap();
        assert_eq!(config.tick_period_ms, 250);
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.event_interval_ms, 10_000);
        assert!((config.event_chance - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            GameConfig::parse("(tick_period_ms: \"fast\")"),
            Err(GameError::Config(_))
        ));
    }

    #[test]
    fn test_non_finite_chance_is_rejected() {
        assert!(matches!(
            GameConfig::parse("(event_chance: NaN)"),
            Err(GameError::Config(_))
        ));
        assert!(matches!(
            GameConfig::parse("(item_drop_chance: inf)"),
            Err(GameError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = GameConfig::load_or_default("/nonexistent/clickdex.ron");
        assert_eq!(config, GameConfig::default());
    }
}
