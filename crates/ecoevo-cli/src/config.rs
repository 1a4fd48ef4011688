//! Configuration management for the ecoevo CLI.

use anyhow::{Context, Result};
use ecoevo::prelude::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ecoevo.toml";

/// Project configuration read from `ecoevo.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_bins")]
    pub histogram_bins: usize,
}

// Default value functions
fn default_ticks() -> u64 { 500 }
fn default_bins() -> usize { 10 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            histogram_bins: default_bins(),
        }
    }
}

impl Config {
    /// Load config from ecoevo.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        match find_config_file(&cwd) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load and validate config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .simulation
            .params
            .validate()
            .with_context(|| format!("Invalid parameters in {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Simulation settings with command-line overrides applied.
    pub fn simulation_with(&self, seed: Option<u64>) -> SimulationConfig {
        let mut sim = self.simulation.clone();
        if let Some(seed) = seed {
            sim.seed = seed;
        }
        sim
    }
}

/// Find ecoevo.toml in `start` or its parent directories.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoevo::prelude::{InputSource, WeightUpdate};

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.run.ticks = 42;
        config.simulation.seed = 9;
        config.simulation.params.input_source = InputSource::Noise { seed: 3 };
        config.simulation.params.weight_update = WeightUpdate::MeanReverting {
            target: 0.5,
            gamma: 0.2,
        };
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[simulation.params]\np_flip = 0.25\n\n[simulation.params.activation]\nkind = \"relu\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.run, RunConfig::default());
        assert_eq!(loaded.simulation.inputs, 3);
        assert_eq!(loaded.simulation.params.p_flip, 0.25);
        assert_eq!(
            loaded.simulation.params.activation,
            ecoevo::prelude::Activation::Relu
        );
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[simulation.params]\np_flip = 2.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn config_is_found_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        Config::default().save(&dir.path().join(CONFIG_FILE)).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn seed_override() {
        let config = Config::default();
        assert_eq!(config.simulation_with(None).seed, 42);
        assert_eq!(config.simulation_with(Some(7)).seed, 7);
    }
}
