//! Run configuration
//!
//! The configuration is layered: the built-in `default.toml`, then an optional TOML file,
//! then `PRICE_PREDICTION_*` environment variables. Nested keys use a double underscore,
//! e.g. `PRICE_PREDICTION_FOREST__NUM_TREES=50`.
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::imputer::ImputerStrategy;

const DEFAULT_CONFIG: &str = include_str!("default.toml");

const ENV_PREFIX: &str = "PRICE_PREDICTION_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub master: String,
    pub input: PathBuf,
    /// Field delimiter of CSV input
    pub delimiter: char,
    pub label_col: String,
    pub partitions: usize,
    /// Seed of the train/test split
    pub seed: u64,
    /// Fraction of the rows in the training set
    pub train_ratio: f64,
    pub show_rows: usize,
    /// Cell width beyond which previews truncate, 0 disables truncation
    pub truncate: usize,
    pub preview_rows: usize,
    pub preview_cols: Vec<String>,
    pub single_features: Vec<String>,
    pub multi_features: Vec<String>,
    pub imputer_strategy: ImputerStrategy,
    pub forest: ForestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub max_bins: usize,
    /// Unset draws a fresh seed on every run
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AppConfig {
    /// The built-in configuration, ignoring files and the environment
    pub fn defaults() -> Result<Self> {
        Ok(Figment::from(Toml::string(DEFAULT_CONFIG)).extract()?)
    }

    /// Loads the defaults, overlaid by `file` if given and then by the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Toml::string(DEFAULT_CONFIG));
        if let Some(path) = file {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "configuration file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(Error::Config("partitions must be positive".to_string()));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(Error::Config(format!(
                "train_ratio must be in (0, 1), got {}",
                self.train_ratio
            )));
        }
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter must be an ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.single_features.is_empty() || self.multi_features.is_empty() {
            return Err(Error::Config("feature lists must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
