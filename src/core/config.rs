use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::types::{SizeRange, WritePolicy};
use crate::error::{Error, Result};

/// Top-level configuration, loadable from TOML.
///
/// Every field is optional in the file; missing values fall back to the
/// defaults, which reproduce the directory layout of a validation run
/// (`LT.csvs` reference exports, `out.csvs` candidate exports).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compare: CompareConfig,
    pub generator: GeneratorConfig,
    pub standardize: StandardizeConfig,
    /// Worker threads for pair comparison. `None` uses one per CPU.
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Reading delimited exports.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub delimiter: char,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TableConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::InvalidDelimiter(self.delimiter))
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub reference_dir: PathBuf,
    pub candidate_dir: PathBuf,
    /// Substring identifying reference exports; removed to find the candidate.
    pub marker: String,
    /// Compared rows are `floor(cutoff * time_constant_scale / sample_period)`.
    pub time_constant_scale: f64,
    pub sample_period: f64,
    /// Reject pairs whose time steps disagree over the compared window.
    pub check_step_spacing: bool,
    /// Relative tolerance between two steps. Exports printed with six
    /// significant digits need a loose bound.
    pub step_tolerance: f64,
    pub plot: bool,
    pub plot_dir: PathBuf,
    pub table: TableConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("LT.csvs"),
            candidate_dir: PathBuf::from("out.csvs"),
            marker: "new".to_string(),
            time_constant_scale: 1e-5,
            sample_period: 1e-5,
            check_step_spacing: true,
            step_tolerance: 0.05,
            plot: true,
            plot_dir: PathBuf::from("plots"),
            table: TableConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    pub sizes: SizeRange,
    pub write_policy: WritePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            sizes: SizeRange::default(),
            write_policy: WritePolicy::Truncate,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardizeConfig {
    pub timestep: f64,
    /// Files already carrying the marker are outputs of a previous run.
    pub marker: String,
    pub table: TableConfig,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            timestep: 1e-7,
            marker: "new".to_string(),
            table: TableConfig::default(),
        }
    }
}
