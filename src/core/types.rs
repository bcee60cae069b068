use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the independent variable shared by every export.
pub const TIME_COLUMN: &str = "time";

// ===== ENUMS =====

/// How an existing netlist file is treated when it is written again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Replace the file contents.
    #[default]
    Truncate,
    /// Add to the end of the file.
    Append,
    /// Refuse to touch a file that already exists.
    CreateNew,
}

impl WritePolicy {
    pub fn open_options(self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        match self {
            Self::Truncate => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::CreateNew => options.write(true).create_new(true),
        };
        options
    }
}

// ===== CORE DATA TYPES =====

/// Time-series export held column-wise, keyed by lower-cased column name.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub path: PathBuf,
    columns: IndexMap<String, Vec<f64>>,
    rows: usize,
}

impl Table {
    /// Build a table from named columns.
    ///
    /// Names are trimmed and lower-cased; every column must have the same
    /// length and exactly one must be `time`.
    pub fn new(
        path: impl Into<PathBuf>,
        columns: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self> {
        let path = path.into();
        let mut map: IndexMap<String, Vec<f64>> = IndexMap::new();
        let mut rows = None;

        for (name, values) in columns {
            let key = normalize_column(&name);
            match rows {
                None => rows = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(Error::ColumnLength {
                        path,
                        column: key,
                        expected,
                        found: values.len(),
                    });
                }
                Some(_) => {}
            }
            if map.contains_key(&key) {
                return Err(Error::DuplicateColumn { path, column: key });
            }
            map.insert(key, values);
        }

        if !map.contains_key(TIME_COLUMN) {
            return Err(Error::MissingTimeColumn(path));
        }

        Ok(Self {
            path,
            columns: map,
            rows: rows.unwrap_or(0),
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn time(&self) -> &[f64] {
        // Presence is checked in `new`
        self.columns
            .get(TIME_COLUMN)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(&normalize_column(name)).map(Vec::as_slice)
    }

    /// All column names in header order, `time` included.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Non-time columns in header order.
    pub fn value_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .filter(|(name, _)| name.as_str() != TIME_COLUMN)
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Copy of the leading rows, clamped to the table length.
    pub fn head(&self, rows: usize) -> Table {
        let rows = rows.min(self.rows);
        Table {
            path: self.path.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[..rows].to_vec()))
                .collect(),
            rows,
        }
    }

    /// Row-major view of the table, used when writing it back out.
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.values().map(|values| values[index]).collect()
    }
}

/// Lower-case, whitespace-trimmed column key.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Value embedded in a reference file name and the window it selects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cutoff {
    pub value: f64,
    pub rows: usize,
}

impl Cutoff {
    /// Derive the compared row count as `floor(value * scale / period)`.
    pub fn new(value: f64, time_constant_scale: f64, sample_period: f64) -> Self {
        let rows = (value * (time_constant_scale / sample_period)).floor();
        let rows = if rows.is_finite() && rows > 0.0 {
            rows as usize
        } else {
            0
        };
        Self { value, rows }
    }
}

/// Per-row percentage error of every non-time column over the compared window.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorTable {
    pub time: Vec<f64>,
    pub columns: IndexMap<String, Vec<f64>>,
}

impl ErrorTable {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

/// Result of comparing one reference table against one candidate table.
#[derive(Clone, Debug)]
pub struct Comparison {
    pub errors: ErrorTable,
    /// Cutoff value followed by the mean error of each column.
    pub summary: Vec<f64>,
    /// `"Resistor Value"` followed by the column names.
    pub header: Vec<String>,
}

/// A reference export and the candidate export it is checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePair {
    pub reference: PathBuf,
    pub candidate: PathBuf,
}

impl FilePair {
    pub fn new(reference: impl Into<PathBuf>, candidate: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            candidate: candidate.into(),
        }
    }

    /// Candidate file stem, used to label per-pair output.
    pub fn label(&self) -> String {
        file_name(&self.candidate)
            .trim_end_matches(".csv")
            .trim_end_matches(',')
            .to_string()
    }
}

/// Everything produced for a single file pair.
#[derive(Clone, Debug)]
pub struct PairReport {
    pub pair: FilePair,
    pub cutoff: Cutoff,
    pub comparison: Comparison,
}

/// Arithmetic sweep of ladder sizes, stop exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeRange {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl Default for SizeRange {
    fn default() -> Self {
        Self {
            start: 50,
            stop: 1000,
            step: 50,
        }
    }
}

impl SizeRange {
    pub fn new(start: usize, stop: usize, step: usize) -> Result<Self> {
        let range = Self { start, stop, step };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(Error::InvalidRange {
                start: self.start,
                stop: self.stop,
                step: self.step,
            });
        }
        Ok(())
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> {
        (self.start..self.stop).step_by(self.step.max(1))
    }
}

/// File-name component as a string, lossy for non-UTF-8 names.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
