//! Error types for the validation toolkit.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for simdiff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while comparing exports or generating netlists.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited file.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Field delimiter that is not a single ASCII byte.
    #[error("delimiter {0:?} is not an ASCII character")]
    InvalidDelimiter(char),

    /// File name carries no `<letter>=<digits>` value.
    #[error("no cutoff value (pattern <letter>=<digits>) in file name '{0}'")]
    CutoffNotFound(String),

    /// Reference export has no candidate counterpart.
    #[error("no matching file for {reference}: expected {expected}")]
    NoMatchingFile { reference: PathBuf, expected: PathBuf },

    /// Reference and candidate tables disagree on their columns.
    #[error(
        "column mismatch between {reference} and {candidate}: missing from candidate [{missing_in_candidate}], missing from reference [{missing_in_reference}]"
    )]
    ColumnMismatch {
        reference: PathBuf,
        candidate: PathBuf,
        missing_in_candidate: String,
        missing_in_reference: String,
    },

    /// Compared windows have different lengths after clamping.
    #[error("row count mismatch after cutoff: reference has {reference} rows, candidate has {candidate}")]
    RowCountMismatch { reference: usize, candidate: usize },

    /// Rows compared by position are not spaced by the same time step.
    #[error("time step ending at row {row} differs: reference dt={reference}, candidate dt={candidate}")]
    StepMismatch {
        row: usize,
        reference: f64,
        candidate: f64,
    },

    /// Per-file summaries cannot be stacked.
    #[error("summary header of {path} differs: expected [{expected}], got [{actual}]")]
    HeaderMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Table has no `time` column.
    #[error("no 'time' column in {0}")]
    MissingTimeColumn(PathBuf),

    /// Two header cells normalise to the same column name.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateColumn { path: PathBuf, column: String },

    /// Cell that does not parse as a number.
    #[error("invalid number '{value}' in {path} at row {row}, column '{column}'")]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// Column built with a different length than the ones before it.
    #[error("column '{column}' of {path} has {found} values, expected {expected}")]
    ColumnLength {
        path: PathBuf,
        column: String,
        expected: usize,
        found: usize,
    },

    /// Row length differs from the header.
    #[error("row {row} of {path} has {found} cells, header has {expected}")]
    RaggedRow {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Ladder size too small to hold a resistor pair.
    #[error("ladder size must be at least 2, got {0}")]
    InvalidSize(usize),

    /// Size sweep that would never advance.
    #[error("invalid size range {start}..{stop} step {step}")]
    InvalidRange { start: usize, stop: usize, step: usize },

    /// Timestep or table unsuitable for resampling.
    #[error("cannot resample {path}: {reason}")]
    InvalidTimestep { path: PathBuf, reason: String },

    /// Glob built from a directory path is malformed.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Step export without a header line.
    #[error("export {0} is empty")]
    EmptyExport(PathBuf),

    /// Netlist file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Plot rendering failed.
    #[error("failed to render plot {path}: {reason}")]
    Plot { path: PathBuf, reason: String },
}

impl Error {
    /// Wrap an IO error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a CSV error with the path it concerns.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
