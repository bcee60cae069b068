//! Aggregated mean-error table across all compared file pairs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::PairReport;
use crate::error::{Error, Result};

/// One summary row per file pair, stacked in pair order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// `"Resistor Value"` followed by the error column names.
    pub header: Vec<String>,
    /// Reference export each row came from.
    pub sources: Vec<PathBuf>,
    /// Cutoff value followed by the mean error of each column.
    pub rows: Vec<Vec<f64>>,
}

impl AggregateResult {
    /// Stack per-pair summaries; every pair must report the same header.
    pub fn from_reports(reports: &[PairReport]) -> Result<Self> {
        let mut result = Self::default();

        for report in reports {
            let cmp = &report.comparison;
            if result.header.is_empty() {
                result.header = cmp.header.clone();
            } else if result.header != cmp.header {
                return Err(Error::HeaderMismatch {
                    path: report.pair.reference.clone(),
                    expected: result.header.join(", "),
                    actual: cmp.header.join(", "),
                });
            }
            result.sources.push(report.pair.reference.clone());
            result.rows.push(cmp.summary.clone());
        }

        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Error column names, without the cutoff column.
    pub fn error_columns(&self) -> &[String] {
        self.header.get(1..).unwrap_or_default()
    }

    /// `(cutoff value, mean error)` points for one error column.
    pub fn series(&self, column: &str) -> Vec<(f64, f64)> {
        let Some(index) = self.header.iter().position(|h| h == column) else {
            return Vec::new();
        };
        self.rows.iter().map(|row| (row[0], row[index])).collect()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;

        writer
            .write_record(&self.header)
            .map_err(|e| Error::csv(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .map_err(|e| Error::csv(path, e))?;
        }
        writer.flush().map_err(|e| Error::io(path, e))
    }

    /// JSON rendering; non-finite means become `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format as a fixed-width text table.
    pub fn to_text(&self) -> String {
        let width = self
            .header
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(12);

        let mut out = String::new();
        for name in &self.header {
            out.push_str(&format!("{:>width$} ", name, width = width));
        }
        out.push('\n');
        for row in &self.rows {
            for value in row {
                out.push_str(&format!("{:>width$.6} ", value, width = width));
            }
            out.push('\n');
        }
        out
    }
}
