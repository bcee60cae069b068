use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::core::file_name;
use crate::error::{Error, Result};

/// `<letter>=<digits>`, e.g. `R=100` in `newR=100,.csv`.
static CUTOFF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]=([0-9]+)").expect("cutoff pattern is valid"));

/// Extract the cutoff value embedded in an export's file name.
///
/// Only the file-name component is searched, so directory names such as
/// `R=1k_runs/` never contribute. The first match wins.
pub fn extract_cutoff(path: impl AsRef<Path>) -> Result<f64> {
    let name = file_name(path.as_ref());

    let digits = CUTOFF_PATTERN
        .captures(&name)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::CutoffNotFound(name.clone()))?;

    digits
        .as_str()
        .parse::<f64>()
        .map_err(|_| Error::CutoffNotFound(name.clone()))
}
