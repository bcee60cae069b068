use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

use crate::core::file_name;
use crate::error::{Error, Result};

/// Marks the start of a parameter run in a stepped export.
pub const STEP_MARKER: &str = "Step Information";

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+=[0-9]+").expect("assignment pattern is valid"));

/// One `.step` run of a stepped export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepRun {
    /// Swept assignments such as `R=100`, in the order they appear.
    pub variables: Vec<String>,
    /// Comma-separated data lines.
    pub lines: Vec<String>,
}

impl StepRun {
    /// `R=100,C=10,.csv`, or `<fallback>.csv` for a run without assignments.
    pub fn file_name(&self, fallback: &str) -> String {
        if self.variables.is_empty() {
            return format!("{fallback}.csv");
        }
        let mut name: String = self.variables.iter().map(|v| format!("{v},")).collect();
        name.push_str(".csv");
        name
    }
}

/// Header and runs of a stepped export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepExport {
    pub header: String,
    pub runs: Vec<StepRun>,
}

/// Split stepped export text into runs. Tabs become commas.
///
/// Data lines that precede the first step line form a run of their own.
/// Consecutive step lines (one per swept parameter) describe the same run;
/// the last one names it.
pub fn split_steps(text: &str, source: &Path) -> Result<StepExport> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .map(tabs_to_commas)
        .ok_or_else(|| Error::EmptyExport(source.to_path_buf()))?;

    let mut runs: Vec<StepRun> = Vec::new();
    let mut current = StepRun::default();
    let mut started = false;

    for line in lines {
        if line.contains(STEP_MARKER) {
            if !current.lines.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            current.variables = ASSIGNMENT
                .find_iter(line)
                .map(|m| m.as_str().to_string())
                .collect();
            started = true;
        } else {
            current.lines.push(tabs_to_commas(line));
        }
    }
    if started || !current.lines.is_empty() {
        runs.push(current);
    }

    Ok(StepExport { header, runs })
}

fn tabs_to_commas(line: &str) -> String {
    line.replace('\t', ",")
}

/// Directory the runs of `path` are written to: `LT.csv` becomes `LT.csvs`.
pub fn separated_dir(path: &Path) -> PathBuf {
    let name = format!("{}s", file_name(path));
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Split a stepped export into one CSV per run next to it.
pub fn separate(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let export = split_steps(&text, path)?;

    let dir = separated_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());

    let mut written = Vec::with_capacity(export.runs.len());
    for run in &export.runs {
        let out = dir.join(run.file_name(&fallback));

        let mut content = String::with_capacity(export.header.len() + 1);
        content.push_str(&export.header);
        content.push('\n');
        for line in &run.lines {
            content.push_str(line);
            content.push('\n');
        }

        std::fs::write(&out, content).map_err(|source| Error::Write {
            path: out.clone(),
            source,
        })?;
        info!(path = %out.display(), rows = run.lines.len(), "run separated");
        written.push(out);
    }

    Ok(written)
}
