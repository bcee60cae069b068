//! Percentage-error comparison of reference and candidate waveform exports.

mod cutoff;
mod pairs;
mod percent;
mod report;
mod table;

pub use cutoff::extract_cutoff;
pub use pairs::{candidate_name, find_pairs, list_files};
pub use percent::{CUTOFF_HEADER, compute_error, mean_abs, percentage_error};
pub use report::AggregateResult;
pub use table::{load_table, write_table};

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::{CompareConfig, Cutoff, FilePair, PairReport};
use crate::error::{Error, Result};
use crate::plot;

/// Compare one reference export against its candidate.
pub fn compare_pair(pair: &FilePair, cfg: &CompareConfig) -> Result<PairReport> {
    let value = extract_cutoff(&pair.reference)?;
    let cutoff = Cutoff::new(value, cfg.time_constant_scale, cfg.sample_period);

    let reference = load_table(&pair.reference, &cfg.table)?;
    let candidate = load_table(&pair.candidate, &cfg.table)?;

    let comparison = compute_error(&reference, &candidate, cutoff, cfg)?;

    info!(
        pair = %pair.label(),
        cutoff = cutoff.value,
        rows = comparison.errors.len(),
        "compared"
    );

    Ok(PairReport {
        pair: pair.clone(),
        cutoff,
        comparison,
    })
}

/// Compare every pair on the rayon pool, keeping input order.
pub fn compare_all(pairs: &[FilePair], cfg: &CompareConfig) -> Result<Vec<PairReport>> {
    pairs
        .par_iter()
        .map(|pair| compare_pair(pair, cfg))
        .collect()
}

/// Stack the per-pair summaries into one table.
pub fn aggregate(pairs: &[FilePair], cfg: &CompareConfig) -> Result<AggregateResult> {
    let reports = compare_all(pairs, cfg)?;
    AggregateResult::from_reports(&reports)
}

/// [`aggregate`], then render the per-pair and per-column plots.
pub fn aggregate_and_plot(pairs: &[FilePair], cfg: &CompareConfig) -> Result<AggregateResult> {
    let reports = compare_all(pairs, cfg)?;
    let result = AggregateResult::from_reports(&reports)?;

    if cfg.plot && !result.is_empty() {
        let written = render_plots(&reports, &result, cfg)?;
        info!(count = written.len(), dir = %cfg.plot_dir.display(), "plots written");
    }

    Ok(result)
}

fn render_plots(
    reports: &[PairReport],
    result: &AggregateResult,
    cfg: &CompareConfig,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&cfg.plot_dir).map_err(|e| Error::io(&cfg.plot_dir, e))?;

    let mut written = Vec::with_capacity(reports.len() + result.error_columns().len());
    for report in reports {
        let path = plot::render_pair(report, &cfg.plot_dir)?;
        debug!(path = %path.display(), "pair plot");
        written.push(path);
    }
    for column in result.error_columns() {
        let path = plot::render_column(result, column, &cfg.plot_dir)?;
        debug!(path = %path.display(), "column plot");
        written.push(path);
    }

    Ok(written)
}
