use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::compare::{load_table, write_table};
use crate::core::{StandardizeConfig, TIME_COLUMN, Table, file_name};
use crate::error::{Error, Result};

/// Largest grid `resample` will build.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Resample a table onto the grid `t_k = k * timestep`, `k = 1..=floor(t_last / timestep)`.
///
/// Each column is linearly interpolated between the samples bracketing
/// `t_k`; where the bracket has zero width the later sample is used.
pub fn resample(table: &Table, timestep: f64) -> Result<Table> {
    let invalid = |reason: &str| Error::InvalidTimestep {
        path: table.path.clone(),
        reason: reason.to_string(),
    };

    if !timestep.is_finite() || timestep <= 0.0 {
        return Err(invalid("timestep must be positive and finite"));
    }
    if table.len() < 2 {
        return Err(invalid("at least two samples are required"));
    }

    let time = table.time();
    if time.windows(2).any(|w| w[1] < w[0]) {
        return Err(invalid("time column is not sorted"));
    }

    let last = time[time.len() - 1];
    // Guard against 3e-7 / 1e-7 landing just below 3
    let steps = (last / timestep * (1.0 + 1e-12)).floor();
    if !(steps <= MAX_GRID_POINTS as f64) {
        return Err(invalid(&format!(
            "timestep {timestep} gives more than {MAX_GRID_POINTS} grid points"
        )));
    }
    let steps = if steps > 0.0 { steps as usize } else { 0 };
    let grid: Vec<f64> = (1..=steps).map(|k| k as f64 * timestep).collect();

    // Upper bracketing sample for each grid point
    let brackets: Vec<usize> = grid
        .iter()
        .map(|&t| time.partition_point(|&s| s < t).clamp(1, time.len() - 1))
        .collect();

    let columns = table.column_names().map(|name| {
        let values = if name == TIME_COLUMN {
            grid.clone()
        } else {
            let ys = table.column(name).unwrap_or_default();
            grid.iter()
                .zip(&brackets)
                .map(|(&t, &n)| interpolate(time[n - 1], ys[n - 1], time[n], ys[n], t))
                .collect()
        };
        (name.to_string(), values)
    });

    Table::new(table.path.clone(), columns.collect::<Vec<_>>())
}

fn interpolate(t0: f64, y0: f64, t1: f64, y1: f64, t: f64) -> f64 {
    let dt = t1 - t0;
    if dt == 0.0 {
        return y1;
    }
    y0 + (y1 - y0) * (t - t0) / dt
}

/// Output path for a standardized export: the marker is prefixed to the name.
pub fn standardized_path(path: &Path, marker: &str) -> PathBuf {
    path.with_file_name(format!("{}{}", marker, file_name(path)))
}

/// Resample one export and write it next to the original.
pub fn standardize_file(path: impl AsRef<Path>, cfg: &StandardizeConfig) -> Result<PathBuf> {
    let path = path.as_ref();
    let table = load_table(path, &cfg.table)?;
    let resampled = resample(&table, cfg.timestep)?;

    let out = standardized_path(path, &cfg.marker);
    write_table(&out, &resampled)?;

    info!(
        source = %path.display(),
        path = %out.display(),
        rows = resampled.len(),
        "standardized"
    );
    Ok(out)
}

/// Standardize every `*.csv` in `dir` that is not itself a standardized output.
pub fn standardize_dir(dir: impl AsRef<Path>, cfg: &StandardizeConfig) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let pattern = format!(
        "{}/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut sources = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(path, e.into_error())
        })?;
        let name = file_name(&path);
        if !cfg.marker.is_empty() && name.contains(&cfg.marker) {
            debug!(path = %path.display(), "skipping standardized output");
            continue;
        }
        if path.is_file() {
            sources.push(path);
        }
    }
    sources.sort();

    sources
        .iter()
        .map(|path| standardize_file(path, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> Table {
        Table::new("t.csv", columns.into_iter().map(|(n, v)| (n.to_string(), v))).unwrap()
    }

    #[test]
    fn test_linear_signal_is_reproduced() {
        let t = table(vec![
            ("time", vec![0.0, 0.13, 0.31, 0.52, 1.0]),
            ("v", vec![0.0, 0.26, 0.62, 1.04, 2.0]),
        ]);
        let out = resample(&t, 0.25).unwrap();

        assert_eq!(out.len(), 4);
        for (&time, &v) in out.time().iter().zip(out.column("v").unwrap()) {
            assert_abs_diff_eq!(v, 2.0 * time, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(out.time()[3], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_grid_starts_after_zero() {
        let t = table(vec![("time", vec![0.0, 3e-7]), ("v", vec![0.0, 3.0])]);
        let out = resample(&t, 1e-7).unwrap();

        assert_eq!(out.len(), 3);
        assert_abs_diff_eq!(out.time()[0], 1e-7, epsilon = 1e-20);
        assert_abs_diff_eq!(out.column("v").unwrap()[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeated_timestamps() {
        let t = table(vec![("time", vec![0.0, 1.0, 1.0, 2.0]), ("v", vec![0.0, 1.0, 5.0, 5.0])]);
        let out = resample(&t, 1.0).unwrap();
        assert_eq!(out.column("v").unwrap(), &[1.0, 5.0]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let t = table(vec![("time", vec![0.0, 1.0]), ("v", vec![0.0, 1.0])]);
        assert!(resample(&t, 0.0).is_err());
        assert!(resample(&t, f64::NAN).is_err());

        let single = table(vec![("time", vec![0.0]), ("v", vec![0.0])]);
        assert!(resample(&single, 0.1).is_err());

        let unsorted = table(vec![("time", vec![0.0, 2.0, 1.0]), ("v", vec![0.0, 1.0, 2.0])]);
        assert!(resample(&unsorted, 0.1).is_err());
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let t = table(vec![("time", vec![0.0, 1.5, 3.0]), ("v", vec![0.0, 1.0, 2.0])]);
        let err = resample(&t, 1e-15).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestep { ref reason, .. } if reason.contains("grid points")));
        assert_eq!(resample(&t, 1e-3).unwrap().len(), 3000);
    }

    #[test]
    fn test_standardized_path() {
        assert_eq!(
            standardized_path(Path::new("LT.csvs/R=100,.csv"), "new"),
            PathBuf::from("LT.csvs/newR=100,.csv")
        );
    }
}
