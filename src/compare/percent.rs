use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::core::{Comparison, CompareConfig, Cutoff, ErrorTable, Table};
use crate::error::{Error, Result};

/// Label of the first summary column.
pub const CUTOFF_HEADER: &str = "Resistor Value";

/// Percentage error of a candidate sample against its reference.
///
/// A zero reference yields `inf` (or `NaN` when the candidate is zero too);
/// the sign follows the reference value.
#[inline]
pub fn percentage_error(reference: f64, candidate: f64) -> f64 {
    100.0 * ((reference - candidate).abs() / reference)
}

/// Absolute value of the mean, skipping `NaN` cells.
///
/// Infinite cells propagate. A column with no finite-or-infinite cells
/// averages to `NaN`.
pub fn mean_abs(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        (sum / count as f64).abs()
    }
}

/// Compare the leading `cutoff.rows` rows of two tables column by column.
///
/// Rows are matched by position. Both tables are clamped to the cutoff
/// independently and the clamped lengths must agree. When
/// `check_step_spacing` is set, the time step between consecutive rows must
/// agree as well; the start times may differ (a resampled grid starts at
/// `t = timestep`, a simulator trace at `t = 0`).
pub fn compute_error(
    reference: &Table,
    candidate: &Table,
    cutoff: Cutoff,
    cfg: &CompareConfig,
) -> Result<Comparison> {
    check_columns(reference, candidate)?;

    let reference = reference.head(cutoff.rows);
    let candidate = candidate.head(cutoff.rows);

    if reference.len() != candidate.len() {
        return Err(Error::RowCountMismatch {
            reference: reference.len(),
            candidate: candidate.len(),
        });
    }

    if cfg.check_step_spacing {
        check_step_spacing(&reference, &candidate, cfg.step_tolerance)?;
    }

    let mut header = vec![CUTOFF_HEADER.to_string()];
    let mut summary = vec![cutoff.value];
    let mut columns = IndexMap::new();

    for (name, ref_values) in reference.value_columns() {
        // Column sets were checked above
        let cand_values = candidate.column(name).unwrap_or_default();

        let errors: Vec<f64> = ref_values
            .iter()
            .zip(cand_values)
            .map(|(&r, &c)| percentage_error(r, c))
            .collect();

        header.push(name.to_string());
        summary.push(mean_abs(&errors));
        columns.insert(name.to_string(), errors);
    }

    Ok(Comparison {
        errors: ErrorTable {
            time: reference.time().to_vec(),
            columns,
        },
        summary,
        header,
    })
}

fn check_columns(reference: &Table, candidate: &Table) -> Result<()> {
    let ref_cols: BTreeSet<&str> = reference.column_names().collect();
    let cand_cols: BTreeSet<&str> = candidate.column_names().collect();

    if ref_cols == cand_cols {
        return Ok(());
    }

    let join = |cols: Vec<&str>| cols.join(", ");
    Err(Error::ColumnMismatch {
        reference: reference.path.clone(),
        candidate: candidate.path.clone(),
        missing_in_candidate: join(ref_cols.difference(&cand_cols).copied().collect()),
        missing_in_reference: join(cand_cols.difference(&ref_cols).copied().collect()),
    })
}

/// Compare the step ending at each row, relative to the larger of the two.
fn check_step_spacing(reference: &Table, candidate: &Table, tolerance: f64) -> Result<()> {
    let steps = |time: &[f64]| -> Vec<f64> { time.windows(2).map(|w| w[1] - w[0]).collect() };
    let ref_steps = steps(reference.time());
    let cand_steps = steps(candidate.time());

    let mismatch = ref_steps
        .iter()
        .zip(&cand_steps)
        // NaN steps count as mismatches
        .position(|(&r, &c)| !((r - c).abs() <= tolerance * r.abs().max(c.abs())));

    match mismatch {
        Some(i) => Err(Error::StepMismatch {
            row: i + 1,
            reference: ref_steps[i],
            candidate: cand_steps[i],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn table(path: &str, columns: Vec<(&str, Vec<f64>)>) -> Table {
        Table::new(path, columns.into_iter().map(|(n, v)| (n.to_string(), v))).unwrap()
    }

    fn cutoff(value: f64) -> Cutoff {
        Cutoff::new(value, 1e-5, 1e-5)
    }

    #[test]
    fn test_identical_tables_have_zero_error() {
        let a = table("a", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![1.0, 2.0, 3.0]), ("i", vec![-1.0, 4.0, 9.0])]);
        let cmp = compute_error(&a, &a.clone(), cutoff(3.0), &CompareConfig::default()).unwrap();

        assert!(cmp.errors.columns.values().flatten().all(|&e| e == 0.0));
        assert_eq!(cmp.summary, vec![3.0, 0.0, 0.0]);
        assert_eq!(cmp.header, vec!["Resistor Value", "v", "i"]);
    }

    #[test]
    fn test_percentage_error_values() {
        let a = table("a", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![0.0, 10.0, 20.0])]);
        let b = table("b", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![0.0, 9.0, 18.0])]);
        let cmp = compute_error(&a, &b, cutoff(100.0), &CompareConfig::default()).unwrap();

        let v = cmp.errors.column("v").unwrap();
        assert!(v[0].is_nan());
        assert_abs_diff_eq!(v[1], 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[2], 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cmp.summary[1], 10.0, epsilon = 1e-12);
        assert_eq!(cmp.summary[0], 100.0);
    }

    #[test]
    fn test_zero_reference_gives_infinity() {
        let a = table("a", vec![("time", vec![0.0, 1.0]), ("v", vec![0.0, 10.0])]);
        let b = table("b", vec![("time", vec![0.0, 1.0]), ("v", vec![1.0, 10.0])]);
        let cmp = compute_error(&a, &b, cutoff(2.0), &CompareConfig::default()).unwrap();

        assert_eq!(cmp.errors.column("v").unwrap()[0], f64::INFINITY);
        assert_eq!(cmp.summary[1], f64::INFINITY);
    }

    #[test]
    fn test_negative_reference_keeps_mean_positive() {
        let a = table("a", vec![("time", vec![0.0]), ("v", vec![-10.0])]);
        let b = table("b", vec![("time", vec![0.0]), ("v", vec![-9.0])]);
        let cmp = compute_error(&a, &b, cutoff(1.0), &CompareConfig::default()).unwrap();

        assert_abs_diff_eq!(cmp.errors.column("v").unwrap()[0], -10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cmp.summary[1], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cutoff_limits_compared_rows() {
        let a = table("a", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![10.0, 10.0, 10.0])]);
        let b = table("b", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![9.0, 10.0, 0.0])]);
        let cmp = compute_error(&a, &b, cutoff(2.0), &CompareConfig::default()).unwrap();

        assert_eq!(cmp.errors.len(), 2);
        assert_abs_diff_eq!(cmp.summary[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cutoff_beyond_table_is_clamped() {
        let a = table("a", vec![("time", vec![0.0, 1.0]), ("v", vec![1.0, 2.0])]);
        let cmp = compute_error(&a, &a.clone(), cutoff(1e6), &CompareConfig::default()).unwrap();
        assert_eq!(cmp.errors.len(), 2);
    }

    #[test]
    fn test_column_mismatch_names_both_sides() {
        let a = table("a", vec![("time", vec![0.0]), ("v", vec![1.0])]);
        let b = table("b", vec![("time", vec![0.0]), ("i", vec![1.0])]);
        let err = compute_error(&a, &b, cutoff(1.0), &CompareConfig::default()).unwrap_err();

        match err {
            Error::ColumnMismatch {
                missing_in_candidate,
                missing_in_reference,
                ..
            } => {
                assert_eq!(missing_in_candidate, "v");
                assert_eq!(missing_in_reference, "i");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let a = table("a", vec![("time", vec![0.0]), ("v", vec![1.0]), ("i", vec![2.0])]);
        let b = table("b", vec![("i", vec![2.0]), ("time", vec![0.0]), ("v", vec![1.0])]);
        let cmp = compute_error(&a, &b, cutoff(1.0), &CompareConfig::default()).unwrap();
        assert_eq!(cmp.summary, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_row_count_mismatch_after_clamping() {
        let a = table("a", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![1.0, 1.0, 1.0])]);
        let b = table("b", vec![("time", vec![0.0]), ("v", vec![1.0])]);

        let err = compute_error(&a, &b, cutoff(3.0), &CompareConfig::default()).unwrap_err();
        assert!(matches!(err, Error::RowCountMismatch { reference: 3, candidate: 1 }));

        // A window short enough for both tables is fine
        assert!(compute_error(&a, &b, cutoff(1.0), &CompareConfig::default()).is_ok());
    }

    #[test]
    fn test_uneven_steps_are_rejected() {
        let a = table("a", vec![("time", vec![0.0, 1.0, 2.0]), ("v", vec![1.0, 1.0, 1.0])]);
        let b = table("b", vec![("time", vec![0.0, 1.5, 2.0]), ("v", vec![1.0, 1.0, 1.0])]);

        let err = compute_error(&a, &b, cutoff(3.0), &CompareConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::StepMismatch { row: 1, reference, candidate } if reference == 1.0 && candidate == 1.5
        ));

        let lenient = CompareConfig {
            check_step_spacing: false,
            ..CompareConfig::default()
        };
        assert!(compute_error(&a, &b, cutoff(3.0), &lenient).is_ok());
    }

    #[test]
    fn test_different_timestep_is_rejected() {
        let a = table("a", vec![("time", vec![1e-7, 2e-7, 3e-7]), ("v", vec![1.0, 1.0, 1.0])]);
        let b = table("b", vec![("time", vec![0.0, 1e-5, 2e-5]), ("v", vec![1.0, 1.0, 1.0])]);

        let err = compute_error(&a, &b, cutoff(3.0), &CompareConfig::default()).unwrap_err();
        assert!(matches!(err, Error::StepMismatch { row: 1, .. }));
    }

    #[test]
    fn test_offset_start_with_equal_steps_is_accepted() {
        // Resampled grid starts one step in; the simulator trace starts at zero
        let a = table("a", vec![("time", vec![1e-5, 2e-5, 3e-5]), ("v", vec![10.0, 20.0, 30.0])]);
        let b = table("b", vec![("time", vec![0.0, 1e-5, 2e-5]), ("v", vec![9.0, 18.0, 27.0])]);

        let cmp = compute_error(&a, &b, cutoff(3.0), &CompareConfig::default()).unwrap();
        assert_abs_diff_eq!(cmp.summary[1], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rounded_candidate_times_are_tolerated() {
        // Six significant digits, as a C++ stream prints by default
        let a = table("a", vec![("time", vec![1.0e-5, 2.0e-5, 3.0e-5]), ("v", vec![1.0, 1.0, 1.0])]);
        let b = table("b", vec![("time", vec![0.0, 1.00001e-5, 2.00002e-5]), ("v", vec![1.0, 1.0, 1.0])]);
        assert!(compute_error(&a, &b, cutoff(3.0), &CompareConfig::default()).is_ok());
    }

    #[test]
    fn test_mean_abs_skips_nan() {
        assert_eq!(mean_abs(&[f64::NAN, 2.0, 4.0]), 3.0);
        assert!(mean_abs(&[f64::NAN]).is_nan());
        assert!(mean_abs(&[]).is_nan());
    }
}
