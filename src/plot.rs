//! SVG scatter plots of percentage error.

use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::compare::AggregateResult;
use crate::core::PairReport;
use crate::error::{Error, Result};

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const SIZE: (u32, u32) = (1024, 640);

/// Plot percentage error against time for one file pair, one series per column.
pub fn render_pair(report: &PairReport, dir: &Path) -> Result<PathBuf> {
    let label = report.pair.label();
    let path = dir.join(format!("{}_error.svg", sanitize(&label)));

    let errors = &report.comparison.errors;
    let series: Vec<(String, Vec<(f64, f64)>)> = errors
        .columns
        .iter()
        .map(|(name, values)| {
            let points = errors.time.iter().copied().zip(values.iter().copied());
            (name.clone(), finite_points(points))
        })
        .collect();

    draw_scatter(
        &path,
        &format!("Percentage Error vs Time {label}"),
        "Time /s",
        "Percentage Error /%",
        &series,
    )
    .map_err(|e| Error::Plot {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(path)
}

/// Plot mean percentage error against cutoff value for one error column.
pub fn render_column(result: &AggregateResult, column: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("mean_error_{}.svg", sanitize(column)));
    let points = finite_points(result.series(column));

    draw_scatter(
        &path,
        &format!("Average Percentage Error in {column}"),
        "Resistor Value /Ω",
        &format!("Mean Percentage Error in {column} /%"),
        &[(column.to_string(), points)],
    )
    .map_err(|e| Error::Plot {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(path)
}

fn draw_scatter(
    path: &Path,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[(String, Vec<(f64, f64)>)],
) -> DrawResult {
    let all = series.iter().flat_map(|(_, points)| points.iter().copied());
    let (x_range, y_range) = bounds(all);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    for (i, (name, points)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Cross::new((x, y), 4, color.stroke_width(1))),
            )?
            .label(name.as_str())
            .legend(move |(x, y)| Cross::new((x + 8, y), 4, color.stroke_width(1)));
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Drop points that cannot be placed on a linear axis.
fn finite_points(points: impl IntoIterator<Item = (f64, f64)>) -> Vec<(f64, f64)> {
    points
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

/// Axis ranges covering every point, padded so single values stay visible.
fn bounds(points: impl Iterator<Item = (f64, f64)>) -> (Range<f64>, Range<f64>) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for (px, py) in points {
        x = (x.0.min(px), x.1.max(px));
        y = (y.0.min(py), y.1.max(py));
    }
    (padded(x), padded(y))
}

fn padded((lo, hi): (f64, f64)) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        lo.abs().max(1.0) * 0.5
    };
    (lo - pad)..(hi + pad)
}

/// Make a column or file label safe to use in a file name.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("v(n001)"), "v_n001_");
        assert_eq!(sanitize("R=100"), "R=100");
        assert_eq!(sanitize("a/b c"), "a_b_c");
    }

    #[test]
    fn test_bounds_pad_degenerate_ranges() {
        let (x, y) = bounds(vec![(2.0, 5.0)].into_iter());
        assert!(x.start < 2.0 && x.end > 2.0);
        assert!(y.start < 5.0 && y.end > 5.0);

        let (x, _) = bounds(std::iter::empty());
        assert_eq!(x, 0.0..1.0);
    }

    #[test]
    fn test_finite_points() {
        let points = finite_points(vec![(0.0, f64::NAN), (1.0, f64::INFINITY), (2.0, 3.0)]);
        assert_eq!(points, vec![(2.0, 3.0)]);
    }
}
