//! Figure rendering.
//!
//! Pure output sinks: every function here consumes labels or metrics and
//! writes an SVG file; nothing feeds back into the pipeline. Paths come in
//! from the caller: the figure directory is configuration, not ambient
//! state.

use std::path::Path;

use plotters::prelude::*;

use crate::cluster::Label;
use crate::error::{Error, Result};

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Save the k-means elbow curve: inertia over k, with point markers.
pub fn save_elbow_plot(curve: &[(usize, f64)], path: &Path) -> Result<()> {
    if curve.is_empty() {
        return Err(Error::EmptyInput);
    }

    let k_min = curve.first().map(|(k, _)| *k).unwrap_or(1) as f64;
    let k_max = curve.last().map(|(k, _)| *k).unwrap_or(1) as f64;
    let max_inertia = curve.iter().map(|(_, i)| *i).fold(0.0, f64::max);
    let y_max = if max_inertia > 0.0 { max_inertia * 1.05 } else { 1.0 };

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Elbow Plot (K-Means)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(k_min - 0.5..k_max + 0.5, 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("k")
        .y_desc("inertia")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            curve.iter().map(|(k, i)| (*k as f64, *i)),
            &BLUE,
        ))
        .map_err(render_err)?;

    chart
        .draw_series(
            curve
                .iter()
                .map(|(k, i)| Circle::new((*k as f64, *i), 4, BLUE.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Save a 2-d projection scatter colored by cluster label.
///
/// Noise points are drawn as black crosses. When `centers` is given (in the
/// same projected space) each is overlaid as a large cross.
pub fn save_scatter_2d(
    points: &[Vec<f32>],
    labels: &[Label],
    centers: Option<&[Vec<f32>]>,
    title: &str,
    path: &Path,
) -> Result<()> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    if points.len() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: points.len(),
            found: labels.len(),
        });
    }
    for p in points {
        if p.len() < 2 {
            return Err(Error::DimensionMismatch {
                expected: 2,
                found: p.len(),
            });
        }
    }

    let xs = points.iter().map(|p| p[0] as f64);
    let ys = points.iter().map(|p| p[1] as f64);
    let (min_x, max_x) = bounds(xs);
    let (min_y, max_y) = bounds(ys);
    let pad_x = ((max_x - min_x) * 0.05).max(1e-3);
    let pad_y = ((max_y - min_y) * 0.05).max(1e-3);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min_x - pad_x..max_x + pad_x, min_y - pad_y..max_y + pad_y)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("PC1")
        .y_desc("PC2")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(points.iter().zip(labels).filter_map(|(p, label)| {
            label.id().map(|id| {
                Circle::new(
                    (p[0] as f64, p[1] as f64),
                    3,
                    Palette99::pick(id).mix(0.8).filled(),
                )
            })
        }))
        .map_err(render_err)?;

    chart
        .draw_series(points.iter().zip(labels).filter_map(|(p, label)| {
            label
                .is_noise()
                .then(|| Cross::new((p[0] as f64, p[1] as f64), 3, BLACK.stroke_width(1)))
        }))
        .map_err(render_err)?;

    if let Some(centers) = centers {
        chart
            .draw_series(
                centers
                    .iter()
                    .map(|c| Cross::new((c[0] as f64, c[1] as f64), 8, BLACK.stroke_width(3))),
            )
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Save a heatmap of `values` (row-major, expected in `[0, 1]`).
///
/// Callers normalize: the cluster-profile figure scales each column to its
/// own min/max, the correlation figure maps `[-1, 1]` onto `[0, 1]`.
pub fn save_heatmap(
    title: &str,
    row_labels: &[String],
    col_labels: &[String],
    values: &[Vec<f32>],
    path: &Path,
) -> Result<()> {
    if values.is_empty() || col_labels.is_empty() {
        return Err(Error::EmptyInput);
    }
    if values.len() != row_labels.len() {
        return Err(Error::DimensionMismatch {
            expected: row_labels.len(),
            found: values.len(),
        });
    }
    for row in values {
        if row.len() != col_labels.len() {
            return Err(Error::DimensionMismatch {
                expected: col_labels.len(),
                found: row.len(),
            });
        }
    }

    let n_rows = values.len();
    let n_cols = col_labels.len();

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(160)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..n_cols as f64, 0.0..n_rows as f64)
        .map_err(render_err)?;

    let rows = row_labels.to_vec();
    let cols = col_labels.to_vec();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n_cols)
        .y_labels(n_rows)
        .x_label_formatter(&move |x| {
            cols.get(*x as usize).cloned().unwrap_or_default()
        })
        .y_label_formatter(&move |y| {
            rows.get(*y as usize).cloned().unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(values.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, &v)| {
                Rectangle::new(
                    [(c as f64, r as f64), (c as f64 + 1.0, r as f64 + 1.0)],
                    heat_color(v).filled(),
                )
            })
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Map a value in `[0, 1]` onto a dark-purple → yellow ramp.
fn heat_color(v: f32) -> RGBColor {
    let t = v.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
    // Endpoints of the viridis ramp.
    RGBColor(lerp(68, 253), lerp(1, 231), lerp(84, 37))
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
