//! Multi-panel comparison charts.
//!
//! A 2x2 grid: training loss, training accuracy and test accuracy per
//! epoch, one line per experiment group. The fourth cell stays empty.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{ChartError, Result};
use crate::record::EpochRecord;
use crate::sweep::{epoch_labels, SeriesGroup};

/// Output size in pixels (12x8 inches at 100 dpi).
pub const CHART_SIZE: (u32, u32) = (1200, 800);

struct Panel {
    title: &'static str,
    y_label: &'static str,
    metric: fn(&EpochRecord) -> f64,
}

const PANELS: [Panel; 3] = [
    Panel {
        title: "Training Loss Comparison",
        y_label: "Training Loss",
        metric: |r| r.train_loss,
    },
    Panel {
        title: "Training Accuracy Comparison",
        y_label: "Training Accuracy",
        metric: |r| r.train_accuracy,
    },
    Panel {
        title: "Test Accuracy Comparison",
        y_label: "Test Accuracy",
        metric: |r| r.test_accuracy,
    },
];

fn plot_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Plot(err.to_string())
}

/// Y range covering every finite value of `metric`, padded by 5%.
fn value_range(groups: &[SeriesGroup], metric: fn(&EpochRecord) -> f64) -> (f64, f64) {
    let (min, max) = groups
        .iter()
        .flat_map(|g| &g.records)
        .map(metric)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    groups: &[SeriesGroup],
    epochs: &[String],
) -> Result<()> {
    let (y_min, y_max) = value_range(groups, panel.metric);
    // One segment per epoch; a single epoch still needs a non-empty range.
    let last = epochs.len().saturating_sub(1).max(1);

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..last).into_segmented(), y_min..y_max)
        .map_err(plot_err)?;

    let epoch_at = |x: &SegmentValue<usize>| match x {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            epochs.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc(panel.y_label)
        .x_labels(epochs.len() + 1)
        .x_label_formatter(&epoch_at)
        .draw()
        .map_err(plot_err)?;

    for (i, group) in groups.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let points: Vec<(SegmentValue<usize>, f64)> = group
            .records
            .iter()
            .filter_map(|r| {
                let x = epochs.iter().position(|e| *e == r.epoch)?;
                Some((SegmentValue::CenterOf(x), (panel.metric)(r)))
            })
            .collect();

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(plot_err)?
            .label(group.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

/// Draw the comparison grid onto any plotters backend.
pub fn render<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, groups: &[SeriesGroup]) -> Result<()> {
    if groups.iter().all(|g| g.records.is_empty()) {
        return Err(ChartError::NoData);
    }
    let epochs = epoch_labels(groups);

    root.fill(&WHITE).map_err(plot_err)?;
    let cells = root.split_evenly((2, 2));
    for (panel, cell) in PANELS.iter().zip(&cells) {
        draw_panel(cell, panel, groups, &epochs)?;
    }
    root.present().map_err(plot_err)?;

    Ok(())
}

/// Render to an SVG file.
///
/// The file is only written once rendering has succeeded, so a failed run
/// leaves any previous chart in place.
pub fn render_svg_file(path: &Path, groups: &[SeriesGroup]) -> Result<()> {
    let svg = render_svg_string(groups)?;
    std::fs::write(path, svg).map_err(|source| ChartError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Render to an SVG document in memory.
pub fn render_svg_string(groups: &[SeriesGroup]) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        render(&root, groups)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::{group, Sweep};

    fn record(epoch: u32, batch: &str, loss: f64) -> EpochRecord {
        EpochRecord {
            epoch: epoch.to_string(),
            group: batch.to_string(),
            train_loss: loss,
            train_accuracy: 80.0 + epoch as f64,
            test_accuracy: 78.0 + epoch as f64,
        }
    }

    #[test]
    fn test_value_range_pads() {
        let groups = group(vec![record(1, "16", 0.0), record(2, "16", 10.0)], Sweep::BatchSize);
        let (lo, hi) = value_range(&groups, |r| r.train_loss);
        assert!((lo + 0.5).abs() < 1e-9);
        assert!((hi - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_value_range_flat_series() {
        let groups = group(vec![record(1, "16", 2.0)], Sweep::BatchSize);
        assert_eq!(value_range(&groups, |r| r.train_loss), (1.0, 3.0));
    }

    #[test]
    fn test_render_svg_contains_panels_and_legend() {
        let groups = group(
            vec![
                record(1, "16", 0.9),
                record(2, "16", 0.5),
                record(1, "64", 1.1),
                record(2, "64", 0.7),
            ],
            Sweep::BatchSize,
        );
        let svg = render_svg_string(&groups).unwrap();

        assert!(svg.contains("<svg"));
        for title in ["Training Loss Comparison", "Training Accuracy Comparison", "Test Accuracy Comparison"] {
            assert!(svg.contains(title), "missing {title}");
        }
        assert!(svg.contains("Batch Size=16"));
        assert!(svg.contains("Batch Size=64"));
    }

    #[test]
    fn test_render_empty_is_an_error() {
        let err = render_svg_string(&[]).unwrap_err();
        assert!(matches!(err, ChartError::NoData));
    }

    #[test]
    fn test_every_epoch_is_labeled() {
        let records = (1..=30).map(|e| record(e, "32", 1.0 / e as f64)).collect();
        let svg = render_svg_string(&group(records, Sweep::BatchSize)).unwrap();

        for epoch in 1..=30 {
            assert!(svg.contains(&format!("\n{epoch}\n</text>")), "missing epoch {epoch}");
        }
    }

    #[test]
    fn test_single_epoch_renders() {
        let groups = group(vec![record(1, "16", 0.4)], Sweep::BatchSize);
        let svg = render_svg_string(&groups).unwrap();
        assert!(svg.contains("\n1\n</text>"));
    }

    #[test]
    fn test_failed_render_does_not_touch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        std::fs::write(&path, "previous chart").unwrap();

        let err = render_svg_file(&path, &[]).unwrap_err();
        assert!(matches!(err, ChartError::NoData));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous chart");
    }
}
