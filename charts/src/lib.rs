//! Training sweep charts
//!
//! Reads the CSV logs of hyperparameter sweeps and draws a comparison grid
//! of loss and accuracy curves, one line per experiment.

pub mod error;
pub mod plot;
pub mod record;
pub mod sweep;

pub use error::{ChartError, Result};
pub use record::EpochRecord;
pub use sweep::{SeriesGroup, Sweep};

use std::path::Path;

/// Counts reported after a chart is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    pub rows_read: usize,
    pub rows_plotted: usize,
    pub series: Vec<String>,
}

/// Read `input`, group it per `sweep` and write the chart to `output`.
///
/// `max_train_loss` overrides the sweep's outlier ceiling.
pub fn build_chart(
    input: &Path,
    output: &Path,
    sweep: Sweep,
    max_train_loss: Option<f64>,
) -> Result<ChartSummary> {
    let records = record::read_records_from_path(input, sweep)?;
    let rows_read = records.len();

    let ceiling = max_train_loss.or(sweep.default_max_train_loss());
    let records = sweep::drop_outliers(records, ceiling);
    let rows_plotted = records.len();

    let groups = sweep::group(records, sweep);
    plot::render_svg_file(output, &groups)?;

    Ok(ChartSummary {
        rows_read,
        rows_plotted,
        series: groups.into_iter().map(|g| g.label).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("losses.csv");
        let output = dir.path().join("chart.svg");
        std::fs::write(
            &input,
            "Epoch,Loss Function,train_loss,train_accuracy,test_accuracy\n\
             1,CrossEntropyLoss,0.6,80%,82%\n\
             2,CrossEntropyLoss,0.4,88%,87%\n\
             1,MultiMarginLoss,396,9.8%,10.1%\n\
             2,MultiMarginLoss,0.2,85%,84%\n",
        )
        .unwrap();

        let summary = build_chart(&input, &output, Sweep::LossFunction, None).unwrap();
        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.rows_plotted, 3);
        assert_eq!(summary.series, ["CrossEntropyLoss", "MultiMarginLoss"]);

        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("MultiMarginLoss"));
    }

    #[test]
    fn test_build_chart_override_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batches.csv");
        let output = dir.path().join("chart.svg");
        std::fs::write(
            &input,
            "epoch,batch_size,train_loss,train_accuracy,test_accuracy\n\
             1,16,2.5,70%,71%\n\
             1,32,0.5,75%,74%\n",
        )
        .unwrap();

        let summary = build_chart(&input, &output, Sweep::BatchSize, Some(1.0)).unwrap();
        assert_eq!(summary.rows_plotted, 1);
        assert_eq!(summary.series, ["Batch Size=32"]);
    }

    #[test]
    fn test_no_rows_left_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("losses.csv");
        let output = dir.path().join("chart.svg");
        std::fs::write(
            &input,
            "Epoch,Loss Function,train_loss,train_accuracy,test_accuracy\n\
             1,MultiMarginLoss,396,9.8%,10.1%\n",
        )
        .unwrap();

        let err = build_chart(&input, &output, Sweep::LossFunction, None).unwrap_err();
        assert!(matches!(err, ChartError::NoData));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_chart(
            &dir.path().join("nope.csv"),
            &dir.path().join("out.svg"),
            Sweep::BatchSize,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::Open { .. }));
    }
}
