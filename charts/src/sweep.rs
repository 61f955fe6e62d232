//! Experiment sweeps and grouping of their rows into plot series.

use std::collections::HashMap;

use clap::ValueEnum;

use crate::record::EpochRecord;

/// Rows with a training loss at or above this are treated as diverged runs
/// in the loss-function sweep.
pub const LOSS_SWEEP_MAX_TRAIN_LOSS: f64 = 100.0;

/// Which hyperparameter an experiment log varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sweep {
    /// Same model trained with different loss functions.
    LossFunction,
    /// Same model trained with different batch sizes.
    BatchSize,
}

impl Sweep {
    pub fn epoch_column(self) -> &'static str {
        match self {
            Sweep::LossFunction => "Epoch",
            Sweep::BatchSize => "epoch",
        }
    }

    pub fn group_column(self) -> &'static str {
        match self {
            Sweep::LossFunction => "Loss Function",
            Sweep::BatchSize => "batch_size",
        }
    }

    /// Legend text for one group.
    pub fn series_label(self, key: &str) -> String {
        match self {
            Sweep::LossFunction => key.to_string(),
            Sweep::BatchSize => format!("Batch Size={}", key),
        }
    }

    pub fn default_max_train_loss(self) -> Option<f64> {
        match self {
            Sweep::LossFunction => Some(LOSS_SWEEP_MAX_TRAIN_LOSS),
            Sweep::BatchSize => None,
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            Sweep::LossFunction => "loss_function_comparison.svg",
            Sweep::BatchSize => "batch_size_comparison.svg",
        }
    }
}

/// All rows of one experiment, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    pub key: String,
    pub label: String,
    pub records: Vec<EpochRecord>,
}

/// Keep rows whose training loss is below `max_train_loss`.
///
/// NaN losses never pass the ceiling.
pub fn drop_outliers(records: Vec<EpochRecord>, max_train_loss: Option<f64>) -> Vec<EpochRecord> {
    let Some(max) = max_train_loss else {
        return records;
    };

    let before = records.len();
    let kept: Vec<EpochRecord> = records.into_iter().filter(|r| r.train_loss < max).collect();
    if kept.len() < before {
        tracing::info!(
            "Dropped {} rows with train_loss >= {}",
            before - kept.len(),
            max
        );
    }
    kept
}

/// Group rows by the swept parameter, in order of first appearance.
pub fn group(records: Vec<EpochRecord>, sweep: Sweep) -> Vec<SeriesGroup> {
    let mut groups: Vec<SeriesGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let index = *positions.entry(record.group.clone()).or_insert_with(|| {
            groups.push(SeriesGroup {
                key: record.group.clone(),
                label: sweep.series_label(&record.group),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].records.push(record);
    }

    groups
}

/// Distinct epoch labels across all groups, in order of first appearance.
pub fn epoch_labels(groups: &[SeriesGroup]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for record in groups.iter().flat_map(|g| &g.records) {
        if !labels.contains(&record.epoch) {
            labels.push(record.epoch.clone());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: &str, group: &str, loss: f64) -> EpochRecord {
        EpochRecord {
            epoch: epoch.to_string(),
            group: group.to_string(),
            train_loss: loss,
            train_accuracy: 90.0,
            test_accuracy: 89.0,
        }
    }

    #[test]
    fn test_group_preserves_first_appearance_order() {
        let records = vec![
            record("1", "64", 0.5),
            record("1", "16", 0.6),
            record("2", "64", 0.4),
            record("2", "16", 0.3),
        ];
        let groups = group(records, Sweep::BatchSize);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "64");
        assert_eq!(groups[0].label, "Batch Size=64");
        assert_eq!(groups[1].label, "Batch Size=16");
        let epochs: Vec<&str> = groups[1].records.iter().map(|r| r.epoch.as_str()).collect();
        assert_eq!(epochs, ["1", "2"]);
    }

    #[test]
    fn test_loss_function_labels_are_names() {
        let groups = group(vec![record("1", "MSELoss", 0.1)], Sweep::LossFunction);
        assert_eq!(groups[0].label, "MSELoss");
    }

    #[test]
    fn test_drop_outliers() {
        let records = vec![
            record("1", "a", 0.5),
            record("2", "a", 396.0),
            record("3", "a", 100.0),
            record("4", "a", f64::NAN),
        ];
        let kept = drop_outliers(records.clone(), Sweep::LossFunction.default_max_train_loss());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].epoch, "1");

        let untouched = drop_outliers(records, Sweep::BatchSize.default_max_train_loss());
        assert_eq!(untouched.len(), 4);
    }

    #[test]
    fn test_epoch_labels() {
        let groups = group(
            vec![
                record("1", "a", 0.1),
                record("2", "a", 0.1),
                record("1", "b", 0.1),
                record("3", "b", 0.1),
            ],
            Sweep::LossFunction,
        );
        assert_eq!(epoch_labels(&groups), ["1", "2", "3"]);
    }
}
