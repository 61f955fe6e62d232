//! Reading per-epoch training metrics from CSV.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{ChartError, Result};
use crate::sweep::Sweep;

pub const TRAIN_LOSS: &str = "train_loss";
pub const TRAIN_ACCURACY: &str = "train_accuracy";
pub const TEST_ACCURACY: &str = "test_accuracy";

/// One CSV row: the metrics of one epoch of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// Kept as text; epochs are plotted as categories.
    pub epoch: String,
    /// Value of the swept parameter (loss function name or batch size).
    pub group: String,
    pub train_loss: f64,
    /// Percent.
    pub train_accuracy: f64,
    /// Percent.
    pub test_accuracy: f64,
}

/// Parse a percentage such as `"97.5%"`; trailing `%` signs are optional.
pub fn parse_percent(value: &str) -> Option<f64> {
    value.trim().trim_end_matches('%').trim_end().parse().ok()
}

struct ColumnIndex {
    epoch: usize,
    group: usize,
    train_loss: usize,
    train_accuracy: usize,
    test_accuracy: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord, sweep: Sweep) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ChartError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            epoch: find(sweep.epoch_column())?,
            group: find(sweep.group_column())?,
            train_loss: find(TRAIN_LOSS)?,
            train_accuracy: find(TRAIN_ACCURACY)?,
            test_accuracy: find(TEST_ACCURACY)?,
        })
    }
}

fn number(
    row: &StringRecord,
    index: usize,
    column: &str,
    parse: fn(&str) -> Option<f64>,
) -> Result<f64> {
    let value = row.get(index).unwrap_or_default();
    parse(value).ok_or_else(|| ChartError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
        line: row.position().map(|p| p.line()).unwrap_or(0),
    })
}

fn parse_plain(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

/// Read every row of a sweep CSV.
///
/// Columns are looked up by header name, so their order does not matter.
pub fn read_records<R: Read>(reader: R, sweep: Sweep) -> Result<Vec<EpochRecord>> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = ColumnIndex::from_headers(csv.headers()?, sweep)?;

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        records.push(EpochRecord {
            epoch: row.get(columns.epoch).unwrap_or_default().to_string(),
            group: row.get(columns.group).unwrap_or_default().to_string(),
            train_loss: number(&row, columns.train_loss, TRAIN_LOSS, parse_plain)?,
            train_accuracy: number(&row, columns.train_accuracy, TRAIN_ACCURACY, parse_percent)?,
            test_accuracy: number(&row, columns.test_accuracy, TEST_ACCURACY, parse_percent)?,
        });
    }

    tracing::debug!("Read {} rows", records.len());
    Ok(records)
}

pub fn read_records_from_path(path: &Path, sweep: Sweep) -> Result<Vec<EpochRecord>> {
    let file = std::fs::File::open(path).map_err(|e| ChartError::Open {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    read_records(file, sweep)
}
