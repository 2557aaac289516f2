use std::path::Path;

use jiff::civil::DateTime;
use log::info;

use crate::db::entsoe::columns::{rename_entsoe_columns, RawTable};
use crate::elec::data_kind::DataKind;
use crate::error::EtlError;

/// Format of the first 16 characters of the provider's MTU label,
/// e.g. "01.01.2017 00:00 - 01.01.2017 01:00".
pub const MTU_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Placeholder the provider uses for a missing value.
pub const MISSING: &str = "-";

/// Other tokens that mean "no value" in a csv cell.
const NA_TOKENS: [&str; 10] = [
    "", MISSING, "NaN", "nan", "-NaN", "NA", "N/A", "#N/A", "null", "NULL",
];

fn is_missing(field: &str) -> bool {
    NA_TOKENS.contains(&field.trim())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Start of the market time unit, local time.
    pub mtu: DateTime,
    pub value: f64,
}

/// A cleaned table: a timestamp index and one value column, named after the
/// data kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: DataKind,
    pub rows: Vec<Row>,
}

impl Frame {
    pub fn new(kind: DataKind) -> Frame {
        Frame {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn value_column(&self) -> &'static str {
        self.kind.value_column()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self) -> Vec<DateTime> {
        self.rows.iter().map(|r| r.mtu).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.value).collect()
    }

    /// Append the rows of `other` at the end, keeping their order.
    pub fn extend(&mut self, other: Frame) -> Result<(), EtlError> {
        if other.kind != self.kind {
            return Err(EtlError::KindMismatch {
                expected: self.kind,
                found: other.kind,
            });
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Concatenate frames row-wise, in the order given.
    pub fn concat(kind: DataKind, frames: Vec<Frame>) -> Result<Frame, EtlError> {
        let mut out = Frame::new(kind);
        for frame in frames {
            out.extend(frame)?;
        }
        Ok(out)
    }
}

/// Read the raw content of an ENTSO-E csv file.
pub fn read_raw(path: &Path) -> Result<RawTable, EtlError> {
    let mut rdr = csv::ReaderBuilder::new().from_path(path)?;
    let header = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    Ok(RawTable { header, records })
}

/// Transform an ENTSO-E load or prices csv file into a [`Frame`].
///
/// The first column is relabeled "mtu" and only its first 16 characters are
/// parsed, strictly, as "dd.mm.yyyy HH:MM".  Rows with a missing value ("-",
/// empty, "NaN", ...) in any column, or a value that is not finite, are
/// dropped.
pub fn read_file(path: &Path) -> Result<Frame, EtlError> {
    let raw = rename_entsoe_columns(path, read_raw(path)?)?;
    let kind = DataKind::classify(path)
        .ok_or_else(|| EtlError::UnrecognizedDataKind(path.to_path_buf()))?;
    to_frame(path, kind, raw)
}

fn to_frame(path: &Path, kind: DataKind, raw: RawTable) -> Result<Frame, EtlError> {
    let value_idx = raw
        .column_index(kind.value_column())
        .ok_or_else(|| EtlError::MissingColumn {
            path: path.to_path_buf(),
            index: 1,
        })?;

    let mut frame = Frame::new(kind);
    let mut dropped = 0;
    for (i, record) in raw.records.iter().enumerate() {
        // header is line 1
        let line = i + 2;
        let mtu_label = record.get(0).unwrap_or("");
        let mtu = parse_mtu(mtu_label).map_err(|e| EtlError::Parse {
            path: path.to_path_buf(),
            row: line,
            message: format!("invalid mtu {:?}: {}", mtu_label, e),
        })?;

        // a missing value in any remaining column drops the row
        if record.iter().skip(1).any(is_missing) || record.len() < raw.header.len() {
            dropped += 1;
            continue;
        }
        let v = record.get(value_idx).map(str::trim).unwrap_or("");
        let value = v.parse::<f64>().map_err(|e| EtlError::Parse {
            path: path.to_path_buf(),
            row: line,
            message: format!("invalid {} value {:?}: {}", kind.value_column(), v, e),
        })?;
        if !value.is_finite() {
            dropped += 1;
            continue;
        }
        frame.rows.push(Row { mtu, value });
    }

    info!(
        "read {} {} rows from {}, dropped {} rows with missing values",
        frame.len(),
        kind,
        path.display(),
        dropped
    );
    Ok(frame)
}

/// Parse the start of an MTU label, e.g. "01.01.2017 00:00 - 01.01.2017 00:15".
pub fn parse_mtu(label: &str) -> Result<DateTime, jiff::Error> {
    let start: String = label.chars().take(16).collect();
    DateTime::strptime(MTU_FORMAT, &start)
}
