use std::path::PathBuf;

use thiserror::Error;

use crate::elec::data_kind::DataKind;

#[derive(Error, Debug)]
pub enum EtlError {
    /// The path contains neither "Prices" nor "Load".
    #[error("the given data is neither load nor prices: {}", .0.display())]
    UnrecognizedDataKind(PathBuf),

    #[error("{}: missing column {index}", .path.display())]
    MissingColumn { path: PathBuf, index: usize },

    /// A timestamp did not match "dd.mm.yyyy HH:MM", or a value is not numeric.
    #[error("{}, row {row}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        message: String,
    },

    /// No files to load.  Benign for a buffer directory, fatal for an archive.
    #[error("no input files for table {table}")]
    EmptyInput { table: String },

    #[error("cannot combine {found} data with {expected} data")]
    KindMismatch { expected: DataKind, found: DataKind },

    #[error("table {table} has no rows to check")]
    NoData { table: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),

    #[error(transparent)]
    Time(#[from] jiff::Error),
}

impl EtlError {
    pub fn is_empty_input(&self) -> bool {
        matches!(self, EtlError::EmptyInput { .. })
    }
}
