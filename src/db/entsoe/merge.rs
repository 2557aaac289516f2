use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::info;

use crate::db::entsoe::batch::csv_to_sql;
use crate::db::entsoe::record::Frame;
use crate::db::store::{EntsoeStore, WriteMode};
use crate::elec::data_kind::DataKind;
use crate::error::EtlError;

/// Result of ingesting the buffer directory.
#[derive(Debug, Clone, PartialEq)]
pub enum Increment {
    /// Rows appended to the table, in file order.
    Appended(Frame),
    /// No buffer file for this data kind.
    NoNewData,
}

/// One data kind: an archive directory loaded in bulk and a buffer directory
/// (shared between kinds) appended incrementally.
#[derive(Debug, Clone)]
pub struct EntsoeArchive {
    pub kind: DataKind,
    pub archive_dir: PathBuf,
    pub buffer_dir: PathBuf,
    pub table: String,
}

/// Regular files of a directory, sorted by name.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    Ok(paths.into_iter().sorted().collect())
}

impl EntsoeArchive {
    pub fn new(kind: DataKind, archive_dir: &str, buffer_dir: &str) -> EntsoeArchive {
        EntsoeArchive {
            kind,
            archive_dir: PathBuf::from(archive_dir),
            buffer_dir: PathBuf::from(buffer_dir),
            table: kind.table_name().to_string(),
        }
    }

    pub fn archive_files(&self) -> io::Result<Vec<PathBuf>> {
        list_files(&self.archive_dir)
    }

    /// Buffer files with this kind's identifier in their name.
    pub fn buffer_files(&self) -> io::Result<Vec<PathBuf>> {
        Ok(list_files(&self.buffer_dir)?
            .into_iter()
            .filter(|p| self.kind.matches_file_name(p))
            .collect())
    }

    /// Load every archive file, replacing the table.  An empty archive is an
    /// error.
    pub fn bulk_load<S: EntsoeStore>(&self, store: &S) -> Result<Frame, EtlError> {
        let paths = self.archive_files()?;
        csv_to_sql(&paths, self.kind, &self.table, store, WriteMode::Replace)
    }

    /// Append the buffer files for this kind to the table.
    pub fn incremental_load<S: EntsoeStore>(&self, store: &S) -> Result<Increment, EtlError> {
        let paths = self.buffer_files()?;
        match csv_to_sql(&paths, self.kind, &self.table, store, WriteMode::Append) {
            Ok(frame) => Ok(Increment::Appended(frame)),
            Err(e) if e.is_empty_input() => {
                info!("no new {} files in {}", self.kind, self.buffer_dir.display());
                Ok(Increment::NoNewData)
            }
            Err(e) => Err(e),
        }
    }

    /// Run the bulk phase then the incremental phase.  Return the baseline
    /// followed by the appended rows, which is what the table now holds.
    pub fn update<S: EntsoeStore>(&self, store: &S) -> Result<Frame, EtlError> {
        let mut combined = self.bulk_load(store)?;
        match self.incremental_load(store)? {
            Increment::Appended(frame) => {
                info!(
                    "{} rows in archive, {} new rows from the buffer for table {}",
                    combined.len(),
                    frame.len(),
                    self.table
                );
                combined.extend(frame)?;
            }
            Increment::NoNewData => {}
        }
        Ok(combined)
    }
}
