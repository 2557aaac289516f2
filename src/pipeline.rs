use std::path::PathBuf;

use duckdb::Connection;
use log::{error, info};

use crate::db::entsoe::merge::EntsoeArchive;
use crate::db::store;
use crate::error::EtlError;
use crate::quality::{QualityCheck, QualityReport};

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub duckdb_path: PathBuf,
    /// One archive per data kind.  They run independently of each other.
    pub archives: Vec<EntsoeArchive>,
    pub quality: QualityCheck,
}

/// Load the archives and the buffer into the store, then check each
/// combined view.  A failure in one data kind is logged and doesn't stop
/// the other ones.  Return the reports of the kinds that made it through.
pub fn run(config: &EtlConfig) -> Result<Vec<QualityReport>, EtlError> {
    let conn = store::open(&config.duckdb_path)?;
    info!("opened {}", config.duckdb_path.display());
    Ok(run_with(&conn, config))
}

pub fn run_with(conn: &Connection, config: &EtlConfig) -> Vec<QualityReport> {
    let mut reports = Vec::new();
    for archive in &config.archives {
        let res = archive
            .update(conn)
            .and_then(|combined| config.quality.run(&archive.table, &combined));
        match res {
            Ok(report) => reports.push(report),
            Err(e) => error!("Failed to update {} data: {}", archive.kind, e),
        }
    }
    reports
}
