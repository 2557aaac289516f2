use std::error::Error;
use std::path::PathBuf;

use entsoe_db::db::entsoe::merge::EntsoeArchive;
use entsoe_db::elec::data_kind::DataKind;
use entsoe_db::pipeline::{self, EtlConfig};
use entsoe_db::quality::{QualityCheck, QualityReport};
use jiff::civil::{date, Date};
use log::info;
use tabled::{builder::Builder, settings::Style};

const DUCKDB_PATH: &str = "db.duckdb";
const ARCHIVE_PRICES: &str = "data/prices";
const ARCHIVE_LOAD: &str = "data/load";
// new files for both kinds land here
const BUFFER: &str = "data/buffer";
const PLOT_DIR: &str = "plots";
const TIMEZONE: &str = "Europe/Brussels";
const CALENDAR_START: Date = date(2015, 1, 1);
const CALENDAR_END: Date = date(2019, 1, 1);

/// Make an ASCII table from the reports
fn ascii_table(reports: &[QualityReport]) -> tabled::Table {
    let mut builder = Builder::new();
    builder.push_record(vec![
        "Kind",
        "Rows",
        "P1",
        "P99",
        "Clipped",
        "Calendar Hours",
        "Missing Hours",
    ]);
    for report in reports {
        builder.push_record(vec![
            report.kind.to_string(),
            report.rows.to_string(),
            format!("{:.2}", report.lower),
            format!("{:.2}", report.upper),
            report.clipped.to_string(),
            report.calendar_hours.to_string(),
            report.missing_hours.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::sharp());
    table
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = EtlConfig {
        duckdb_path: PathBuf::from(DUCKDB_PATH),
        archives: vec![
            EntsoeArchive::new(DataKind::Prices, ARCHIVE_PRICES, BUFFER),
            EntsoeArchive::new(DataKind::Load, ARCHIVE_LOAD, BUFFER),
        ],
        quality: QualityCheck::new(
            TIMEZONE,
            CALENDAR_START,
            CALENDAR_END,
            Some(PathBuf::from(PLOT_DIR)),
        )?,
    };

    let reports = pipeline::run(&config)?;
    info!("processed {} of {} data kinds", reports.len(), config.archives.len());
    println!("{}", ascii_table(&reports));
    Ok(())
}
