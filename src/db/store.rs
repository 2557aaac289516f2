use std::path::Path;

use duckdb::types::{TimeUnit, Value};
use duckdb::{params, AccessMode, Config, Connection};
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use log::{error, info};

use crate::db::entsoe::record::{Frame, Row};
use crate::elec::data_kind::DataKind;
use crate::error::EtlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Drop the existing content of the table.
    Replace,
    /// Add the rows at the end of the table, create it if needed.
    Append,
}

/// Where the cleaned tables end up.
pub trait EntsoeStore {
    /// Write the frame into `table`.  Return the number of rows written.
    fn write_frame(&self, table: &str, frame: &Frame, mode: WriteMode) -> Result<usize, EtlError>;

    /// Read the full content of `table`, ordered by timestamp.
    fn read_frame(&self, table: &str, kind: DataKind) -> Result<Frame, EtlError>;
}

/// Open (or create) the DuckDB file.
pub fn open(duckdb_path: &Path) -> Result<Connection, EtlError> {
    if let Some(dir) = duckdb_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let config = Config::default().access_mode(AccessMode::ReadWrite)?;
    Ok(Connection::open_with_flags(duckdb_path, config)?)
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

impl EntsoeStore for Connection {
    fn write_frame(&self, table: &str, frame: &Frame, mode: WriteMode) -> Result<usize, EtlError> {
        let create = match mode {
            WriteMode::Replace => "CREATE OR REPLACE TABLE",
            WriteMode::Append => "CREATE TABLE IF NOT EXISTS",
        };
        let sql = format!(
            r#"
{} {} (
    mtu TIMESTAMP NOT NULL,
    {} DOUBLE NOT NULL,
);
"#,
            create,
            quote(table),
            quote(frame.value_column())
        );

        self.execute_batch("BEGIN TRANSACTION;")?;
        let res = (|| -> Result<usize, EtlError> {
            self.execute_batch(&sql)?;
            // an existing table must have the frame's value column
            self.prepare(&format!(
                "SELECT mtu, {} FROM {} LIMIT 0;",
                quote(frame.value_column()),
                quote(table)
            ))?;
            let mut app = self.appender(table)?;
            for row in &frame.rows {
                let micros = row.mtu.to_zoned(TimeZone::UTC)?.timestamp().as_microsecond();
                app.append_row(params![
                    Value::Timestamp(TimeUnit::Microsecond, micros),
                    row.value
                ])?;
            }
            app.flush()?;
            Ok(frame.len())
        })();

        match res {
            Ok(n) => {
                self.execute_batch("COMMIT;")?;
                info!("wrote {} rows into table {} ({:?})", n, table, mode);
                Ok(n)
            }
            Err(e) => {
                if let Err(rb) = self.execute_batch("ROLLBACK;") {
                    error!("Failed to roll back the write into table {}: {}", table, rb);
                }
                Err(e)
            }
        }
    }

    fn read_frame(&self, table: &str, kind: DataKind) -> Result<Frame, EtlError> {
        let query = format!(
            r#"
SELECT strftime(mtu, '%Y-%m-%dT%H:%M:%S'), {}
FROM {}
ORDER BY mtu;
"#,
            quote(kind.value_column()),
            quote(table)
        );
        let mut stmt = self.prepare(&query)?;
        let res_iter = stmt.query_map([], |row| {
            Ok((row.get::<usize, String>(0)?, row.get::<usize, f64>(1)?))
        })?;

        let mut frame = Frame::new(kind);
        for item in res_iter {
            let (mtu, value) = item?;
            frame.rows.push(Row {
                mtu: DateTime::strptime("%Y-%m-%dT%H:%M:%S", &mtu)?,
                value,
            });
        }
        Ok(frame)
    }
}
