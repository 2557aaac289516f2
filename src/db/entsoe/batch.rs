use std::path::PathBuf;

use log::{error, info, warn};

use crate::db::entsoe::record::{read_file, Frame};
use crate::db::store::{EntsoeStore, WriteMode};
use crate::elec::data_kind::DataKind;
use crate::error::EtlError;

/// Parse all the files, concatenate them in the order given and write the
/// result into `table`.  Return the concatenated frame.
///
/// Files that are not recognized as `kind` are logged and skipped.  A parse
/// error aborts the batch before anything is written.  An empty list of
/// paths, or one where every file was skipped, is an
/// [`EtlError::EmptyInput`], nothing is written in that case.
pub fn csv_to_sql<S: EntsoeStore>(
    paths: &[PathBuf],
    kind: DataKind,
    table: &str,
    store: &S,
    mode: WriteMode,
) -> Result<Frame, EtlError> {
    if paths.is_empty() {
        return Err(EtlError::EmptyInput {
            table: table.to_string(),
        });
    }
    info!(
        "loading {} {} files into table {} ({:?}) ...",
        paths.len(),
        kind,
        table,
        mode
    );

    let mut frames: Vec<Frame> = Vec::with_capacity(paths.len());
    for path in paths {
        match DataKind::classify(path) {
            Some(k) if k == kind => {}
            Some(k) => {
                warn!("skipping {} file {} while loading {}", k, path.display(), kind);
                continue;
            }
            None => {
                error!("The given data is neither load nor prices: {}", path.display());
                continue;
            }
        }
        frames.push(read_file(path)?);
    }
    if frames.is_empty() {
        warn!("no {} file left to load into table {}", kind, table);
        return Err(EtlError::EmptyInput {
            table: table.to_string(),
        });
    }

    let frame = Frame::concat(kind, frames)?;
    store.write_frame(table, &frame, mode)?;
    info!("done");
    Ok(frame)
}
