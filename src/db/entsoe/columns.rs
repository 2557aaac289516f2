// Map the column names of the ENTSO-E transparency platform exports to our
// own names.  Prices files look like
//   "MTU (CET)","Day-ahead Price [EUR/MWh]"
// and load files like
//   "Time (CET)","Day-ahead Total Load Forecast [MW] - BZN|DE-AT-LU","Actual Total Load [MW] - BZN|DE-AT-LU"

use std::path::Path;

use csv::StringRecord;
use log::error;

use crate::elec::data_kind::DataKind;
use crate::error::EtlError;

/// The unmodified content of one CSV file.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub header: StringRecord,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    fn rename(&mut self, index: usize, name: &str) {
        self.header = self
            .header
            .iter()
            .enumerate()
            .map(|(i, h)| if i == index { name } else { h })
            .collect();
    }

    fn drop_column(&mut self, index: usize) {
        let keep = |record: &StringRecord| -> StringRecord {
            record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, v)| v)
                .collect()
        };
        self.header = keep(&self.header);
        self.records = self.records.iter().map(keep).collect();
    }
}

/// Rename the provider columns depending on the kind of data found in the
/// path.
///
/// For prices, the second column becomes "DAMprice".  For load, the second
/// and third columns become "loadForecast" and "load", and the "load" column
/// (actual load) is then dropped.  Keeping only the forecast is a policy
/// choice that should be revisited if the actual load is ever needed.
///
/// Other columns are left untouched.
pub fn rename_entsoe_columns(path: &Path, mut raw: RawTable) -> Result<RawTable, EtlError> {
    let kind = match DataKind::classify(path) {
        Some(kind) => kind,
        None => {
            error!("The given data is neither load nor prices: {}", path.display());
            return Err(EtlError::UnrecognizedDataKind(path.to_path_buf()));
        }
    };
    let required = match kind {
        DataKind::Prices => 2,
        DataKind::Load => 3,
    };
    if raw.header.len() < required {
        return Err(EtlError::MissingColumn {
            path: path.to_path_buf(),
            index: raw.header.len(),
        });
    }

    match kind {
        DataKind::Prices => {
            raw.rename(1, DataKind::Prices.value_column());
        }
        DataKind::Load => {
            raw.rename(1, DataKind::Load.value_column());
            raw.rename(2, "load");
            raw.drop_column(2);
        }
    }
    Ok(raw)
}
