use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The two kinds of ENTSO-E exports we ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    // day-ahead market prices
    Prices,
    // day-ahead load forecast
    Load,
}

impl DataKind {
    pub const ALL: [DataKind; 2] = [DataKind::Prices, DataKind::Load];

    /// Substring that identifies the kind in a file path, e.g.
    /// "Day-ahead Prices_201701010000-201801010000.csv".
    pub fn identifier(&self) -> &'static str {
        match self {
            DataKind::Prices => "Prices",
            DataKind::Load => "Load",
        }
    }

    /// Name of the single value column of the cleaned table.
    pub fn value_column(&self) -> &'static str {
        match self {
            DataKind::Prices => "DAMprice",
            DataKind::Load => "loadForecast",
        }
    }

    /// Default name of the table in the store.
    pub fn table_name(&self) -> &'static str {
        match self {
            DataKind::Prices => "DAMprice",
            DataKind::Load => "load",
        }
    }

    /// Infer the kind from a path.  Case-insensitive, prices are checked first.
    /// Return `None` if the path matches neither kind.
    pub fn classify(path: &Path) -> Option<DataKind> {
        let path = path.to_string_lossy().to_lowercase();
        DataKind::ALL
            .into_iter()
            .find(|kind| path.contains(&kind.identifier().to_lowercase()))
    }

    /// Check only the file name, used to pick files out of the mixed buffer
    /// directory.
    pub fn matches_file_name(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| {
                name.to_string_lossy()
                    .to_lowercase()
                    .contains(&self.identifier().to_lowercase())
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataKind::Prices => write!(f, "prices"),
            DataKind::Load => write!(f, "load"),
        }
    }
}

impl FromStr for DataKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prices" => Ok(DataKind::Prices),
            "load" => Ok(DataKind::Load),
            _ => Err(format!("Failed parsing {} as a data kind", s)),
        }
    }
}
