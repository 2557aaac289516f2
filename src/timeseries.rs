pub mod series_tz;
