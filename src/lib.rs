pub mod db;
pub mod elec;
pub mod error;
pub mod interval;
pub mod pipeline;
pub mod quality;
pub mod timeseries;
