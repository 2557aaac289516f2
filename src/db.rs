pub mod entsoe;
pub mod store;
