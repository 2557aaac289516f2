//! ENTSO-E transparency platform exports: day-ahead prices and load forecasts.

pub mod batch;
pub mod columns;
pub mod merge;
pub mod record;
