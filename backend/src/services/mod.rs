//! Service layer for demand analytics.
//!
//! The functions here are pure computations over usage records. Storage is
//! reached through [`crate::db::services`], which loads records and hands them
//! to these services.

pub mod demand;
pub mod pipeline;

#[cfg(test)]
#[path = "demand_tests.rs"]
mod demand_tests;

pub use demand::{aggregate_by_hour, detect_peak_hours, filter_valid, summarize};
pub use pipeline::{CleaningReport, DemandAnalysis, DemandChart, DemandLevel, DemandPipeline, HourlyBar};
