//! # Cybercafe Backend
//!
//! Usage analytics and workstation registry for an internet cafe.
//!
//! Front-desk exports of workstation sessions are ingested, cleaned and
//! aggregated into an hourly demand model: the average session length for
//! every hour of the day, the hours that stand out as peaks and a fit score
//! for the hourly model. The same storage also keeps the PC registry.
//!
//! ## Architecture
//!
//! - [`models`]: Usage records, hourly predictions, workstations
//! - [`parsing`]: CSV and JSON ingestion with per-row rejection reports
//! - [`services`]: Demand aggregation and the load → clean → train → visualize pipeline
//! - [`db`]: Repository pattern, local and file-backed storage, service layer
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod parsing;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
