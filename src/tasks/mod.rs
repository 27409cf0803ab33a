//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stats Report: Logs cache counters at configured intervals

mod stats_report;

pub use stats_report::spawn_stats_reporter;
