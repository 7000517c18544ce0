//! Domain layer for the attendance portal backend.
//!
//! This crate contains:
//! - Domain models (User, Event, AttendanceRecord)
//! - The mixed numeric/text record identifier used by legacy rows
//! - Report types produced for export

pub mod models;
