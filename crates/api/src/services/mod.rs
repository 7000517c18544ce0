//! Business services: registration/sync, report assembly, export, cascade
//! deletion, and login.

pub mod auth;
pub mod events;
pub mod export;
pub mod report;
pub mod sync;
