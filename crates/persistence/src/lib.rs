//! Data access layer for the attendance portal backend.
//!
//! Both databases behind the portal are REST row stores (PostgREST-style),
//! reached through the [`store::RowStore`] trait. The primary store is
//! authoritative; the secondary store is a best-effort mirror kept in sync
//! by the API layer. [`memory::MemoryStore`] implements the same trait
//! in-process for the test suites.

pub mod memory;
pub mod metrics;
pub mod repositories;
pub mod rest;
pub mod store;
