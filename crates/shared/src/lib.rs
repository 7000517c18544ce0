//! Shared utilities and common types for the attendance portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - JWT session token creation and validation
//! - Common validation logic for registration payloads

pub mod jwt;
pub mod password;
pub mod validation;
