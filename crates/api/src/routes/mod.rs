//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod reports;
pub mod users;
