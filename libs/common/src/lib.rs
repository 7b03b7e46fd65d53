//! Common library for the Movierama services
//!
//! This crate provides shared functionality used across the services of the
//! application: PostgreSQL connectivity, schema migration and the shared
//! database error type.

pub mod database;
pub mod error;
