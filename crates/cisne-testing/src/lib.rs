//! Test utilities for Cisne services.
//!
//! Provides `MockAuth` bearer tokens and a migrated in-memory SQLite database.
//! Import in tests only; never in production code.

pub mod auth;
pub mod db;
