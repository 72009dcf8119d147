//! Database module for schema_tidy
//!
//! This module handles the database connection and seed insertion.

pub mod connection;
pub mod seed;

// Re-export key types
pub use connection::DatabaseConnection;
