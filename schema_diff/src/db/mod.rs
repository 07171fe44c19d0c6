//! Database module for schema_diff
//!
//! This module handles connections and the row sources that read column metadata.

pub mod connection;
pub mod row_source;

// Re-export key types
pub use connection::DatabaseConnection;
pub use row_source::{PostgresRowSource, RowSource, SnapshotRowSource};
