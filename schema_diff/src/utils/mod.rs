//! Utilities for schema_diff

pub mod logging;
