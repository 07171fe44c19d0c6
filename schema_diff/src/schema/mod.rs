//! Schema module for schema_diff
//!
//! This module holds the record types, the ordered record sets, the comparator
//! contract with its merge driver, and the column comparator.

pub mod column;
pub mod comparator;
pub mod emitter;
pub mod query;
pub mod record_set;
pub mod types;

// Re-export key types
pub use column::ColumnComparator;
pub use comparator::{diff, Comparator, DiffSummary, ItemFailure};
pub use emitter::{DdlEmitter, DdlLine};
pub use record_set::{Cursor, Keyed, OrderedRecordSet};
pub use types::{ColumnRecord, ObjectFilter, SchemaSelector};
