//! schema_diff: compares two PostgreSQL schemas and generates reconciling DDL
//!
//! Both sides are read into ordered record sets, walked in lock-step by a
//! merge driver, and every difference becomes an `ALTER TABLE` statement that
//! makes the second database match the first. Nothing is ever executed.

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use config::{Config, ObjectKind};
pub use db::connection::DatabaseConnection;
pub use error::{Error, Result};
pub use schema::{diff, ColumnComparator, Comparator, DdlEmitter, DiffSummary, OrderedRecordSet};

use db::row_source::{self, RowSource};
use schema::types::ColumnRecord;

/// Initialize schema_diff with the specified configuration file
pub async fn init(config_path: &str) -> Result<DiffClient> {
    let config = config::load_from_file(config_path)?;
    DiffClient::new(config).await
}

/// Generated script plus what the driver counted while producing it
#[derive(Debug, Clone)]
pub struct DiffReport {
    pub ddl: DdlEmitter,
    pub summary: DiffSummary,
}

/// The main client: one connection per side
pub struct DiffClient {
    config: Config,
    source: Box<dyn RowSource>,
    target: Box<dyn RowSource>,
}

impl DiffClient {
    /// Connect both sides described by the configuration
    pub async fn new(config: Config) -> Result<Self> {
        let (source, target) = tokio::try_join!(
            DatabaseConnection::connect(&config.source),
            DatabaseConnection::connect(&config.target),
        )?;

        Ok(Self {
            source: row_source::for_connection(&source),
            target: row_source::for_connection(&target),
            config,
        })
    }

    /// Build a client over row sources that are already open
    pub fn with_sources(config: Config, source: Box<dyn RowSource>, target: Box<dyn RowSource>) -> Self {
        Self {
            config,
            source,
            target,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch both sides concurrently, each sorted by compare_name
    async fn fetch_sides(
        &self,
        kind: ObjectKind,
    ) -> Result<(OrderedRecordSet<ColumnRecord>, OrderedRecordSet<ColumnRecord>)> {
        let source_schema = self.config.source.selector();
        let target_schema = self.config.target.selector();
        let filter = kind.filter();

        let (source_rows, target_rows) = tokio::try_join!(
            self.source.fetch_columns(&source_schema, filter),
            self.target.fetch_columns(&target_schema, filter),
        )?;

        Ok((
            OrderedRecordSet::build(source_rows)?,
            OrderedRecordSet::build(target_rows)?,
        ))
    }

    /// Diff the configured object kind
    pub async fn compare(&self) -> Result<DiffReport> {
        self.compare_kind(self.config.diff.object_kind).await
    }

    /// Diff columns of the given kind and return the script for the target
    pub async fn compare_kind(&self, kind: ObjectKind) -> Result<DiffReport> {
        let (source_set, target_set) = self.fetch_sides(kind).await?;
        tracing::info!(
            ?kind,
            source_columns = source_set.len(),
            target_columns = target_set.len(),
            "Comparing columns"
        );

        let target_schema = self.config.target.selector();
        let mut source = ColumnComparator::new(source_set, target_schema.clone());
        let mut target = ColumnComparator::new(target_set, target_schema);

        let mut ddl = DdlEmitter::new();
        let summary = diff(&mut source, &mut target, &mut ddl);

        tracing::info!(
            added = summary.added,
            dropped = summary.dropped,
            changed = summary.changed,
            unchanged = summary.unchanged,
            failed = summary.failed.len(),
            "Column diff complete"
        );

        Ok(DiffReport { ddl, summary })
    }
}
