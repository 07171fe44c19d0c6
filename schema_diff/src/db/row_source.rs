//! Row sources
//!
//! A row source produces the column records of one side, already filtered to
//! the requested schemas. Absent values leave this module as `None`.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::db::connection::DatabaseConnection;
use crate::error::{Error, Result};
use crate::schema::query::column_query;
use crate::schema::types::{compare_name, yes_no, ColumnRecord, ObjectFilter, SchemaSelector};

/// Source of column records for one side of a diff
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch every column matching the selector and filter
    async fn fetch_columns(
        &self,
        selector: &SchemaSelector,
        filter: ObjectFilter,
    ) -> Result<Vec<ColumnRecord>>;
}

/// Pick the row source for a connection
pub fn for_connection(connection: &DatabaseConnection) -> Box<dyn RowSource> {
    match connection {
        DatabaseConnection::Postgres(pool) => Box::new(PostgresRowSource::new(pool.clone())),
        DatabaseConnection::Snapshot(path) => Box::new(SnapshotRowSource::new(path)),
    }
}

#[derive(FromRow)]
struct ColumnRow {
    table_schema: Option<String>,
    table_name: Option<String>,
    column_name: Option<String>,
    ordinal_position: Option<String>,
    data_type: Option<String>,
    is_nullable: Option<String>,
    column_default: Option<String>,
    character_maximum_length: Option<String>,
    is_identity: Option<String>,
    identity_generation: Option<String>,
    array_type: Option<String>,
}

impl ColumnRow {
    fn into_record(self, selector: &SchemaSelector) -> Result<ColumnRecord> {
        let location = format!(
            "{}.{}.{}",
            self.table_schema.as_deref().unwrap_or("?"),
            self.table_name.as_deref().unwrap_or("?"),
            self.column_name.as_deref().unwrap_or("?")
        );
        let required = |value: Option<String>, key: &str| {
            value.ok_or_else(|| Error::malformed(&location, format!("missing {}", key)))
        };

        let table_schema = required(self.table_schema, "table_schema")?;
        let table_name = required(self.table_name, "table_name")?;
        let column_name = required(self.column_name, "column_name")?;
        let data_type = required(self.data_type, "data_type")?;

        let ordinal = self
            .ordinal_position
            .as_deref()
            .and_then(|raw| raw.parse::<u32>().ok())
            .ok_or_else(|| Error::malformed(&location, "ordinal_position is not a number"))?;
        let key = compare_name(selector, &table_schema, &table_name, ordinal, &column_name);

        Ok(ColumnRecord {
            is_nullable: yes_no(&key, "is_nullable", self.is_nullable.as_deref())?,
            is_identity: yes_no(&key, "is_identity", self.is_identity.as_deref())?,
            compare_name: key,
            table_schema,
            table_name,
            column_name,
            data_type,
            column_default: self.column_default,
            character_maximum_length: self.character_maximum_length,
            identity_generation: self.identity_generation,
            array_type: self.array_type,
        })
    }
}

/// Reads `information_schema.columns` from a PostgreSQL server
pub struct PostgresRowSource {
    pool: PgPool,
}

impl PostgresRowSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowSource for PostgresRowSource {
    async fn fetch_columns(
        &self,
        selector: &SchemaSelector,
        filter: ObjectFilter,
    ) -> Result<Vec<ColumnRecord>> {
        let sql = column_query(selector, filter);
        tracing::debug!(schema = %selector, ?filter, "Querying column metadata");

        let mut rows = sqlx::query_as::<_, ColumnRow>(&sql).fetch(&self.pool);
        let mut records = Vec::new();
        while let Some(row) = rows.try_next().await? {
            records.push(row.into_record(selector)?);
        }

        tracing::info!(schema = %selector, columns = records.len(), "Fetched column metadata");
        Ok(records)
    }
}

/// Reads raw column rows from a JSON snapshot
///
/// The file holds an array of string maps shaped like the metadata query
/// output, including `compare_name`; `"null"` marks an absent value.
pub struct SnapshotRowSource {
    path: PathBuf,
}

impl SnapshotRowSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RowSource for SnapshotRowSource {
    async fn fetch_columns(
        &self,
        selector: &SchemaSelector,
        filter: ObjectFilter,
    ) -> Result<Vec<ColumnRecord>> {
        if filter == ObjectFilter::BaseTables {
            tracing::debug!(path = %self.path.display(), "Snapshots carry no relation type; filter not applied");
        }

        let text = tokio::fs::read_to_string(&self.path).await?;
        let rows: Vec<HashMap<String, String>> = serde_json::from_str(&text)?;

        // Only rows of the selected schemas are parsed
        let records = rows
            .iter()
            .filter(|row| match selector {
                SchemaSelector::All => true,
                SchemaSelector::Named(name) => row.get("table_schema") == Some(name),
            })
            .map(ColumnRecord::from_raw)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            path = %self.path.display(),
            columns = records.len(),
            "Loaded column snapshot"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_row() -> ColumnRow {
        ColumnRow {
            table_schema: Some("app".to_string()),
            table_name: Some("users".to_string()),
            column_name: Some("email".to_string()),
            ordinal_position: Some("3".to_string()),
            data_type: Some("character varying".to_string()),
            is_nullable: Some("NO".to_string()),
            column_default: None,
            character_maximum_length: Some("120".to_string()),
            is_identity: Some("NO".to_string()),
            identity_generation: None,
            array_type: Some("varchar".to_string()),
        }
    }

    #[test]
    fn key_depends_on_selector() {
        let named = column_row()
            .into_record(&SchemaSelector::Named("app".to_string()))
            .unwrap();
        assert_eq!(named.compare_name, "users.00003email");
        assert!(!named.is_nullable);
        assert_eq!(named.character_maximum_length.as_deref(), Some("120"));

        let all = column_row().into_record(&SchemaSelector::All).unwrap();
        assert_eq!(all.compare_name, "app.users.00003email");
    }

    #[test]
    fn bad_ordinal_is_malformed() {
        let row = ColumnRow {
            ordinal_position: Some("third".to_string()),
            ..column_row()
        };
        let err = row.into_record(&SchemaSelector::All).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref compare_name, .. } if compare_name == "app.users.email"));
    }

    #[test]
    fn missing_names_are_malformed() {
        let no_table = ColumnRow {
            table_name: None,
            ..column_row()
        };
        let err = no_table.into_record(&SchemaSelector::All).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref message, .. } if message == "missing table_name"));

        let no_type = ColumnRow {
            data_type: None,
            ..column_row()
        };
        assert!(no_type.into_record(&SchemaSelector::All).is_err());
    }
}
