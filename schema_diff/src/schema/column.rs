//! Column comparator
//!
//! Generates `ALTER TABLE` statements that add, drop or alter columns so the
//! target side matches the source side.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::schema::comparator::{compare_names, Comparator};
use crate::schema::emitter::DdlEmitter;
use crate::schema::record_set::{Cursor, OrderedRecordSet};
use crate::schema::types::{ColumnRecord, SchemaSelector};

const VARCHAR: &str = "character varying";

/// Column side of a diff: a cursor plus the schema the DDL is written for
pub struct ColumnComparator {
    cursor: Cursor<ColumnRecord>,
    /// Schema selector of the target database
    target_schema: SchemaSelector,
}

impl ColumnComparator {
    pub fn new(records: OrderedRecordSet<ColumnRecord>, target_schema: SchemaSelector) -> Self {
        Self {
            cursor: records.into_cursor(),
            target_schema,
        }
    }

    fn current(&self) -> Result<&ColumnRecord> {
        self.cursor
            .current()
            .ok_or_else(|| Error::malformed("", "column cursor has no current record"))
    }

    fn identity_warning(out: &mut DdlEmitter) {
        out.warning("identity columns are not supported in PostgreSQL versions < 10.");
        out.comment(
            "Attempting to create identity columns in earlier versions will probably result in errors.",
        );
    }

    fn identity_generation(column: &ColumnRecord) -> Result<&str> {
        column.identity_generation.as_deref().ok_or_else(|| {
            Error::malformed(&column.compare_name, "identity column without identity_generation")
        })
    }

    /// Type clause for ADD COLUMN
    fn add_type_clause(column: &ColumnRecord) -> Result<String> {
        if column.data_type == VARCHAR {
            // No length means no length: never guess one
            return Ok(match column.max_length()? {
                Some(len) => format!("{}({})", VARCHAR, len),
                None => VARCHAR.to_string(),
            });
        }
        Ok(column.effective_type())
    }

    fn change_type(source: &ColumnRecord, target: &ColumnRecord, out: &mut DdlEmitter) -> Result<()> {
        let source_type = source.effective_type();
        let target_type = target.effective_type();
        let alter = format!(
            "ALTER TABLE {}.{} ALTER COLUMN {}",
            target.table_schema, target.table_name, target.column_name
        );

        if source_type == target_type {
            if source_type != VARCHAR {
                return Ok(());
            }
            let source_len = source.max_length()?;
            let target_len = target.max_length()?;
            match (source_len, target_len) {
                (None, None) => {}
                (None, Some(len)) => {
                    tracing::warn!(
                        compare_name = %source.compare_name,
                        target_length = len,
                        "Source varchar has no length limit; leaving target length alone"
                    );
                }
                (Some(new_len), old_len) if Some(new_len) != old_len => {
                    // An unlimited target shrinks under any limit
                    if old_len.map_or(true, |old| new_len < old) {
                        out.warning(
                            "The next statement will shorten a character varying column, which may result in data loss.",
                        );
                    }
                    out.statement(format!("{} TYPE {}({});", alter, VARCHAR, new_len));
                }
                _ => {}
            }
            return Ok(());
        }

        out.warning(format!(
            "This type change may not work well: ({} to {}).",
            target_type, source_type
        ));
        let length = if source_type.starts_with("character") {
            source.max_length()?
        } else {
            None
        };
        match length {
            Some(len) => out.statement(format!("{} TYPE {}({});", alter, source_type, len)),
            None => out.statement(format!("{} TYPE {};", alter, source_type)),
        }
        Ok(())
    }

    fn change_default(source: &ColumnRecord, target: &ColumnRecord, out: &mut DdlEmitter) {
        let alter = format!(
            "ALTER TABLE {}.{} ALTER COLUMN {}",
            target.table_schema, target.table_name, target.column_name
        );
        match (&source.column_default, &target.column_default) {
            (None, Some(_)) => out.statement(format!("{} DROP DEFAULT;", alter)),
            (Some(new), old) if Some(new) != old.as_ref() => {
                out.statement(format!("{} SET DEFAULT {};", alter, new))
            }
            _ => {}
        }
    }

    /// Identity statement for the target, built but not yet emitted
    fn change_identity(
        source: &ColumnRecord,
        target: &ColumnRecord,
        out: &mut DdlEmitter,
    ) -> Result<Option<String>> {
        if source.is_identity == target.is_identity {
            return Ok(None);
        }
        Self::identity_warning(out);
        let alter = format!(
            "ALTER TABLE \"{}\".\"{}\" ALTER COLUMN \"{}\"",
            target.table_schema, target.table_name, target.column_name
        );
        let sql = if source.is_identity {
            format!(
                "{} ADD GENERATED {} AS IDENTITY;",
                alter,
                Self::identity_generation(source)?
            )
        } else {
            format!("{} DROP IDENTITY;", alter)
        };
        Ok(Some(sql))
    }

    /// Nullability statements, ordered against the deferred identity statement
    ///
    /// Identity changes depend on the NOT NULL state the target has when they run.
    fn change_nullable(
        source: &ColumnRecord,
        target: &ColumnRecord,
        identity_sql: Option<String>,
        out: &mut DdlEmitter,
    ) {
        let alter = format!(
            "ALTER TABLE {}.{} ALTER COLUMN {}",
            target.table_schema, target.table_name, target.column_name
        );

        if source.is_nullable == target.is_nullable {
            if let Some(sql) = identity_sql {
                out.statement(sql);
            }
            return;
        }

        if source.is_nullable {
            if let Some(sql) = identity_sql {
                out.statement(sql);
            }
            out.statement(format!("{} DROP NOT NULL;", alter));
        } else {
            out.statement(format!("{} SET NOT NULL;", alter));
            if let Some(sql) = identity_sql {
                out.statement(sql);
            }
        }
    }
}

impl Comparator for ColumnComparator {
    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, other: &Self) -> Ordering {
        compare_names(self.cursor.compare_name(), other.cursor.compare_name())
    }

    fn current_name(&self) -> &str {
        self.cursor.compare_name()
    }

    fn add(&self, out: &mut DdlEmitter) -> Result<()> {
        let column = self.current()?;
        let schema = match &self.target_schema {
            SchemaSelector::All => column.table_schema.as_str(),
            SchemaSelector::Named(name) => name.as_str(),
        };

        let mut sql = format!(
            "ALTER TABLE {}.{} ADD COLUMN {} {}",
            schema,
            column.table_name,
            column.column_name,
            Self::add_type_clause(column)?
        );
        if !column.is_nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.column_default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if column.is_identity {
            sql.push_str(&format!(
                " GENERATED {} AS IDENTITY",
                Self::identity_generation(column)?
            ));
            Self::identity_warning(out);
        }
        sql.push(';');
        out.statement(sql);
        Ok(())
    }

    fn drop(&self, out: &mut DdlEmitter) -> Result<()> {
        let column = self.current()?;
        out.statement(format!(
            "ALTER TABLE {}.{} DROP COLUMN IF EXISTS {};",
            column.table_schema, column.table_name, column.column_name
        ));
        Ok(())
    }

    fn change(&self, other: &Self, out: &mut DdlEmitter) -> Result<()> {
        let source = self.current()?;
        let target = other.current()?;

        Self::change_type(source, target, out)?;
        Self::change_default(source, target, out);
        let identity_sql = Self::change_identity(source, target, out)?;
        Self::change_nullable(source, target, identity_sql, out);
        Ok(())
    }
}
