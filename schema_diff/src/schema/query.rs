//! Metadata query construction
//!
//! Builds the `information_schema` query a row source runs for one side.

use crate::schema::types::{ObjectFilter, SchemaSelector};

/// Quote a value as a SQL string literal
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Column metadata query for the given schema selector and relation filter
///
/// Every value is returned as text so that absent values decode uniformly.
pub fn column_query(selector: &SchemaSelector, filter: ObjectFilter) -> String {
    let mut sql = String::from(
        r#"
SELECT c.table_schema::text AS table_schema
    , c.table_name::text AS table_name
    , c.column_name::text AS column_name
    , c.ordinal_position::text AS ordinal_position
    , c.data_type::text AS data_type
    , c.is_nullable::text AS is_nullable
    , c.column_default::text AS column_default
    , c.character_maximum_length::text AS character_maximum_length
    , c.is_identity::text AS is_identity
    , c.identity_generation::text AS identity_generation
    , substring(c.udt_name from 2)::text AS array_type
FROM information_schema.columns c
"#,
    );

    if filter == ObjectFilter::BaseTables {
        sql.push_str(
            r#"INNER JOIN information_schema.tables t
    ON c.table_schema = t.table_schema
    AND c.table_name = t.table_name
    AND t.table_type = 'BASE TABLE'
"#,
        );
    }

    sql.push_str("WHERE c.is_updatable = 'YES'\n");

    match selector {
        SchemaSelector::All => {
            sql.push_str("AND c.table_schema NOT LIKE 'pg_%'\n");
            sql.push_str("AND c.table_schema <> 'information_schema'\n");
        }
        SchemaSelector::Named(name) => {
            sql.push_str(&format!("AND c.table_schema = {}\n", literal(name)));
        }
    }

    sql.push_str("ORDER BY c.table_schema, c.table_name, c.ordinal_position;\n");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_schema_is_filtered_and_escaped() {
        let sql = column_query(
            &SchemaSelector::Named("o'brien".to_string()),
            ObjectFilter::AllRelations,
        );
        assert!(sql.contains("AND c.table_schema = 'o''brien'"));
        assert!(!sql.contains("information_schema.tables"));
        assert!(!sql.contains("NOT LIKE 'pg_%'"));
    }

    #[test]
    fn wildcard_excludes_system_schemas() {
        let sql = column_query(&SchemaSelector::All, ObjectFilter::AllRelations);
        assert!(sql.contains("NOT LIKE 'pg_%'"));
        assert!(sql.contains("<> 'information_schema'"));
    }

    #[test]
    fn base_tables_join() {
        let sql = column_query(&SchemaSelector::All, ObjectFilter::BaseTables);
        assert!(sql.contains("t.table_type = 'BASE TABLE'"));
    }
}
