//! Type definitions for schema objects read from one side of a diff

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Literal used by raw row maps in place of a missing value
pub const NULL_SENTINEL: &str = "null";

/// Which schemas a row source reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaSelector {
    /// Every user schema; spelled `*`
    All,
    Named(String),
}

impl SchemaSelector {
    pub fn parse(value: &str) -> Self {
        if value == "*" {
            SchemaSelector::All
        } else {
            SchemaSelector::Named(value.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SchemaSelector::All)
    }
}

impl fmt::Display for SchemaSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSelector::All => write!(f, "*"),
            SchemaSelector::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Restricts which relations contribute columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFilter {
    /// Tables and views alike
    AllRelations,
    /// Only relations of type `BASE TABLE`
    BaseTables,
}

/// A column as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub table_schema: String,
    pub compare_name: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    /// Kept as text; parsed only where a numeric length is needed
    pub character_maximum_length: Option<String>,
    pub is_identity: bool,
    pub identity_generation: Option<String>,
    /// Element type of an `ARRAY` column (udt_name without its leading underscore)
    pub array_type: Option<String>,
}

/// Data type value marking an array column
pub const ARRAY_TYPE: &str = "ARRAY";

impl ColumnRecord {
    /// Build a record from a raw string map, where `"null"` means absent
    pub fn from_raw(row: &HashMap<String, String>) -> Result<Self> {
        let compare_name = required(row, "compare_name", "")?;
        let text = |key: &str| required(row, key, &compare_name);

        Ok(Self {
            table_schema: text("table_schema")?,
            table_name: text("table_name")?,
            column_name: text("column_name")?,
            data_type: text("data_type")?,
            is_nullable: yes_no(&compare_name, "is_nullable", optional(row, "is_nullable").as_deref())?,
            column_default: optional(row, "column_default"),
            character_maximum_length: optional(row, "character_maximum_length"),
            is_identity: yes_no(&compare_name, "is_identity", optional(row, "is_identity").as_deref())?,
            identity_generation: optional(row, "identity_generation"),
            array_type: optional(row, "array_type"),
            compare_name,
        })
    }

    /// The type used in DDL, with array columns spelled `<element>[]`
    pub fn effective_type(&self) -> String {
        if self.data_type == ARRAY_TYPE {
            format!("{}[]", self.array_type.as_deref().unwrap_or_default())
        } else {
            self.data_type.clone()
        }
    }

    /// The character length limit, if one is defined
    ///
    /// A value that is present but not a number fails the item instead of
    /// being replaced by a guess.
    pub fn max_length(&self) -> Result<Option<u32>> {
        match self.character_maximum_length.as_deref() {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<u32>().map(Some).map_err(|_| {
                Error::malformed(
                    &self.compare_name,
                    format!("character_maximum_length is not a number: {:?}", raw),
                )
            }),
        }
    }
}

/// Build the ordering key for a column
///
/// The zero-padded ordinal keeps columns of one table in their declared order
/// even when the two sides name or order columns differently.
pub fn compare_name(
    selector: &SchemaSelector,
    table_schema: &str,
    table_name: &str,
    ordinal_position: u32,
    column_name: &str,
) -> String {
    let prefix = if selector.is_all() {
        format!("{}.", table_schema)
    } else {
        String::new()
    };
    format!(
        "{}{}.{:05}{}",
        prefix, table_name, ordinal_position, column_name
    )
}

fn optional(row: &HashMap<String, String>, key: &str) -> Option<String> {
    row.get(key)
        .filter(|value| value.as_str() != NULL_SENTINEL)
        .cloned()
}

fn required(row: &HashMap<String, String>, key: &str, compare_name: &str) -> Result<String> {
    optional(row, key).ok_or_else(|| Error::malformed(compare_name, format!("missing {}", key)))
}

/// Parse an information_schema `YES`/`NO` flag; absent reads as `NO`
pub(crate) fn yes_no(compare_name: &str, key: &str, value: Option<&str>) -> Result<bool> {
    match value {
        Some("YES") => Ok(true),
        Some("NO") | None => Ok(false),
        Some(other) => Err(Error::malformed(
            compare_name,
            format!("{} must be YES or NO, got {:?}", key, other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn sentinel_becomes_none() {
        let record = ColumnRecord::from_raw(&raw(&[
            ("table_schema", "public"),
            ("compare_name", "users.00001id"),
            ("table_name", "users"),
            ("column_name", "id"),
            ("data_type", "integer"),
            ("is_nullable", "NO"),
            ("column_default", "null"),
            ("character_maximum_length", "null"),
            ("is_identity", "YES"),
            ("identity_generation", "ALWAYS"),
            ("array_type", "int4"),
        ]))
        .unwrap();

        assert!(!record.is_nullable);
        assert!(record.is_identity);
        assert_eq!(record.column_default, None);
        assert_eq!(record.character_maximum_length, None);
        assert_eq!(record.identity_generation.as_deref(), Some("ALWAYS"));
    }

    #[test]
    fn bad_flag_is_malformed() {
        let err = ColumnRecord::from_raw(&raw(&[
            ("table_schema", "public"),
            ("compare_name", "users.00001id"),
            ("table_name", "users"),
            ("column_name", "id"),
            ("data_type", "integer"),
            ("is_nullable", "maybe"),
        ]))
        .unwrap_err();

        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn compare_name_pads_ordinal() {
        let single = SchemaSelector::Named("public".to_string());
        assert_eq!(compare_name(&single, "public", "users", 7, "email"), "users.00007email");
        assert_eq!(
            compare_name(&SchemaSelector::All, "app", "users", 12, "email"),
            "app.users.00012email"
        );
    }

    #[test]
    fn array_type_substitution() {
        let mut record = ColumnRecord::from_raw(&raw(&[
            ("table_schema", "public"),
            ("compare_name", "t.00001tags"),
            ("table_name", "t"),
            ("column_name", "tags"),
            ("data_type", "ARRAY"),
            ("array_type", "text"),
        ]))
        .unwrap();
        assert_eq!(record.effective_type(), "text[]");

        record.character_maximum_length = Some("abc".to_string());
        assert!(record.max_length().is_err());
    }
}
