//! Configuration handling for schema_diff

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};
use crate::schema::types::{ObjectFilter, SchemaSelector};

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    // Read the raw TOML
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    // Deserialize into typed sections
    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete schema_diff configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// The database whose shape is wanted
    pub source: DatabaseConfig,
    /// The database the generated DDL is meant to run against
    pub target: DatabaseConfig,
    #[serde(default)]
    pub diff: DiffConfig,
    pub logging: Option<LoggingConfig>,
    pub output: Option<OutputConfig>,
}

/// Connection settings for one side of the comparison
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `postgres` or `snapshot`
    pub driver: String,
    /// Connection URL, or the snapshot file path for the `snapshot` driver
    pub url: String,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    /// Schema name, or `*` for every user schema
    pub schema: Option<String>,
}

impl DatabaseConfig {
    /// Resolve the configured schema into a selector, defaulting to `public`
    pub fn selector(&self) -> SchemaSelector {
        // Unset means `public`
        SchemaSelector::parse(self.schema.as_deref().unwrap_or("public"))
    }
}

/// Which objects get compared
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiffConfig {
    #[serde(default)]
    pub object_kind: ObjectKind,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            object_kind: ObjectKind::Columns,
        }
    }
}

/// Comparable object kinds exposed on the command line and in config
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Columns of every updatable relation, views included
    #[default]
    Columns,
    /// Columns of base tables only
    TableColumns,
}

impl ObjectKind {
    /// Row filter handed to the row source for this kind
    pub fn filter(self) -> ObjectFilter {
        match self {
            ObjectKind::Columns => ObjectFilter::AllRelations,
            ObjectKind::TableColumns => ObjectFilter::BaseTables,
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

/// Where generated DDL is written
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Defaults to stdout when absent
    pub file: Option<String>,
}
