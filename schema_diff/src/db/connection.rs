//! Database connection handling
//!
//! This module opens the connection for one side of a comparison.

use std::path::PathBuf;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// A side's metadata origin: a live database or an offline snapshot
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    Postgres(PgPool),
    /// JSON file of raw column rows
    Snapshot(PathBuf),
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(2);
        let timeout_seconds = config.timeout_seconds.unwrap_or(30);

        match config.driver.as_str() {
            "postgres" => {
                let pool = PgPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(std::time::Duration::from_secs(timeout_seconds))
                    .connect(&config.url)
                    .await?;

                Ok(DatabaseConnection::Postgres(pool))
            }
            "snapshot" => {
                let path = PathBuf::from(&config.url);
                if !path.is_file() {
                    return Err(Error::DatabaseError(format!(
                        "Snapshot file not found: {}",
                        path.display()
                    )));
                }
                Ok(DatabaseConnection::Snapshot(path))
            }
            _ => Err(Error::DatabaseError(format!(
                "Unsupported database driver: {}",
                config.driver
            ))),
        }
    }
}
