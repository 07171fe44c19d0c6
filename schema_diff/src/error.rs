//! Error types for schema_diff

use thiserror::Error;

/// Result type for schema_diff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_diff
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A record carried a value the comparator cannot interpret
    #[error("Malformed record {compare_name}: {message}")]
    MalformedRecord {
        compare_name: String,
        message: String,
    },

    /// Two records on the same side share a compare_name
    #[error("Duplicate compare_name in record set: {0}")]
    DuplicateKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Shorthand for a malformed-record error on the given item
    pub fn malformed(compare_name: &str, message: impl Into<String>) -> Self {
        Error::MalformedRecord {
            compare_name: compare_name.to_string(),
            message: message.into(),
        }
    }
}

/// Convert Serde JSON errors to schema_diff errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to schema_diff errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
