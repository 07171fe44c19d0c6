//! Logging utilities for schema_diff
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Initialize logging based on configuration
///
/// Logs never go to stdout unless asked for, since stdout usually carries the
/// generated DDL.
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let config = match config {
        Some(cfg) => cfg,
        None => return Ok(()), // No logging configuration, keep the default no-op subscriber
    };

    // Parse log level
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Create filter for the level
    let directive = format!("schema_diff={}", level)
        .parse::<Directive>()
        .map_err(|e| Error::ConfigError(format!("Invalid log level: {}", e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let json = config.format.to_lowercase() == "json";

    let result = if let Some(file_path) = &config.file {
        // Ensure directory exists
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Open log file
        let file = File::create(file_path)?;

        if json {
            // JSON to file
            let subscriber = fmt::Subscriber::builder()
                .json()
                .with_env_filter(env_filter)
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        } else {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    } else if config.stdout {
        // Stdout only when asked for
        if json {
            let subscriber = fmt::Subscriber::builder()
                .json()
                .with_env_filter(env_filter)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        } else {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    } else if json {
        // Default: stderr
        let subscriber = fmt::Subscriber::builder()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| Error::ConfigError(format!("Failed to install logger: {}", e)))
}
