use std::fs::File;
use std::io;

use anyhow::Context;
use clap::Parser;

use schema_diff::{config, utils::logging, DiffClient, ObjectKind};

/// Print the DDL that makes the target database's columns match the source's
#[derive(Parser, Debug)]
#[command(name = "schema_diff", version, about)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "schema_diff.toml")]
    config: String,

    /// Write DDL here instead of the configured output
    #[arg(short, long)]
    output: Option<String>,

    /// Override the configured object kind
    #[arg(long, value_enum)]
    object_kind: Option<ObjectKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config))?;
    if let Some(kind) = cli.object_kind {
        config.diff.object_kind = kind;
    }
    logging::init_logging(&config.logging)?;

    let output = cli
        .output
        .clone()
        .or_else(|| config.output.as_ref().and_then(|o| o.file.clone()));

    let client = DiffClient::new(config).await?;
    let report = client.compare().await?;

    match output {
        Some(path) => {
            let file = File::create(&path).with_context(|| format!("creating {}", path))?;
            report.ddl.write_to(file)?;
        }
        None => report.ddl.write_to(io::stdout().lock())?,
    }

    if !report.summary.failed.is_empty() {
        anyhow::bail!(
            "{} item(s) could not be diffed; see the ERROR comments in the output",
            report.summary.failed.len()
        );
    }
    Ok(())
}
