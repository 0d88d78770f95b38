//! Command-line interface for record-sync
//!
//! # Usage Examples
//!
//! ## Synchronize a batch
//! ```bash
//! record-sync sync \
//!   --schema objects.yaml \
//!   --request batch.json \
//!   --output-dir ./data
//!
//! # Fail on malformed enum options and skip writes
//! record-sync sync --schema objects.yaml --request batch.json \
//!   --output-dir ./data --strict-options --dry-run
//! ```
//!
//! ## Fill defaults for one record
//! ```bash
//! record-sync fill --schema objects.yaml --object host --input record.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use record_sink::JsonlSink;
use record_sync::{SyncConfig, SyncContext, SyncOpts, SynchronizeManager, SynchronizeRequest};
use sync_core::{DefaultValueFiller, OptionCodec, Record, SchemaCatalog};

#[derive(Parser)]
#[command(name = "record-sync")]
#[command(about = "Validate, default-fill and persist record batches against a schema catalog")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a request file into JSON Lines collections
    Sync {
        /// Schema catalog (YAML)
        #[arg(long, value_name = "PATH", env = "RECORD_SYNC_SCHEMA")]
        schema: PathBuf,

        /// Synchronize request (JSON)
        #[arg(long, value_name = "PATH")]
        request: PathBuf,

        /// Directory holding one `<target>.jsonl` file per collection
        #[arg(long, value_name = "DIR", env = "RECORD_SYNC_OUTPUT_DIR")]
        output_dir: PathBuf,

        #[command(flatten)]
        opts: SyncOpts,
    },

    /// Print one record with missing fields default-filled
    Fill {
        /// Schema catalog (YAML)
        #[arg(long, value_name = "PATH", env = "RECORD_SYNC_SCHEMA")]
        schema: PathBuf,

        /// Object type the record belongs to
        #[arg(long)]
        object: String,

        /// Record (JSON object)
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        #[command(flatten)]
        opts: SyncOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            schema,
            request,
            output_dir,
            opts,
        } => run_sync(schema, request, output_dir, &opts).await,
        Commands::Fill {
            schema,
            object,
            input,
            opts,
        } => run_fill(schema, &object, input, &opts).await,
    }
}

async fn run_sync(
    schema: PathBuf,
    request: PathBuf,
    output_dir: PathBuf,
    opts: &SyncOpts,
) -> anyhow::Result<()> {
    let catalog = SchemaCatalog::from_file(&schema)
        .with_context(|| format!("Failed to load schema catalog {}", schema.display()))?;

    let content = tokio::fs::read_to_string(&request)
        .await
        .with_context(|| format!("Failed to read request {}", request.display()))?;
    let request: SynchronizeRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse request {}", request.display()))?;

    let id_field = catalog
        .get_object(request.target_type.trim())
        .map(|object| object.id_field.clone())
        .unwrap_or_else(|| "id".to_string());
    let sink = JsonlSink::new(output_dir, id_field);

    let manager = SynchronizeManager::new(Arc::new(sink), Arc::new(catalog), SyncConfig::from(opts));

    let ctx = SyncContext::new();
    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling after the current write");
            cancel.cancel();
        }
    });

    let outcome = manager.synchronize(&ctx, request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn run_fill(
    schema: PathBuf,
    object: &str,
    input: PathBuf,
    opts: &SyncOpts,
) -> anyhow::Result<()> {
    let catalog = SchemaCatalog::from_file(&schema)
        .with_context(|| format!("Failed to load schema catalog {}", schema.display()))?;
    let object = catalog.require_object(object)?;

    let content = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("Failed to read record {}", input.display()))?;
    let mut record: Record = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record {}", input.display()))?;

    let config = SyncConfig::from(opts);
    let filler = DefaultValueFiller::new(
        OptionCodec::new(config.enum_decode_policy),
        config.default_table,
    );
    let report = filler.fill_missing_fields(
        &mut record,
        &object.attributes,
        &config.default_ignore_fields,
    )?;
    tracing::info!(object = %object.name, filled = ?report.filled, "Filled missing fields");

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
