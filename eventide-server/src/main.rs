//! Eventide server
//!
//! Serves one entity type over REST, backed by an in-memory event log.
//!
//! Usage:
//!   eventide-server --entity-type book --id-field uuid --field title --field pages
//!   eventide-server --schema book.json --persist events.json
//!
//! With `--persist`, the log is loaded from that file at startup and written
//! back on Ctrl-C. Once that file exists it replaces `--seed`.

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use eventide_model::EntitySchema;
use eventide_server::{AppState, build_router, initial_event_log, load_schema, write_event_log};
use eventide_store::{Repository, SharedRepository};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "eventide-server")]
#[command(about = "Event-sourced entity store over HTTP")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "4080")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// JSON schema file; overrides --entity-type, --id-field and --field
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Entity type served under /api/v1/<entity-type>
    #[arg(long, default_value = "entity")]
    entity_type: String,

    /// Identifier property
    #[arg(long, default_value = "uuid")]
    id_field: String,

    /// Additional whitelisted property (repeatable)
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Read-only JSON event log to replay at startup
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Event log file loaded at startup and written on shutdown
    #[arg(long)]
    persist: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn entity_schema(&self) -> Result<EntitySchema> {
        match &self.schema {
            Some(path) => {
                if !self.fields.is_empty() {
                    warn!("--field is ignored when --schema is given");
                }
                load_schema(path)
            }
            None => Ok(EntitySchema::new(self.entity_type.as_str())
                .with_identifier(&self.id_field)
                .with_properties(self.fields.iter().map(String::as_str))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Eventide server starting...");
    let schema = args.entity_schema()?;
    let log = initial_event_log(args.seed.as_deref(), args.persist.as_deref())?;
    let repository = Repository::new(&schema, log)
        .with_context(|| format!("Failed to open store for {}", schema.entity_type))?;
    let shared = SharedRepository::new(repository);

    let app = build_router(AppState::new(shared.clone()));
    let listener = tokio::net::TcpListener::bind((args.bind.as_str(), args.port))
        .await
        .context("Failed to bind HTTP port")?;
    info!(
        "Serving /api/v1/{} on {}:{}",
        schema.entity_type, args.bind, args.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(path) = &args.persist {
        shared.persist_event_log(|events| write_event_log(path, events))??;
    }
    info!("Eventide server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
