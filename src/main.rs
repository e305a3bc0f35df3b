use anyhow::{Context, Result};
use planet_catalog::{
    cli::{Cli, Commands},
    config::resolve_database_path,
    ingest::{self, SwapiClient},
    schema::table_names,
    server, Store,
};
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse_args();
    let db_path = resolve_database_path(cli.database)?;

    match cli.command {
        Commands::Fetch { endpoint } => {
            let start = Instant::now();

            let mut store = Store::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?;
            let client = SwapiClient::new(endpoint).context("Failed to create HTTP client")?;

            let summary = ingest::run(&mut store, &client)
                .with_context(|| format!("Ingestion from {} failed", client.endpoint()))?;

            info!(
                "Ingested {} planets ({} created, {} updated) into {:?} in {:.1}s",
                summary.total(),
                summary.created,
                summary.updated,
                db_path,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Serve { bind } => {
            let store = Store::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?;

            // The ingestion client is blocking, so the runtime only exists for the server
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?
                .block_on(server::serve(store, bind))?;
        }

        Commands::Init => {
            Store::open(&db_path)
                .with_context(|| format!("Failed to create database {:?}", db_path))?;
            info!("Created tables {:?} in {:?}", table_names(), db_path);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
