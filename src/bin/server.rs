//! HTTP Server for CSV table imports
//! Simple HTTP server using tokio and basic HTTP handling

use anyhow::Context;
use clap::Parser;
use csv_table_import::api::{serve, AppState};
use csv_table_import::config::{DbConfig, ServerConfig};
use csv_table_import::db::init_pool;
use csv_table_import::import::{ImportOrchestrator, PgImportStore};
use csv_table_import::observability::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "server", about = "Import uploaded CSV files into PostgreSQL tables")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for staged uploads (overrides UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let db_config = DbConfig::from_env().context("Invalid database configuration")?;
    let mut server_config = ServerConfig::from_env().context("Invalid server configuration")?;
    if let Some(port) = args.port {
        server_config.port = port;
    }
    if let Some(dir) = args.upload_dir {
        server_config.upload_dir = dir;
    }

    let pool = init_pool(&db_config)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let store = PgImportStore::new(pool, server_config.rows_per_statement);
    let orchestrator =
        ImportOrchestrator::new(Arc::new(store)).with_timeout(server_config.import_timeout);

    let bind_addr = server_config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(
        addr = %bind_addr,
        upload_dir = %server_config.upload_dir.display(),
        "Server listening"
    );

    let state = Arc::new(AppState {
        orchestrator,
        config: server_config,
    });
    serve(listener, state).await?;
    Ok(())
}
